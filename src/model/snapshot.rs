use std::collections::HashMap;

use serde::Serialize;

use super::ids::ChangeId;
use super::node::Node;
use super::operation::OperationLogEntry;

/// Monotonic stamp assigned when a fetch is issued.
pub type SequenceNumber = u64;

/// Immutable view of the visible graph at one point in time.
///
/// Never mutated after construction; the session replaces it wholesale.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    seq: SequenceNumber,
    revset: String,
    nodes: Vec<Node>,
    #[serde(skip)]
    index: HashMap<ChangeId, usize>,
    working_copy: Option<ChangeId>,
    operations: Vec<OperationLogEntry>,
}

impl Snapshot {
    pub fn new(
        seq: SequenceNumber,
        revset: impl Into<String>,
        nodes: Vec<Node>,
        operations: Vec<OperationLogEntry>,
    ) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            index.entry(n.change_id.clone()).or_insert(i);
        }
        let working_copy = nodes
            .iter()
            .find(|n| n.is_working_copy)
            .map(|n| n.change_id.clone());
        Self {
            seq,
            revset: revset.into(),
            nodes,
            index,
            working_copy,
            operations,
        }
    }

    pub fn empty(seq: SequenceNumber) -> Self {
        Self::new(seq, "", Vec::new(), Vec::new())
    }

    pub fn seq(&self) -> SequenceNumber {
        self.seq
    }

    pub fn revset(&self) -> &str {
        &self.revset
    }

    /// Nodes in the order the backend reported them.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: &ChangeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &ChangeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn working_copy(&self) -> Option<&ChangeId> {
        self.working_copy.as_ref()
    }

    pub fn operations(&self) -> &[OperationLogEntry] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct change ids; differs from `len` only for malformed input.
    pub(crate) fn distinct_ids(&self) -> usize {
        self.index.len()
    }
}
