//! Typed commit graph built from one [`Snapshot`].
//!
//! The model is a pure function of its snapshot: nothing here is mutated after
//! [`DagModel::build`] returns, and no query ever looks at another snapshot.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::error::MalformedGraph;
use crate::model::{ChangeId, Node, ParentRef, SequenceNumber, Snapshot};

mod traversal;

pub use self::traversal::{Ancestors, Descendants};

#[derive(Clone, Debug)]
pub struct DagModel {
    snapshot: Arc<Snapshot>,
    /// Visible children per node, in snapshot order.
    children: HashMap<ChangeId, Vec<ChangeId>>,
}

impl DagModel {
    /// Validates a snapshot and indexes its edges.
    ///
    /// Rejects duplicate change ids, parents that are neither visible nor
    /// flagged elided, more than one working copy, and cycles.
    pub fn build(snapshot: Arc<Snapshot>) -> Result<Self, MalformedGraph> {
        let seq = snapshot.seq();

        if snapshot.distinct_ids() != snapshot.len() {
            let mut seen = HashSet::new();
            for n in snapshot.nodes() {
                if !seen.insert(&n.change_id) {
                    return Err(MalformedGraph::DuplicateChange {
                        seq,
                        id: n.change_id.clone(),
                    });
                }
            }
        }

        if snapshot.nodes().iter().filter(|n| n.is_working_copy).count() > 1 {
            return Err(MalformedGraph::MultipleWorkingCopies { seq });
        }

        let mut children: HashMap<ChangeId, Vec<ChangeId>> = snapshot
            .nodes()
            .iter()
            .map(|n| (n.change_id.clone(), Vec::new()))
            .collect();

        for node in snapshot.nodes() {
            let mut linked = HashSet::new();
            for parent in &node.parents {
                let ParentRef::Visible(pid) = parent else {
                    continue;
                };
                let Some(siblings) = children.get_mut(pid) else {
                    return Err(MalformedGraph::UnresolvedParent {
                        seq,
                        child: node.change_id.clone(),
                        parent: pid.clone(),
                    });
                };
                if linked.insert(pid) {
                    siblings.push(node.change_id.clone());
                }
            }
        }

        let model = Self { snapshot, children };
        model.check_acyclic()?;
        Ok(model)
    }

    /// The model before the first snapshot arrives.
    pub fn empty() -> Self {
        Self {
            snapshot: Arc::new(Snapshot::empty(0)),
            children: HashMap::new(),
        }
    }

    /// Kahn's algorithm; anything left with a nonzero in-degree sits on a cycle.
    fn check_acyclic(&self) -> Result<(), MalformedGraph> {
        let mut indegree: HashMap<&ChangeId, usize> = self
            .snapshot
            .nodes()
            .iter()
            .map(|n| {
                let distinct: HashSet<&ChangeId> = self.parents(&n.change_id).collect();
                (&n.change_id, distinct.len())
            })
            .collect();

        let mut queue: VecDeque<&ChangeId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut visited = 0usize;
        while let Some(id) = queue.pop_front() {
            visited += 1;
            for child in self.children(id) {
                if let Some(d) = indegree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }

        if visited == self.snapshot.len() {
            Ok(())
        } else {
            Err(MalformedGraph::Cycle {
                seq: self.snapshot.seq(),
                involved: self.snapshot.len() - visited,
            })
        }
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn seq(&self) -> SequenceNumber {
        self.snapshot.seq()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        self.snapshot.nodes()
    }

    pub fn get(&self, id: &ChangeId) -> Option<&Node> {
        self.snapshot.get(id)
    }

    pub fn contains(&self, id: &ChangeId) -> bool {
        self.snapshot.contains(id)
    }

    pub fn working_copy(&self) -> Option<&ChangeId> {
        self.snapshot.working_copy()
    }

    /// Visible parents, first parent first. Elided parents are skipped.
    pub fn parents<'a>(&'a self, id: &ChangeId) -> impl Iterator<Item = &'a ChangeId> + use<'a> {
        self.snapshot
            .get(id)
            .into_iter()
            .flat_map(|n| n.visible_parents())
    }

    pub fn children(&self, id: &ChangeId) -> &[ChangeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Proper ancestors of `id`, depth-first, first parent first.
    pub fn ancestors(&self, id: &ChangeId) -> Ancestors<'_> {
        Ancestors::new(self, id)
    }

    /// Proper descendants of `id`, depth-first.
    pub fn descendants(&self, id: &ChangeId) -> Descendants<'_> {
        Descendants::new(self, id)
    }

    /// Closest proper ancestor of `id` accepted by `pred`, breadth-first so a
    /// surviving second parent beats a grandparent. First parents win ties.
    pub fn nearest_ancestor(
        &self,
        id: &ChangeId,
        pred: impl Fn(&ChangeId) -> bool,
    ) -> Option<&ChangeId> {
        let start = &self.get(id)?.change_id;
        let mut seen: HashSet<&ChangeId> = HashSet::from([start]);
        let mut queue: VecDeque<&ChangeId> = VecDeque::from([start]);
        while let Some(cur) = queue.pop_front() {
            for p in self.parents(cur) {
                if !seen.insert(p) {
                    continue;
                }
                if pred(p) {
                    return Some(p);
                }
                queue.push_back(p);
            }
        }
        None
    }

    /// True when `a` is a proper ancestor of `b`. Never true for `a == b`.
    pub fn is_ancestor(&self, a: &ChangeId, b: &ChangeId) -> bool {
        if a == b || !self.contains(a) {
            return false;
        }
        self.ancestors(b).any(|x| x == a)
    }

    /// True when both nodes share at least one visible parent.
    pub fn are_siblings(&self, a: &ChangeId, b: &ChangeId) -> bool {
        if a == b {
            return false;
        }
        let pa: HashSet<&ChangeId> = self.parents(a).collect();
        self.parents(b).any(|p| pa.contains(p))
    }

    /// Node currently carrying a local bookmark.
    pub fn bookmark_target(&self, name: &str) -> Option<&ChangeId> {
        self.nodes()
            .iter()
            .find(|n| n.bookmarks.contains(name))
            .map(|n| &n.change_id)
    }
}

#[cfg(test)]
#[path = "tests/graph_tests.rs"]
mod tests;
