use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::graph::DagModel;
use crate::model::{ChangeId, Node};

/// Parents-first topological order.
///
/// Among nodes whose parents are all placed, the oldest commit goes first;
/// equal timestamps fall back to change id order so arrival order never matters.
pub(super) fn topological_rows(model: &DagModel) -> Vec<&Node> {
    let mut indegree: HashMap<&ChangeId, usize> = HashMap::with_capacity(model.len());
    let mut ready = BinaryHeap::new();

    for node in model.nodes() {
        let distinct: HashSet<&ChangeId> = node.visible_parents().collect();
        if distinct.is_empty() {
            ready.push(Reverse((node.timestamp, &node.change_id)));
        }
        indegree.insert(&node.change_id, distinct.len());
    }

    let mut rows = Vec::with_capacity(model.len());
    while let Some(Reverse((_, id))) = ready.pop() {
        let Some(node) = model.get(id) else {
            continue;
        };
        rows.push(node);
        for child in model.children(id) {
            let Some(d) = indegree.get_mut(child) else {
                continue;
            };
            *d = d.saturating_sub(1);
            if *d == 0
                && let Some(c) = model.get(child)
            {
                ready.push(Reverse((c.timestamp, &c.change_id)));
            }
        }
    }
    rows
}
