use std::collections::HashMap;

use super::{Layout, LayoutRow, Segment};
use crate::graph::DagModel;
use crate::model::{ChangeId, Node};

#[derive(Clone, Debug)]
struct OpenEdge {
    parent: ChangeId,
    child: ChangeId,
}

/// Lane intervals the previous layout gave to nodes and edges that still exist.
///
/// Nodes and edges new to this snapshot stay clear of these so that shared
/// changesets can keep their lanes.
#[derive(Default)]
struct Claims {
    by_lane: HashMap<usize, Vec<(usize, usize)>>,
}

impl Claims {
    fn from_previous(
        model: &DagModel,
        prev: &Layout,
        row_of: &HashMap<&ChangeId, usize>,
    ) -> Self {
        let mut claims = Claims::default();
        for node in model.nodes() {
            let Some(&row) = row_of.get(&node.change_id) else {
                continue;
            };
            if let Some(lane) = prev.lane_of(&node.change_id) {
                claims.add(lane, row, row);
            }
            for parent in node.visible_parents() {
                let (Some(lane), Some(&prow)) =
                    (prev.edge_lane(parent, &node.change_id), row_of.get(parent))
                else {
                    continue;
                };
                claims.add(lane, prow + 1, row);
            }
        }
        claims
    }

    fn add(&mut self, lane: usize, lo: usize, hi: usize) {
        if lo <= hi {
            self.by_lane.entry(lane).or_default().push((lo, hi));
        }
    }

    fn conflicts(&self, lane: usize, lo: usize, hi: usize) -> bool {
        self.by_lane
            .get(&lane)
            .is_some_and(|spans| spans.iter().any(|&(a, b)| a <= hi && lo <= b))
    }
}

/// Greedy lane assignment in row order.
///
/// Every edge owns one lane from just below its parent's row down to its
/// child's row. A child sits in the lane of its first parent's edge when it
/// can, so chains of first parents stay in one column.
pub(super) struct LaneAllocator<'a> {
    model: &'a DagModel,
    prev: Option<&'a Layout>,
    row_of: HashMap<&'a ChangeId, usize>,
    claims: Claims,
    active: Vec<Option<OpenEdge>>,
    node_lanes: HashMap<ChangeId, usize>,
    edge_lanes: HashMap<(ChangeId, ChangeId), usize>,
}

impl<'a> LaneAllocator<'a> {
    pub(super) fn new(model: &'a DagModel, rows: &[&'a Node], prev: Option<&'a Layout>) -> Self {
        let row_of: HashMap<&ChangeId, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, n)| (&n.change_id, i))
            .collect();
        let claims = prev
            .map(|p| Claims::from_previous(model, p, &row_of))
            .unwrap_or_default();
        Self {
            model,
            prev,
            row_of,
            claims,
            active: Vec::new(),
            node_lanes: HashMap::new(),
            edge_lanes: HashMap::new(),
        }
    }

    pub(super) fn place_all(mut self, rows: &[&'a Node]) -> Layout {
        let mut out = Vec::with_capacity(rows.len());
        for (r, node) in rows.iter().enumerate() {
            out.push(self.place(r, node));
        }
        let width = self
            .node_lanes
            .values()
            .chain(self.edge_lanes.values())
            .max()
            .map_or(0, |m| m + 1);
        Layout::from_parts(self.model.seq(), out, self.edge_lanes, width)
    }

    fn place(&mut self, r: usize, node: &Node) -> LayoutRow {
        let id = &node.change_id;
        let is_new = self.prev_lane(id).is_none();

        let incoming: Vec<(usize, ChangeId)> = self
            .active
            .iter()
            .enumerate()
            .filter_map(|(lane, e)| match e {
                Some(e) if &e.child == id => Some((lane, e.parent.clone())),
                _ => None,
            })
            .collect();

        let lane = self.choose_node_lane(r, node, &incoming, is_new);
        self.node_lanes.insert(id.clone(), lane);

        let mut segments = Vec::new();
        for (from_lane, parent) in incoming {
            self.active[from_lane] = None;
            if from_lane != lane {
                segments.push(Segment::Merge {
                    from_lane,
                    to_lane: lane,
                    parent,
                });
            }
        }

        for (l, e) in self.active.iter().enumerate() {
            if let Some(e) = e {
                segments.push(Segment::Pass {
                    lane: l,
                    parent: e.parent.clone(),
                    child: e.child.clone(),
                });
            }
        }

        segments.extend(self.open_child_edges(r, node, lane));

        LayoutRow {
            node: node.clone(),
            row: r,
            lane,
            segments,
            elided: node.has_elided_parent(),
        }
    }

    fn choose_node_lane(
        &self,
        r: usize,
        node: &Node,
        incoming: &[(usize, ChangeId)],
        is_new: bool,
    ) -> usize {
        if let Some(pl) = self.prev_lane(&node.change_id)
            && (incoming.iter().any(|(l, _)| *l == pl) || self.lane_free(pl))
        {
            return pl;
        }

        if let Some(first) = node.visible_parents().next()
            && let Some((l, _)) = incoming.iter().find(|(_, p)| p == first)
        {
            return *l;
        }

        if let Some(l) = incoming.iter().map(|(l, _)| *l).min() {
            return l;
        }

        self.lowest_free(r, r, is_new)
    }

    /// Opens one lane per visible child. The child that continues this
    /// node's first-parent chain inherits `lane`; the rest fork to free lanes.
    fn open_child_edges(&mut self, r: usize, node: &Node, lane: usize) -> Vec<Segment> {
        let id = &node.change_id;
        let mut children: Vec<&ChangeId> = self.model.children(id).iter().collect();
        children.sort_by_key(|c| self.row_of.get(*c).copied().unwrap_or(usize::MAX));

        // The primary child claims `lane` before any sibling can fork into it.
        let primary = self.primary_child(r, node, lane, &children);
        if let Some(p) = primary {
            children.retain(|c| *c != p);
            children.insert(0, p);
        }

        let mut segments = Vec::new();
        for child in children {
            let child_row = self.row_of.get(child).copied().unwrap_or(r + 1);
            let edge_lane = if primary == Some(child) {
                lane
            } else {
                self.choose_edge_lane(r, child_row, id, child)
            };

            self.occupy(
                edge_lane,
                OpenEdge {
                    parent: id.clone(),
                    child: child.clone(),
                },
            );
            self.edge_lanes.insert((id.clone(), child.clone()), edge_lane);
            if edge_lane != lane {
                segments.push(Segment::Fork {
                    from_lane: lane,
                    to_lane: edge_lane,
                    child: child.clone(),
                });
            }
        }
        segments
    }

    fn primary_child<'c>(
        &self,
        r: usize,
        node: &Node,
        lane: usize,
        children: &[&'c ChangeId],
    ) -> Option<&'c ChangeId> {
        let id = &node.change_id;
        let continues_chain = |c: &ChangeId| {
            self.model
                .get(c)
                .and_then(|n| n.visible_parents().next())
                .is_some_and(|p| p == id)
        };

        // A shared edge keeps whatever role it had before.
        if let Some(&c) = children
            .iter()
            .find(|&&c| self.prev_edge_lane(id, c) == Some(lane) && continues_chain(c))
        {
            return Some(c);
        }

        children.iter().copied().find(|&c| {
            let child_row = self.row_of.get(c).copied().unwrap_or(r + 1);
            continues_chain(c)
                && self.prev_edge_lane(id, c).is_none()
                && !self.claims.conflicts(lane, r + 1, child_row)
        })
    }

    fn choose_edge_lane(
        &self,
        r: usize,
        child_row: usize,
        parent: &ChangeId,
        child: &ChangeId,
    ) -> usize {
        if let Some(l) = self.prev_edge_lane(parent, child) {
            if self.lane_free(l) {
                return l;
            }
            return self.lowest_free(r + 1, child_row, false);
        }
        self.lowest_free(r + 1, child_row, true)
    }

    fn lowest_free(&self, lo: usize, hi: usize, avoid_claims: bool) -> usize {
        let mut l = 0;
        loop {
            if self.lane_free(l) && !(avoid_claims && self.claims.conflicts(l, lo, hi)) {
                return l;
            }
            l += 1;
        }
    }

    fn lane_free(&self, lane: usize) -> bool {
        self.active.get(lane).is_none_or(Option::is_none)
    }

    fn occupy(&mut self, lane: usize, edge: OpenEdge) {
        if self.active.len() <= lane {
            self.active.resize(lane + 1, None);
        }
        self.active[lane] = Some(edge);
    }

    fn prev_lane(&self, id: &ChangeId) -> Option<usize> {
        self.prev.and_then(|p| p.lane_of(id))
    }

    fn prev_edge_lane(&self, parent: &ChangeId, child: &ChangeId) -> Option<usize> {
        self.prev.and_then(|p| p.edge_lane(parent, child))
    }
}
