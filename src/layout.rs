//! Row and lane assignment for the text graph.
//!
//! Rows are a parents-first topological order. Lanes are assigned greedily row
//! by row, preferring whatever the previous layout used for the same change.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::DagModel;
use crate::model::{ChangeId, Node, SequenceNumber};

mod lanes;
mod order;
pub mod render;

pub use self::render::{RowFragments, graph_line, relative_age};

/// Edge drawing work attached to one row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// An edge crossing this row vertically in `lane`.
    Pass {
        lane: usize,
        parent: ChangeId,
        child: ChangeId,
    },
    /// An edge leaving this row's node sideways to start its own lane.
    Fork {
        from_lane: usize,
        to_lane: usize,
        child: ChangeId,
    },
    /// An edge arriving at this row's node from another lane.
    Merge {
        from_lane: usize,
        to_lane: usize,
        parent: ChangeId,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct LayoutRow {
    pub node: Node,
    pub row: usize,
    pub lane: usize,
    pub segments: Vec<Segment>,
    /// The node has at least one parent outside the fetched revset.
    pub elided: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Layout {
    seq: SequenceNumber,
    rows: Vec<LayoutRow>,
    width: usize,
    #[serde(skip)]
    index: HashMap<ChangeId, usize>,
    #[serde(skip)]
    edge_lanes: HashMap<(ChangeId, ChangeId), usize>,
}

/// Lays out `model`, keeping lanes from `previous` where the same changes and
/// edges still exist.
pub fn layout(model: &DagModel, previous: Option<&Layout>) -> Layout {
    let rows = order::topological_rows(model);
    lanes::LaneAllocator::new(model, &rows, previous).place_all(&rows)
}

/// Parents-first row order used by [`layout`], without lane assignment.
pub fn row_order(model: &DagModel) -> Vec<&Node> {
    order::topological_rows(model)
}

impl Layout {
    fn from_parts(
        seq: SequenceNumber,
        rows: Vec<LayoutRow>,
        edge_lanes: HashMap<(ChangeId, ChangeId), usize>,
        width: usize,
    ) -> Self {
        let index = rows
            .iter()
            .map(|r| (r.node.change_id.clone(), r.row))
            .collect();
        Self {
            seq,
            rows,
            width,
            index,
            edge_lanes,
        }
    }

    pub fn seq(&self) -> SequenceNumber {
        self.seq
    }

    /// Rows in topological order; parents come first.
    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of lanes in use.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, id: &ChangeId) -> Option<&LayoutRow> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    pub fn row_of(&self, id: &ChangeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn lane_of(&self, id: &ChangeId) -> Option<usize> {
        self.get(id).map(|r| r.lane)
    }

    /// Lane the edge `parent -> child` occupies between the two rows.
    pub fn edge_lane(&self, parent: &ChangeId, child: &ChangeId) -> Option<usize> {
        self.edge_lanes
            .get(&(parent.clone(), child.clone()))
            .copied()
    }
}

#[cfg(test)]
#[path = "tests/layout_tests.rs"]
mod tests;
