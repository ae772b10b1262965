//! Cursor, multi-select set and the local visibility filter.
//!
//! Everything here is keyed by [`ChangeId`] only, so the state outlives any
//! single snapshot. Nothing in this module talks to the backend.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::DagModel;
use crate::layout::{Layout, LayoutRow};
use crate::model::{ChangeId, Node};

/// Local predicate over the fetched graph. The backend-side filter is the revset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "query", rename_all = "snake_case")]
pub enum NodeFilter {
    #[default]
    All,
    Mutable,
    Bookmarked,
    Conflicted,
    /// Case-insensitive match on change id prefix, description, bookmark or author.
    Text(String),
}

impl NodeFilter {
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            NodeFilter::All => true,
            NodeFilter::Mutable => !node.is_immutable,
            NodeFilter::Bookmarked => !node.bookmarks.is_empty(),
            NodeFilter::Conflicted => node.is_conflicted,
            NodeFilter::Text(q) => {
                let q = q.trim().to_lowercase();
                if q.is_empty() {
                    return true;
                }
                node.change_id.as_str().starts_with(&q)
                    || node.description.to_lowercase().contains(&q)
                    || node.bookmarks.iter().any(|b| b.to_lowercase().contains(&q))
                    || node.author.to_lowercase().contains(&q)
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            NodeFilter::All => "all".to_string(),
            NodeFilter::Mutable => "mutable".to_string(),
            NodeFilter::Bookmarked => "bookmarked".to_string(),
            NodeFilter::Conflicted => "conflicted".to_string(),
            NodeFilter::Text(q) => format!("/{}", q),
        }
    }
}

/// Cursor movement. `Up` and `Down` follow the painted order, newest on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
    /// First visible parent that passes the filter.
    Parent,
    /// Earliest visible child that passes the filter.
    Child,
    WorkingCopy,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub(crate) cursor: Option<ChangeId>,
    pub(crate) selected: BTreeSet<ChangeId>,
    pub(crate) filter: NodeFilter,
}

impl SelectionState {
    pub fn with_filter(filter: NodeFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn cursor(&self) -> Option<&ChangeId> {
        self.cursor.as_ref()
    }

    pub fn selected(&self) -> &BTreeSet<ChangeId> {
        &self.selected
    }

    pub fn is_selected(&self, id: &ChangeId) -> bool {
        self.selected.contains(id)
    }

    pub fn filter(&self) -> &NodeFilter {
        &self.filter
    }

    /// Multi-select set when non-empty, otherwise the cursor.
    pub fn targets(&self) -> Vec<ChangeId> {
        if self.selected.is_empty() {
            self.cursor.iter().cloned().collect()
        } else {
            self.selected.iter().cloned().collect()
        }
    }

    /// Rows passing the filter, newest first.
    pub fn visible_rows<'a>(&'a self, layout: &'a Layout) -> impl Iterator<Item = &'a LayoutRow> {
        layout
            .rows()
            .iter()
            .rev()
            .filter(|r| self.filter.matches(&r.node))
    }

    fn visible(&self, model: &DagModel, id: &ChangeId) -> bool {
        model.get(id).is_some_and(|n| self.filter.matches(n))
    }

    /// Moves the cursor; returns whether it changed.
    pub fn move_cursor(&mut self, dir: Direction, model: &DagModel, layout: &Layout) -> bool {
        let next = match (dir, self.cursor.as_ref()) {
            (Direction::Top, _) | (Direction::Up | Direction::Down, None) => {
                self.visible_rows(layout).next().map(|r| &r.node.change_id)
            }
            (Direction::Bottom, _) => self.visible_rows(layout).last().map(|r| &r.node.change_id),
            (Direction::WorkingCopy, _) => model
                .working_copy()
                .filter(|wc| self.visible(model, wc)),
            (Direction::Up, Some(cur)) => {
                let row = layout.row_of(cur).unwrap_or(0);
                // Painted above means a later row.
                layout.rows()[row.saturating_add(1).min(layout.len())..]
                    .iter()
                    .find(|r| self.filter.matches(&r.node))
                    .map(|r| &r.node.change_id)
            }
            (Direction::Down, Some(cur)) => {
                let row = layout.row_of(cur).unwrap_or(layout.len());
                layout.rows()[..row]
                    .iter()
                    .rev()
                    .find(|r| self.filter.matches(&r.node))
                    .map(|r| &r.node.change_id)
            }
            (Direction::Parent, Some(cur)) => model.ancestors(cur).find(|a| self.visible(model, a)),
            (Direction::Child, Some(cur)) => {
                let mut children: Vec<&ChangeId> = model
                    .children(cur)
                    .iter()
                    .filter(|c| self.visible(model, c))
                    .collect();
                children.sort_by_key(|c| layout.row_of(c));
                children.first().copied()
            }
            (Direction::Parent | Direction::Child, None) => None,
        };

        match next {
            Some(id) if self.cursor.as_ref() != Some(id) => {
                self.cursor = Some(id.clone());
                true
            }
            _ => false,
        }
    }

    /// Puts the cursor on `id` if it is present and passes the filter.
    pub fn set_cursor(&mut self, id: &ChangeId, model: &DagModel) -> bool {
        if !self.visible(model, id) {
            return false;
        }
        self.cursor = Some(id.clone());
        true
    }

    /// Adds or removes `id`. Ids missing from the model or hidden by the
    /// filter are ignored. Returns whether the set changed.
    pub fn toggle_select(&mut self, id: &ChangeId, model: &DagModel) -> bool {
        if self.selected.remove(id) {
            return true;
        }
        if !self.visible(model, id) {
            return false;
        }
        self.selected.insert(id.clone())
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Replaces the filter, drops selected ids it hides and moves a hidden
    /// cursor to the nearest visible node.
    pub fn set_filter(&mut self, filter: NodeFilter, model: &DagModel) {
        self.filter = filter;
        *self = crate::reconcile::reconcile(self, Some(model), model);
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
