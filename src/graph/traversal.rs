use std::collections::HashSet;

use super::DagModel;
use crate::model::ChangeId;

/// Lazy depth-first walk towards the roots. Stops at roots and elided parents.
pub struct Ancestors<'a> {
    model: &'a DagModel,
    stack: Vec<&'a ChangeId>,
    seen: HashSet<&'a ChangeId>,
}

impl<'a> Ancestors<'a> {
    pub(super) fn new(model: &'a DagModel, start: &ChangeId) -> Self {
        let mut walk = Self {
            model,
            stack: Vec::new(),
            seen: HashSet::new(),
        };
        if let Some(node) = model.get(start) {
            walk.seen.insert(&node.change_id);
            walk.push_parents(&node.change_id);
        }
        walk
    }

    fn push_parents(&mut self, id: &ChangeId) {
        let model = self.model;
        let parents: Vec<&'a ChangeId> = model.parents(id).collect();
        // Reversed so the first parent is popped first.
        for p in parents.into_iter().rev() {
            if !self.seen.contains(p) {
                self.stack.push(p);
            }
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ChangeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if !self.seen.insert(id) {
                continue;
            }
            self.push_parents(id);
            return Some(id);
        }
        None
    }
}

/// Lazy depth-first walk towards the heads.
pub struct Descendants<'a> {
    model: &'a DagModel,
    stack: Vec<&'a ChangeId>,
    seen: HashSet<&'a ChangeId>,
}

impl<'a> Descendants<'a> {
    pub(super) fn new(model: &'a DagModel, start: &ChangeId) -> Self {
        let mut walk = Self {
            model,
            stack: Vec::new(),
            seen: HashSet::new(),
        };
        if let Some(node) = model.get(start) {
            walk.seen.insert(&node.change_id);
            walk.push_children(&node.change_id);
        }
        walk
    }

    fn push_children(&mut self, id: &ChangeId) {
        let model = self.model;
        for c in model.children(id).iter().rev() {
            if !self.seen.contains(c) {
                self.stack.push(c);
            }
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ChangeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if !self.seen.insert(id) {
                continue;
            }
            self.push_children(id);
            return Some(id);
        }
        None
    }
}
