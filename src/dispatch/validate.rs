use std::collections::BTreeSet;

use super::{Action, PlannedOperation};
use crate::error::{DispatchError, ValidationError};
use crate::graph::DagModel;
use crate::model::{ChangeId, FetchScope, NewPlacement, OperationKind, PushScope, RebaseSource};
use crate::selection::SelectionState;

struct Checker<'a> {
    model: &'a DagModel,
    ignore_immutable: bool,
}

impl<'a> Checker<'a> {
    fn known(&self, id: &ChangeId) -> Result<(), ValidationError> {
        if self.model.contains(id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownChange(id.clone()))
        }
    }

    fn mutable(&self, id: &ChangeId) -> Result<(), ValidationError> {
        self.known(id)?;
        if self.ignore_immutable {
            return Ok(());
        }
        match self.model.get(id) {
            Some(n) if n.is_immutable => Err(ValidationError::Immutable(id.clone())),
            _ => Ok(()),
        }
    }

    fn all_mutable<'i>(
        &self,
        ids: impl IntoIterator<Item = &'i ChangeId>,
    ) -> Result<(), ValidationError> {
        ids.into_iter().try_for_each(|id| self.mutable(id))
    }

    /// `ids` plus all of their descendants.
    fn with_descendants(&self, ids: &[ChangeId]) -> BTreeSet<ChangeId> {
        let mut out: BTreeSet<ChangeId> = ids.iter().cloned().collect();
        for id in ids {
            out.extend(self.model.descendants(id).cloned());
        }
        out
    }

    fn revision(&self, id: &ChangeId) -> String {
        self.model
            .get(id)
            .map_or_else(|| id.as_str().to_string(), |n| n.revision().to_string())
    }

    fn has_history(&self) -> bool {
        self.model
            .snapshot()
            .operations()
            .iter()
            .any(|op| !op.id.is_root())
    }
}

fn non_empty(name: &str, err: ValidationError) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(err)
    } else {
        Ok(name.to_string())
    }
}

fn cursor(sel: &SelectionState) -> Result<ChangeId, DispatchError> {
    sel.cursor().cloned().ok_or(DispatchError::NothingSelected)
}

fn targets(sel: &SelectionState) -> Result<Vec<ChangeId>, DispatchError> {
    let t = sel.targets();
    if t.is_empty() {
        Err(DispatchError::NothingSelected)
    } else {
        Ok(t)
    }
}

pub(super) fn plan(
    action: &Action,
    sel: &SelectionState,
    model: &DagModel,
    ignore_immutable: bool,
) -> Result<PlannedOperation, DispatchError> {
    let c = Checker {
        model,
        ignore_immutable,
    };

    let (kind, targets, destination, affected) = match action {
        Action::New { placement } => {
            let targets = targets(sel)?;
            targets.iter().try_for_each(|t| c.known(t))?;
            let affected = match placement {
                NewPlacement::After => BTreeSet::new(),
                NewPlacement::InsertAfter | NewPlacement::InsertBefore => {
                    let rewritten = c.with_descendants(&targets);
                    let moved: Vec<&ChangeId> = rewritten
                        .iter()
                        .filter(|id| {
                            *placement == NewPlacement::InsertBefore || !targets.contains(id)
                        })
                        .collect();
                    c.all_mutable(moved.iter().copied())?;
                    rewritten
                }
            };
            let kind = OperationKind::New {
                placement: *placement,
            };
            (kind, targets, None, affected)
        }

        Action::Edit => {
            let target = cursor(sel)?;
            c.mutable(&target)?;
            let affected = BTreeSet::from([target.clone()]);
            (OperationKind::Edit, vec![target], None, affected)
        }

        Action::Describe { message } => {
            let target = cursor(sel)?;
            c.mutable(&target)?;
            let affected = c.with_descendants(std::slice::from_ref(&target));
            let kind = OperationKind::Describe {
                message: message.clone(),
            };
            (kind, vec![target], None, affected)
        }

        Action::Squash { into } => {
            let from = cursor(sel)?;
            c.known(&from)?;
            let into = match into {
                Some(into) => into.clone(),
                None => {
                    let mut parents = model.parents(&from);
                    match (parents.next(), parents.next()) {
                        (Some(p), None) => p.clone(),
                        _ => return Err(ValidationError::SquashNoParent(from).into()),
                    }
                }
            };
            c.known(&into)?;
            if from == into {
                return Err(ValidationError::SquashIntoSelf(from).into());
            }
            let related = model.is_ancestor(&from, &into)
                || model.is_ancestor(&into, &from)
                || model.are_siblings(&from, &into);
            if !related {
                return Err(ValidationError::SquashUnrelated { from, into }.into());
            }
            c.mutable(&from)?;
            c.mutable(&into)?;
            let affected = c.with_descendants(&[from.clone(), into.clone()]);
            let kind = OperationKind::Squash { into: into.clone() };
            (kind, vec![from], Some(into), affected)
        }

        Action::Rebase {
            destination,
            source,
            placement,
        } => {
            let sources = targets(sel)?;
            c.known(destination)?;
            for s in &sources {
                c.known(s)?;
                if s == destination {
                    return Err(ValidationError::RebaseOntoSelf(s.clone()).into());
                }
                if *source != RebaseSource::Revisions && model.is_ancestor(s, destination) {
                    return Err(ValidationError::RebaseOntoDescendant {
                        moved: s.clone(),
                        destination: destination.clone(),
                    }
                    .into());
                }
                c.mutable(s)?;
            }
            let affected = c.with_descendants(&sources);
            c.all_mutable(&affected)?;
            let kind = OperationKind::Rebase {
                destination: destination.clone(),
                source: *source,
                placement: *placement,
            };
            (kind, sources, Some(destination.clone()), affected)
        }

        Action::Abandon { mode } => {
            let targets = targets(sel)?;
            let affected = c.with_descendants(&targets);
            c.all_mutable(&targets)?;
            (OperationKind::Abandon { mode: *mode }, targets, None, affected)
        }

        Action::BookmarkMove {
            name,
            to,
            allow_backwards,
        } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::EmptyBookmarkName.into());
            }
            let to = match to {
                Some(to) => to.clone(),
                None => cursor(sel)?,
            };
            c.known(&to)?;
            // Not in view: the bookmark may be missing or point outside the
            // revset, so let the backend create or move it.
            let kind = match model.bookmark_target(name) {
                None => OperationKind::BookmarkSet {
                    name: name.to_string(),
                    allow_backwards: *allow_backwards,
                },
                Some(current) => {
                    if !allow_backwards && model.is_ancestor(&to, current) {
                        return Err(ValidationError::BookmarkBackwards {
                            name: name.to_string(),
                            to,
                        }
                        .into());
                    }
                    OperationKind::BookmarkMove {
                        name: name.to_string(),
                        allow_backwards: *allow_backwards,
                    }
                }
            };
            let affected = BTreeSet::from([to.clone()]);
            (kind, vec![to], None, affected)
        }

        Action::BookmarkDelete { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::EmptyBookmarkName.into());
            }
            let Some(current) = model.bookmark_target(name) else {
                return Err(ValidationError::UnknownBookmark(name.to_string()).into());
            };
            let kind = OperationKind::BookmarkDelete {
                name: name.to_string(),
            };
            let affected = BTreeSet::from([current.clone()]);
            (kind, vec![current.clone()], None, affected)
        }

        Action::Duplicate => {
            let target = cursor(sel)?;
            c.known(&target)?;
            let affected = BTreeSet::from([target.clone()]);
            (OperationKind::Duplicate, vec![target], None, affected)
        }

        Action::Undo | Action::Redo => {
            let (kind, label) = match action {
                Action::Redo => (OperationKind::Redo, "redo"),
                _ => (OperationKind::Undo, "undo"),
            };
            if !c.has_history() {
                return Err(ValidationError::NothingToUndo(label).into());
            }
            (kind, Vec::new(), None, BTreeSet::new())
        }

        Action::GitFetch { scope } => {
            let scope = match scope {
                FetchScope::Branch { name } => FetchScope::Branch {
                    name: non_empty(name, ValidationError::EmptyBookmarkName)?,
                },
                FetchScope::Remote { name } => FetchScope::Remote {
                    name: non_empty(name, ValidationError::EmptyRemoteName)?,
                },
                other => other.clone(),
            };
            (OperationKind::GitFetch { scope }, Vec::new(), None, BTreeSet::new())
        }

        Action::GitPush { scope } => {
            let (scope, targets) = match scope {
                PushScope::Named { name } => {
                    let name = non_empty(name, ValidationError::EmptyBookmarkName)?;
                    (PushScope::Named { name }, vec![cursor(sel)?])
                }
                PushScope::Bookmark { name } => {
                    let name = non_empty(name, ValidationError::EmptyBookmarkName)?;
                    let at = model.bookmark_target(&name).cloned();
                    (PushScope::Bookmark { name }, at.into_iter().collect())
                }
                s if s.needs_target() => (s.clone(), vec![cursor(sel)?]),
                s => (s.clone(), Vec::new()),
            };
            if scope.needs_target() {
                targets.iter().try_for_each(|t| c.known(t))?;
            }
            let affected = targets.iter().cloned().collect();
            (OperationKind::GitPush { scope }, targets, None, affected)
        }
    };

    Ok(PlannedOperation {
        revisions: targets.iter().map(|t| c.revision(t)).collect(),
        destination_revision: destination.as_ref().map(|d| c.revision(d)),
        kind,
        targets,
        affected: affected.into_iter().collect(),
        ignore_immutable,
    })
}
