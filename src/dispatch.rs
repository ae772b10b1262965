//! Turns a semantic [`Action`] plus the current selection into one
//! [`PendingOperation`], and keeps at most one of them in flight.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::error::{BackendError, DispatchError};
use crate::graph::DagModel;
use crate::model::{
    AbandonMode, ChangeId, FetchScope, NewPlacement, OperationId, OperationKind,
    OperationResult, PendingOperation, PushScope, RebasePlacement, RebaseSource,
};
use crate::selection::SelectionState;

mod validate;

/// What the operator asked for. Targets come from the selection: the
/// multi-select set when non-empty, otherwise the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// New changeset on top of (or inserted around) the targets.
    New { placement: NewPlacement },
    Edit,
    Describe { message: String },
    /// Squash the cursor into `into`, or into its only parent.
    Squash { into: Option<ChangeId> },
    Rebase {
        destination: ChangeId,
        source: RebaseSource,
        placement: RebasePlacement,
    },
    Abandon { mode: AbandonMode },
    /// Point `name` at `to`, or at the cursor.
    BookmarkMove {
        name: String,
        to: Option<ChangeId>,
        allow_backwards: bool,
    },
    BookmarkDelete { name: String },
    Duplicate,
    Undo,
    Redo,
    GitFetch { scope: FetchScope },
    /// Scopes that act on a changeset use the cursor.
    GitPush { scope: PushScope },
}

/// A validated operation that has not been submitted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedOperation {
    pub kind: OperationKind,
    pub targets: Vec<ChangeId>,
    pub revisions: Vec<String>,
    pub destination_revision: Option<String>,
    /// Every changeset the backend is expected to rewrite or move,
    /// targets included, in no particular order.
    pub affected: Vec<ChangeId>,
    pub ignore_immutable: bool,
}

impl PlannedOperation {
    /// One-line description for confirmation prompts.
    pub fn summary(&self) -> String {
        let targets = self
            .targets
            .iter()
            .map(|t| t.short())
            .collect::<Vec<_>>()
            .join(", ");
        let mut s = match &self.kind {
            OperationKind::Undo | OperationKind::Redo => self.kind.label().to_string(),
            OperationKind::Rebase { .. } | OperationKind::Squash { .. } => format!(
                "{} {} -> {}",
                self.kind.label(),
                targets,
                self.destination_revision.as_deref().unwrap_or("?")
            ),
            OperationKind::BookmarkMove { name, .. }
            | OperationKind::BookmarkSet { name, .. }
            | OperationKind::BookmarkDelete { name } => {
                format!("{} {} {}", self.kind.label(), name, targets)
            }
            OperationKind::GitFetch { scope } => {
                format!("{} {}", self.kind.label(), scope.label())
            }
            OperationKind::GitPush { scope } if scope.needs_target() => {
                format!("{} {} {}", self.kind.label(), scope.label(), targets)
            }
            OperationKind::GitPush { scope } => {
                format!("{} {}", self.kind.label(), scope.label())
            }
            _ => format!("{} {}", self.kind.label(), targets),
        };
        if self.affected.len() > self.targets.len() {
            s.push_str(&format!(" ({} changesets affected)", self.affected.len()));
        }
        s
    }
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    next_id: u64,
    in_flight: Option<PendingOperation>,
    pending: BTreeSet<ChangeId>,
    ignore_immutable: bool,
}

impl Dispatcher {
    pub fn new(ignore_immutable: bool) -> Self {
        Self {
            ignore_immutable,
            ..Self::default()
        }
    }

    pub fn ignore_immutable(&self) -> bool {
        self.ignore_immutable
    }

    pub fn set_ignore_immutable(&mut self, on: bool) {
        self.ignore_immutable = on;
    }

    pub fn busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&PendingOperation> {
        self.in_flight.as_ref()
    }

    /// Changesets the in-flight operation is expected to touch.
    pub fn pending_markers(&self) -> &BTreeSet<ChangeId> {
        &self.pending
    }

    pub fn is_pending(&self, id: &ChangeId) -> bool {
        self.pending.contains(id)
    }

    /// Validates `action` against `model` without submitting anything.
    pub fn plan(
        &self,
        action: &Action,
        sel: &SelectionState,
        model: &DagModel,
    ) -> Result<PlannedOperation, DispatchError> {
        validate::plan(action, sel, model, self.ignore_immutable)
    }

    /// Records `plan` as the in-flight operation and returns what to hand to
    /// the backend.
    pub fn submit(&mut self, plan: PlannedOperation) -> Result<PendingOperation, DispatchError> {
        if let Some(op) = &self.in_flight {
            debug!(in_flight = op.id, "rejecting submit while busy");
            return Err(DispatchError::Busy);
        }
        self.next_id += 1;
        let op = PendingOperation {
            id: self.next_id,
            kind: plan.kind,
            targets: plan.targets,
            revisions: plan.revisions,
            destination_revision: plan.destination_revision,
            ignore_immutable: plan.ignore_immutable,
        };
        info!(id = op.id, kind = op.kind.label(), targets = ?op.revisions, "operation submitted");
        self.pending = plan.affected.into_iter().collect();
        self.in_flight = Some(op.clone());
        Ok(op)
    }

    /// `plan` followed by `submit`. Busy wins over any validation failure.
    pub fn dispatch(
        &mut self,
        action: &Action,
        sel: &SelectionState,
        model: &DagModel,
    ) -> Result<PendingOperation, DispatchError> {
        if self.busy() {
            return Err(DispatchError::Busy);
        }
        let plan = self.plan(action, sel, model)?;
        self.submit(plan)
    }

    /// Clears the in-flight operation once the backend answered.
    ///
    /// Returns the new operation id on success. A rejection or a failure to
    /// run the backend becomes [`DispatchError::Backend`]. Answers for an
    /// operation that is no longer in flight are ignored.
    pub fn complete(
        &mut self,
        id: u64,
        result: Result<OperationResult, BackendError>,
    ) -> Result<Option<OperationId>, DispatchError> {
        match &self.in_flight {
            Some(op) if op.id == id => {}
            _ => {
                warn!(id, "completion for an operation that is not in flight");
                return Ok(None);
            }
        }
        self.in_flight = None;
        self.pending.clear();

        match result {
            Ok(OperationResult::Applied { operation }) => {
                info!(id, operation = ?operation.as_ref().map(OperationId::as_str), "operation applied");
                Ok(operation)
            }
            Ok(OperationResult::Rejected { reason }) => {
                warn!(id, %reason, "operation rejected");
                Err(DispatchError::Backend(reason))
            }
            Err(err) => {
                warn!(id, error = %err, "operation failed");
                Err(DispatchError::Backend(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
