//! Single-owner coordinator between the interaction loop and the backend.
//!
//! The session never talks to the backend itself. Methods return the
//! [`Request`]s the caller should hand to a worker, and results come back
//! through [`Session::handle`]. All state changes happen on the caller's
//! thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::backend::{BackendEvent, Request};
use crate::dispatch::{Action, Dispatcher, PlannedOperation};
use crate::error::DispatchError;
use crate::graph::DagModel;
use crate::layout::{Layout, layout};
use crate::model::{ChangeId, SequenceNumber, Snapshot};
use crate::reconcile::reconcile;
use crate::selection::{Direction, NodeFilter, SelectionState};

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub revset: String,
    /// Idle auto-refresh period; `None` disables it.
    pub refresh_interval: Option<Duration>,
    pub ignore_immutable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Last thing worth telling the operator about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

pub struct Session {
    revset: String,
    model: DagModel,
    layout: Layout,
    selection: SelectionState,
    dispatcher: Dispatcher,

    next_seq: SequenceNumber,
    fetch_in_flight: Option<SequenceNumber>,
    /// Another fetch was requested while one was in flight; the in-flight
    /// answer is stale and gets replaced.
    refetch_wanted: bool,
    last_fetch: Option<Instant>,
    refresh_interval: Option<Duration>,

    status: Option<Status>,
}

impl Session {
    pub fn new(cfg: SessionConfig) -> Self {
        Self {
            revset: cfg.revset,
            model: DagModel::empty(),
            layout: Layout::default(),
            selection: SelectionState::default(),
            dispatcher: Dispatcher::new(cfg.ignore_immutable),
            next_seq: 0,
            fetch_in_flight: None,
            refetch_wanted: false,
            last_fetch: None,
            refresh_interval: cfg.refresh_interval,
            status: None,
        }
    }

    pub fn model(&self) -> &DagModel {
        &self.model
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn revset(&self) -> &str {
        &self.revset
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn busy(&self) -> bool {
        self.dispatcher.busy()
    }

    pub fn fetching(&self) -> bool {
        self.fetch_in_flight.is_some()
    }

    pub fn is_pending(&self, id: &ChangeId) -> bool {
        self.dispatcher.is_pending(id)
    }

    pub fn ignore_immutable(&self) -> bool {
        self.dispatcher.ignore_immutable()
    }

    pub fn set_ignore_immutable(&mut self, on: bool) {
        self.dispatcher.set_ignore_immutable(on);
        self.note(if on {
            "immutability checks disabled"
        } else {
            "immutability checks enabled"
        });
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Info,
            message: message.into(),
        });
    }

    pub fn report_error(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Error,
            message: message.into(),
        });
    }

    /// Asks for a fresh snapshot. Returns `None` when a fetch is already in
    /// flight; that one is then superseded by a new fetch once it returns.
    pub fn request_fetch(&mut self) -> Option<Request> {
        if let Some(seq) = self.fetch_in_flight {
            debug!(in_flight = seq, "coalescing fetch request");
            self.refetch_wanted = true;
            return None;
        }
        self.next_seq = self.next_seq.max(self.model.seq()) + 1;
        let seq = self.next_seq;
        self.fetch_in_flight = Some(seq);
        self.last_fetch = Some(Instant::now());
        debug!(seq, revset = %self.revset, "fetch issued");
        Some(Request::Fetch {
            seq,
            revset: self.revset.clone(),
        })
    }

    /// Auto-refresh: a fetch once the interval has passed and nothing is
    /// outstanding.
    pub fn tick(&mut self, now: Instant) -> Option<Request> {
        let interval = self.refresh_interval?;
        if self.fetching() || self.busy() {
            return None;
        }
        let due = self
            .last_fetch
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if due { self.request_fetch() } else { None }
    }

    /// Feeds one finished backend request back in.
    pub fn handle(&mut self, event: BackendEvent) -> Vec<Request> {
        match event {
            BackendEvent::Snapshot { seq, result } => {
                if self.fetch_in_flight != Some(seq) {
                    debug!(seq, "dropping snapshot for a fetch that is not in flight");
                    return Vec::new();
                }
                self.fetch_in_flight = None;

                if std::mem::take(&mut self.refetch_wanted) {
                    debug!(seq, "dropping superseded snapshot");
                    return self.request_fetch().into_iter().collect();
                }

                match result {
                    Ok(snapshot) => self.apply_snapshot(snapshot),
                    Err(err) => {
                        warn!(seq, error = %err, "fetch failed");
                        self.report_error(format!("fetch failed: {err}"));
                    }
                }
                Vec::new()
            }
            BackendEvent::Operation { id, result } => {
                let Some(label) = self
                    .dispatcher
                    .in_flight()
                    .filter(|op| op.id == id)
                    .map(|op| op.kind.label())
                else {
                    debug!(id, "dropping result for an operation that is not in flight");
                    return Vec::new();
                };

                match self.dispatcher.complete(id, result) {
                    Ok(Some(op)) => self.note(format!("{label}: applied (operation {})", short_op(op.as_str()))),
                    Ok(None) => self.note(format!("{label}: applied")),
                    Err(err) => self.report_error(format!("{label}: {err}")),
                }
                // Resync after every answer; a rejection most likely means
                // the repository changed underneath us.
                self.request_fetch().into_iter().collect()
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let seq = snapshot.seq();
        if seq <= self.model.seq() {
            debug!(seq, current = self.model.seq(), "dropping out-of-order snapshot");
            return;
        }
        let model = match DagModel::build(Arc::new(snapshot)) {
            Ok(m) => m,
            Err(err) => {
                warn!(seq, error = %err, "malformed snapshot; keeping previous model");
                self.report_error(format!("malformed snapshot: {err}"));
                return;
            }
        };

        let layout = layout(&model, Some(&self.layout));
        self.selection = reconcile(&self.selection, Some(&self.model), &model);
        info!(
            seq,
            nodes = model.len(),
            lanes = layout.width(),
            cursor = ?self.selection.cursor().map(ChangeId::as_str),
            "snapshot applied"
        );
        self.model = model;
        self.layout = layout;
        if matches!(&self.status, Some(s) if s.message.starts_with("malformed snapshot")) {
            self.status = None;
        }
    }

    pub fn move_cursor(&mut self, dir: Direction) -> bool {
        self.selection.move_cursor(dir, &self.model, &self.layout)
    }

    pub fn set_cursor(&mut self, id: &ChangeId) -> bool {
        self.selection.set_cursor(id, &self.model)
    }

    /// Toggles the cursor in the multi-select set.
    pub fn toggle_select(&mut self) -> bool {
        let Some(cur) = self.selection.cursor().cloned() else {
            return false;
        };
        self.selection.toggle_select(&cur, &self.model)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    pub fn set_filter(&mut self, filter: NodeFilter) {
        self.selection.set_filter(filter, &self.model);
    }

    /// Changes the backend-side filter and refetches.
    pub fn set_revset(&mut self, revset: impl Into<String>) -> Option<Request> {
        self.revset = revset.into();
        info!(revset = %self.revset, "revset changed");
        self.request_fetch()
    }

    /// Validates an action for a confirmation preview. Failures are also
    /// shown on the status line.
    pub fn plan(&mut self, action: &Action) -> Result<PlannedOperation, DispatchError> {
        if self.dispatcher.busy() {
            self.report_error(DispatchError::Busy.to_string());
            return Err(DispatchError::Busy);
        }
        self.dispatcher
            .plan(action, &self.selection, &self.model)
            .inspect_err(|err| {
                debug!(error = %err, "action refused locally");
                self.status = Some(Status {
                    kind: StatusKind::Error,
                    message: err.to_string(),
                });
            })
    }

    pub fn submit(&mut self, plan: PlannedOperation) -> Result<Request, DispatchError> {
        let summary = plan.summary();
        match self.dispatcher.submit(plan) {
            Ok(op) => {
                self.note(format!("{summary}: running"));
                Ok(Request::Submit(op))
            }
            Err(err) => {
                self.report_error(err.to_string());
                Err(err)
            }
        }
    }

    /// `plan` and `submit` in one step, for actions that need no confirmation.
    pub fn dispatch(&mut self, action: &Action) -> Result<Request, DispatchError> {
        let plan = self.plan(action)?;
        self.submit(plan)
    }
}

fn short_op(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
