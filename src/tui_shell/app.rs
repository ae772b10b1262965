use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction as Split, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use time::OffsetDateTime;

use crate::backend::{Request, Worker};
use crate::dispatch::{Action, PlannedOperation};
use crate::model::{ChangeId, RebasePlacement, RebaseSource};
use crate::session::{Session, StatusKind};

use super::input::Input;
use super::keymap::{BINDINGS, Command, GitCommand, KeySequence, Lookup};
use super::modal;
use super::view::{detail_lines, graph_rows};

mod commands;
mod event_loop;
mod render;
mod runtime;

pub(super) use runtime::run;

pub(super) struct App {
    pub(super) session: Session,
    pub(super) worker: Worker,
    pub(super) repository: PathBuf,

    pub(super) keys: KeySequence,
    pub(super) modal: Option<Modal>,
    /// Waiting for the operator to put the cursor on a destination.
    pub(super) pick: Option<Pick>,

    pub(super) quit: bool,
}

pub(super) struct Modal {
    pub(super) title: String,
    pub(super) lines: Vec<String>,
    pub(super) kind: ModalKind,
    pub(super) input: Input,
    pub(super) scroll: usize,
}

impl Modal {
    fn new(title: impl Into<String>, lines: Vec<String>, kind: ModalKind) -> Self {
        Self {
            title: title.into(),
            lines,
            kind,
            input: Input::default(),
            scroll: 0,
        }
    }
}

pub(super) enum ModalKind {
    Viewer,
    Confirm { plan: PlannedOperation },
    TextInput {
        prompt: &'static str,
        purpose: TextPurpose,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum TextPurpose {
    Describe,
    BookmarkSet { allow_backwards: bool },
    BookmarkDelete,
    Revset,
    Filter,
    Git(GitCommand),
}

pub(super) struct Pick {
    pub(super) purpose: PickPurpose,
    /// The cursor was put into the selection to mark the source; undone
    /// when the pick ends.
    pub(super) auto_selected: bool,
}

pub(super) enum PickPurpose {
    Rebase {
        source: RebaseSource,
        placement: RebasePlacement,
    },
    SquashInto {
        from: ChangeId,
    },
}

impl App {
    pub(super) fn new(mut session: Session, worker: Worker, repository: PathBuf) -> Self {
        if let Some(req) = session.request_fetch() {
            worker.send(req);
        }
        Self {
            session,
            worker,
            repository,
            keys: KeySequence::default(),
            modal: None,
            pick: None,
            quit: false,
        }
    }

    /// Feeds finished backend work into the session and forwards whatever
    /// it asks for next.
    pub(super) fn pump(&mut self) {
        while let Some(event) = self.worker.try_recv() {
            let follow_up = self.session.handle(event);
            self.worker.send_all(follow_up);
        }
        if let Some(req) = self.session.tick(Instant::now()) {
            self.worker.send(req);
        }
    }

    fn send(&self, req: Option<Request>) {
        if let Some(req) = req {
            self.worker.send(req);
        }
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
