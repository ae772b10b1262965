use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};

use super::*;
use crate::backend::Backend;
use crate::error::BackendError;
use crate::model::{
    Node, OperationKind, OperationLogEntry, OperationResult, PendingOperation,
};
use crate::selection::Direction;
use crate::session::SessionConfig;
use crate::tests_support::{GraphBuilder, id};

/// Serves one fixed graph and accepts every operation.
struct Fixed {
    nodes: Vec<Node>,
    operations: Vec<OperationLogEntry>,
}

impl Backend for Fixed {
    fn fetch_log(&self, _revset: &str) -> Result<Vec<Node>, BackendError> {
        Ok(self.nodes.clone())
    }

    fn fetch_operation_log(&self) -> Result<Vec<OperationLogEntry>, BackendError> {
        Ok(self.operations.clone())
    }

    fn submit(&self, _op: &PendingOperation) -> Result<OperationResult, BackendError> {
        Ok(OperationResult::Applied { operation: None })
    }
}

fn app() -> App {
    let snap = GraphBuilder::new()
        .add("a", &[])
        .add("b", &["a"])
        .add("c", &["a"])
        .working_copy("c")
        .operations(2)
        .snapshot(1);
    let backend = Fixed {
        nodes: snap.nodes().to_vec(),
        operations: snap.operations().to_vec(),
    };
    let worker = Worker::new(Arc::new(backend)).unwrap();
    let session = Session::new(SessionConfig {
        revset: "all()".into(),
        refresh_interval: None,
        ignore_immutable: false,
    });
    let mut app = App::new(session, worker, PathBuf::from("/repo"));
    settle(&mut app);
    app
}

/// Blocks until no fetch or operation is outstanding.
fn settle(app: &mut App) {
    while app.session.fetching() || app.session.busy() {
        let event = app.worker.recv_blocking().unwrap();
        let next = app.session.handle(event);
        app.worker.send_all(next);
    }
}

fn press(app: &mut App, code: KeyCode) {
    modal::handle_modal_key(app, KeyEvent::new(code, KeyModifiers::NONE));
}

fn confirm_plan(app: &App) -> &PlannedOperation {
    match app.modal.as_ref().map(|m| &m.kind) {
        Some(ModalKind::Confirm { plan }) => plan,
        _ => panic!("expected a confirmation modal"),
    }
}

#[test]
fn loads_the_first_snapshot_on_start() {
    let app = app();
    assert_eq!(app.session.model().len(), 3);
    assert_eq!(app.session.selection().cursor(), Some(&id("c")));
}

#[test]
fn rebase_picks_a_destination_then_confirms() {
    let mut app = app();
    app.run_command(Command::Rebase(RebaseSource::Revisions, RebasePlacement::Onto));
    assert!(app.pick.is_some());
    assert!(app.session.selection().is_selected(&id("c")));

    app.run_command(Command::Move(crate::selection::Direction::Down));
    assert_eq!(app.session.selection().cursor(), Some(&id("b")));
    app.run_command(Command::Accept);

    let plan = confirm_plan(&app);
    assert_eq!(plan.targets, vec![id("c")]);
    assert_eq!(plan.destination_revision.as_deref(), Some("b"));
    assert!(app.pick.is_none());
    assert!(app.session.selection().selected().is_empty());

    press(&mut app, KeyCode::Char('y'));
    assert!(app.modal.is_none());
    assert!(app.session.busy());
    settle(&mut app);
    let status = app.session.status().unwrap();
    assert_eq!(status.kind, StatusKind::Info);
    assert!(status.message.starts_with("rebase: applied"));
}

#[test]
fn cancelling_a_pick_drops_the_marked_source() {
    let mut app = app();
    app.run_command(Command::Rebase(RebaseSource::Source, RebasePlacement::Onto));
    app.run_command(Command::Cancel);
    assert!(app.pick.is_none());
    assert!(app.session.selection().selected().is_empty());
    assert_eq!(app.session.status().unwrap().message, "cancelled");
}

#[test]
fn squash_into_restores_the_cursor_to_the_destination() {
    let mut app = app();
    app.run_command(Command::SquashInto);
    app.run_command(Command::Move(Direction::Bottom));
    app.run_command(Command::Accept);

    let plan = confirm_plan(&app);
    assert_eq!(plan.targets, vec![id("c")]);
    assert_eq!(plan.kind, OperationKind::Squash { into: id("a") });
    assert_eq!(app.session.selection().cursor(), Some(&id("a")));

    press(&mut app, KeyCode::Esc);
    assert!(app.modal.is_none());
    assert!(!app.session.busy());
}

#[test]
fn describe_goes_through_the_text_input() {
    let mut app = app();
    app.run_command(Command::Describe);
    assert_eq!(app.modal.as_ref().unwrap().input.buf, "change c");

    modal::handle_modal_key(
        &mut app,
        KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
    );
    for c in "fix it".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);

    assert!(app.modal.is_none());
    assert!(app.session.is_pending(&id("c")));
    settle(&mut app);
    assert!(!app.session.busy());
}

#[test]
fn empty_bookmark_name_is_refused() {
    let mut app = app();
    app.run_command(Command::BookmarkSet {
        allow_backwards: false,
    });
    press(&mut app, KeyCode::Enter);
    assert!(!app.session.busy());
    assert_eq!(app.session.status().unwrap().kind, StatusKind::Error);
}

#[test]
fn revset_change_refetches() {
    let mut app = app();
    app.run_command(Command::EditRevset);
    modal::handle_modal_key(
        &mut app,
        KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
    );
    for c in "@-".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session.revset(), "@-");
    assert!(app.session.fetching());
    settle(&mut app);
    assert_eq!(app.session.model().seq(), 2);
}

#[test]
fn filter_cycles_back_to_all() {
    let mut app = app();
    for _ in 0..4 {
        app.run_command(Command::CycleFilter);
    }
    assert_eq!(
        *app.session.selection().filter(),
        crate::selection::NodeFilter::All
    );
}

#[test]
fn help_lists_every_binding() {
    let mut app = app();
    app.run_command(Command::Help);
    let m = app.modal.as_ref().unwrap();
    assert!(matches!(m.kind, ModalKind::Viewer));
    assert!(m.lines.iter().any(|l| l.starts_with("space")));
    assert!(m.lines.len() >= BINDINGS.len());
    press(&mut app, KeyCode::Esc);
    assert!(app.modal.is_none());
}

#[test]
fn git_push_asks_first_and_fetch_does_not() {
    let mut app = app();
    app.run_command(Command::Git(GitCommand::Fetch));
    assert!(app.modal.is_none());
    assert!(app.session.busy());
    settle(&mut app);
    assert!(app.session.status().unwrap().message.starts_with("git fetch: applied"));

    app.run_command(Command::Git(GitCommand::PushNamed));
    for c in "topic".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    let plan = confirm_plan(&app);
    assert_eq!(plan.summary(), "git push new bookmark topic at c");

    press(&mut app, KeyCode::Char('n'));
    assert!(app.modal.is_none());
    assert!(!app.session.busy());
}
