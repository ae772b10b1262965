use super::*;
use crate::model::ChangeId;

fn op(kind: OperationKind, revisions: &[&str], destination: Option<&str>) -> PendingOperation {
    PendingOperation {
        id: 1,
        kind,
        targets: revisions.iter().map(|r| ChangeId::new(*r)).collect(),
        revisions: revisions.iter().map(|r| r.to_string()).collect(),
        destination_revision: destination.map(str::to_string),
        ignore_immutable: false,
    }
}

fn args(op: &PendingOperation) -> Vec<String> {
    command_args(op).unwrap()
}

#[test]
fn new_placements() {
    let after = op(
        OperationKind::New {
            placement: NewPlacement::After,
        },
        &["a", "b"],
        None,
    );
    assert_eq!(args(&after), ["new", "a", "b"]);

    let before = op(
        OperationKind::New {
            placement: NewPlacement::InsertBefore,
        },
        &["a"],
        None,
    );
    assert_eq!(args(&before), ["new", "--no-edit", "--insert-before", "a"]);
}

#[test]
fn rebase_modes_map_to_flags() {
    let rebase = op(
        OperationKind::Rebase {
            destination: ChangeId::new("d"),
            source: RebaseSource::Revisions,
            placement: RebasePlacement::InsertAfter,
        },
        &["s1", "s2"],
        Some("d"),
    );
    assert_eq!(
        args(&rebase),
        [
            "rebase",
            "--revisions",
            "s1",
            "--revisions",
            "s2",
            "--insert-after",
            "d"
        ]
    );
}

#[test]
fn squash_and_describe() {
    let squash = op(
        OperationKind::Squash {
            into: ChangeId::new("p"),
        },
        &["c"],
        Some("p"),
    );
    assert_eq!(args(&squash), ["squash", "--from", "c", "--into", "p"]);

    let describe = op(
        OperationKind::Describe {
            message: "hello\nworld".into(),
        },
        &["c"],
        None,
    );
    assert_eq!(
        args(&describe),
        ["describe", "c", "--message", "hello\nworld"]
    );
}

#[test]
fn abandon_and_bookmarks() {
    let abandon = op(
        OperationKind::Abandon {
            mode: AbandonMode::RetainBookmarks,
        },
        &["x", "y"],
        None,
    );
    assert_eq!(args(&abandon), ["abandon", "--retain-bookmarks", "x", "y"]);

    let mv = op(
        OperationKind::BookmarkMove {
            name: "main".into(),
            allow_backwards: true,
        },
        &["t"],
        None,
    );
    assert_eq!(
        args(&mv),
        ["bookmark", "move", "main", "--to", "t", "--allow-backwards"]
    );

    let set = op(
        OperationKind::BookmarkSet {
            name: "feat".into(),
            allow_backwards: false,
        },
        &["t"],
        None,
    );
    assert_eq!(args(&set), ["bookmark", "set", "feat", "--revision", "t"]);
}

#[test]
fn undo_redo_take_no_targets() {
    assert_eq!(args(&op(OperationKind::Undo, &[], None)), ["undo"]);
    assert_eq!(args(&op(OperationKind::Redo, &[], None)), ["redo"]);
}

#[test]
fn git_fetch_flags() {
    let fetch = |scope| op(OperationKind::GitFetch { scope }, &[], None);
    assert_eq!(args(&fetch(FetchScope::Default)), ["git", "fetch"]);
    assert_eq!(
        args(&fetch(FetchScope::AllRemotes)),
        ["git", "fetch", "--all-remotes"]
    );
    assert_eq!(
        args(&fetch(FetchScope::Branch {
            name: "main".into()
        })),
        ["git", "fetch", "--branch", "main"]
    );
    assert_eq!(
        args(&fetch(FetchScope::Remote {
            name: "upstream".into()
        })),
        ["git", "fetch", "--remote", "upstream"]
    );
}

#[test]
fn git_push_flags() {
    let push = |scope, revs: &[&str]| op(OperationKind::GitPush { scope }, revs, None);
    assert_eq!(args(&push(PushScope::Default, &[])), ["git", "push"]);
    assert_eq!(
        args(&push(PushScope::Tracked, &[])),
        ["git", "push", "--tracked"]
    );
    assert_eq!(
        args(&push(PushScope::Revision, &["x", "y"])),
        ["git", "push", "--revisions", "x", "--revisions", "y"]
    );
    assert_eq!(
        args(&push(PushScope::Change, &["x"])),
        ["git", "push", "--change", "x"]
    );
    assert_eq!(
        args(&push(
            PushScope::Named {
                name: "topic".into()
            },
            &["x"]
        )),
        ["git", "push", "--named", "topic=x"]
    );
    assert_eq!(
        args(&push(
            PushScope::Bookmark {
                name: "main".into()
            },
            &[]
        )),
        ["git", "push", "--bookmark", "main"]
    );
    // A revision push without a target must not fall back to a default push.
    assert!(command_args(&push(PushScope::Revision, &[])).is_err());
}

#[test]
fn missing_destination_is_an_error() {
    let squash = op(
        OperationKind::Squash {
            into: ChangeId::new("p"),
        },
        &["c"],
        None,
    );
    assert!(command_args(&squash).is_err());
    assert!(command_args(&op(OperationKind::Edit, &[], None)).is_err());
}

#[test]
fn missing_binary_is_an_io_error() {
    let backend = JjBackend::new("jjdag-no-such-binary", ".");
    match backend.fetch_log("@") {
        Err(BackendError::Io { program, .. }) => assert_eq!(program, "jjdag-no-such-binary"),
        other => panic!("expected io error, got {other:?}"),
    }
}
