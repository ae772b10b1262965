use std::sync::Arc;

use super::*;
use crate::backend::{BackendEvent, Request};
use crate::dispatch::Action;
use crate::selection::NodeFilter;
use crate::session::SessionConfig;
use crate::tests_support::{GraphBuilder, id};

fn loaded(b: GraphBuilder) -> Session {
    let mut s = Session::new(SessionConfig {
        revset: "all()".into(),
        refresh_interval: None,
        ignore_immutable: false,
    });
    let Some(Request::Fetch { seq, .. }) = s.request_fetch() else {
        panic!("expected a fetch");
    };
    s.handle(BackendEvent::Snapshot {
        seq,
        result: Ok(Arc::unwrap_or_clone(b.snapshot(seq))),
    });
    s
}

fn text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

fn graph() -> GraphBuilder {
    GraphBuilder::new()
        .add("a", &[])
        .add("b", &["a"])
        .add("c", &["a"])
        .working_copy("c")
        .bookmark("b", "feat")
        .immutable("a")
}

#[test]
fn rows_are_painted_newest_first_with_cursor_index() {
    let s = loaded(graph());
    let rows = graph_rows(&s, OffsetDateTime::UNIX_EPOCH);
    assert_eq!(rows.lines.len(), 3);
    assert_eq!(rows.cursor, Some(0));

    let top = text(&rows.lines[0]);
    assert!(top.starts_with("  @"), "{top:?}");
    assert!(top.contains("change c"));
    let b = text(&rows.lines[1]);
    assert!(b.contains("feat"));
    let bottom = text(&rows.lines[2]);
    assert!(bottom.contains('◆'));
}

#[test]
fn selection_and_pending_markers_show_up() {
    let mut s = loaded(graph());
    s.toggle_select();
    let rows = graph_rows(&s, OffsetDateTime::UNIX_EPOCH);
    assert!(text(&rows.lines[0]).contains("* c"));

    s.clear_selection();
    s.dispatch(&Action::Describe {
        message: "hi".into(),
    })
    .unwrap();
    let rows = graph_rows(&s, OffsetDateTime::UNIX_EPOCH);
    assert!(text(&rows.lines[0]).ends_with("(pending)"));
    assert!(!text(&rows.lines[1]).contains("(pending)"));
}

#[test]
fn filter_hides_rows_and_moves_the_cursor() {
    let mut s = loaded(graph());
    s.set_filter(NodeFilter::Bookmarked);
    let rows = graph_rows(&s, OffsetDateTime::UNIX_EPOCH);
    assert_eq!(rows.lines.len(), 1);
    assert_eq!(rows.cursor, Some(0));
    assert_eq!(s.selection().cursor(), Some(&id("b")));
}

#[test]
fn details_describe_the_cursor_node() {
    let s = loaded(graph().elided_parent("c", "gone"));
    let lines = detail_lines(&s, OffsetDateTime::UNIX_EPOCH)
        .iter()
        .map(text)
        .collect::<Vec<_>>();
    assert!(lines[0].starts_with("change: c"));
    assert!(lines.iter().any(|l| l.contains("gone (elided)")));
    assert_eq!(lines.last().map(String::as_str), Some("change c"));
}

#[test]
fn empty_session_has_no_rows() {
    let s = Session::new(SessionConfig {
        revset: "none()".into(),
        refresh_interval: None,
        ignore_immutable: false,
    });
    let rows = graph_rows(&s, OffsetDateTime::UNIX_EPOCH);
    assert!(rows.lines.is_empty());
    assert_eq!(rows.cursor, None);
    assert_eq!(
        text(&detail_lines(&s, OffsetDateTime::UNIX_EPOCH)[0]),
        "(no selection)"
    );
}
