use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use time::OffsetDateTime;

use crate::layout::{RowFragments, relative_age};
use crate::model::ParentRef;
use crate::session::Session;

/// Painted graph rows plus the index of the cursor row among them.
pub(super) struct GraphRows {
    pub(super) lines: Vec<Line<'static>>,
    pub(super) cursor: Option<usize>,
}

pub(super) fn graph_rows(session: &Session, now: OffsetDateTime) -> GraphRows {
    let layout = session.layout();
    let selection = session.selection();
    let width = layout.width().max(1);

    let mut lines = Vec::new();
    let mut cursor = None;
    for row in selection.visible_rows(layout) {
        let id = &row.node.change_id;
        if selection.cursor() == Some(id) {
            cursor = Some(lines.len());
        }
        let frags = RowFragments::new(row, width, now);
        lines.push(row_line(
            frags,
            width,
            selection.is_selected(id),
            session.is_pending(id),
        ));
    }
    GraphRows { lines, cursor }
}

fn row_line(frags: RowFragments, width: usize, selected: bool, pending: bool) -> Line<'static> {
    let id_style = if frags.is_working_copy {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    };
    let text_style = if frags.is_immutable {
        Style::default().fg(Color::Gray)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(format!("{:<w$} ", frags.graph, w = width * 2)),
        Span::styled(
            if selected { "* " } else { "  " },
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(frags.change_id, id_style),
        Span::raw(" "),
        Span::styled(frags.commit_hash, Style::default().fg(Color::Blue)),
    ];
    if !frags.bookmarks.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            frags.bookmarks.join(" "),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(frags.author, Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(frags.age, Style::default().fg(Color::DarkGray)));
    for m in frags.markers {
        let style = if m == "conflict" || m == "divergent" {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("({m})"), style));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(frags.description, text_style));
    if pending {
        spans.push(Span::styled(
            " (pending)",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ));
    }
    Line::from(spans)
}

/// Full details of the cursor node.
pub(super) fn detail_lines(session: &Session, now: OffsetDateTime) -> Vec<Line<'static>> {
    let Some(node) = session
        .selection()
        .cursor()
        .and_then(|id| session.model().get(id))
    else {
        return vec![Line::from("(no selection)")];
    };

    let parents = node
        .parents
        .iter()
        .map(|p| match p {
            ParentRef::Visible(id) => id.short().to_string(),
            ParentRef::Elided(id) => format!("{} (elided)", id.short()),
        })
        .collect::<Vec<_>>();

    let mut out = vec![
        Line::from(format!(
            "change: {}  commit: {}",
            node.change_id.as_str(),
            node.commit_hash.as_str()
        )),
        Line::from(format!(
            "author: {}  {}",
            node.author,
            relative_age(node.timestamp, now)
        )),
    ];
    if !parents.is_empty() {
        out.push(Line::from(format!("parents: {}", parents.join(", "))));
    }
    if !node.bookmarks.is_empty() {
        let names = node.bookmarks.iter().cloned().collect::<Vec<_>>();
        out.push(Line::from(format!("bookmarks: {}", names.join(", "))));
    }
    out.push(Line::from(""));
    if node.description.is_empty() {
        out.push(Line::from("(no description set)"));
    } else {
        out.extend(node.description.lines().map(|l| Line::from(l.to_string())));
    }
    out
}

#[cfg(test)]
#[path = "../tests/tui_shell/view_tests.rs"]
mod tests;
