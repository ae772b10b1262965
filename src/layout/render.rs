//! Text fragments for one laid-out row.
//!
//! Rows are meant to be painted newest first, so a child sits above its
//! parent: merge corners open downwards and fork corners open upwards.

use serde::Serialize;
use time::OffsetDateTime;

use super::{LayoutRow, Segment};

const UP: u8 = 1;
const DOWN: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowFragments {
    pub graph: String,
    pub change_id: String,
    pub commit_hash: String,
    pub description: String,
    pub bookmarks: Vec<String>,
    pub author: String,
    pub age: String,
    /// Short flags such as `conflict` or `empty`.
    pub markers: Vec<&'static str>,
    pub is_working_copy: bool,
    pub is_immutable: bool,
}

impl RowFragments {
    pub fn new(row: &LayoutRow, width: usize, now: OffsetDateTime) -> Self {
        let node = &row.node;
        let mut markers = Vec::new();
        if node.is_conflicted {
            markers.push("conflict");
        }
        if node.is_divergent {
            markers.push("divergent");
        }
        if node.is_empty {
            markers.push("empty");
        }
        if row.elided {
            markers.push("elided");
        }

        let description = match node.summary() {
            "" => "(no description set)".to_string(),
            s => s.to_string(),
        };

        Self {
            graph: graph_line(row, width),
            change_id: node.change_id.short().to_string(),
            commit_hash: node.commit_hash.short().to_string(),
            description,
            bookmarks: node.bookmarks.iter().cloned().collect(),
            author: node.author.clone(),
            age: relative_age(node.timestamp, now),
            markers,
            is_working_copy: node.is_working_copy,
            is_immutable: node.is_immutable,
        }
    }
}

pub fn node_glyph(row: &LayoutRow) -> char {
    let node = &row.node;
    if node.is_working_copy {
        '@'
    } else if node.is_conflicted {
        '×'
    } else if node.is_immutable {
        '◆'
    } else {
        '○'
    }
}

/// Box-drawing line for one row, two columns per lane.
pub fn graph_line(row: &LayoutRow, width: usize) -> String {
    let cols = width.max(row.lane + 1) * 2;
    let mut cells = vec![0u8; cols];

    for seg in &row.segments {
        match *seg {
            Segment::Pass { lane, .. } => {
                add(&mut cells, lane * 2, UP | DOWN);
            }
            Segment::Merge {
                from_lane, to_lane, ..
            } => span(&mut cells, to_lane * 2, from_lane * 2, DOWN),
            Segment::Fork {
                from_lane, to_lane, ..
            } => span(&mut cells, from_lane * 2, to_lane * 2, UP),
        }
    }

    let node_col = row.lane * 2;
    let glyph = node_glyph(row);
    let line: String = cells
        .iter()
        .enumerate()
        .map(|(i, &bits)| if i == node_col { glyph } else { box_char(bits) })
        .collect();
    line.trim_end().to_string()
}

/// Horizontal run from the node column to `far`, which turns `vertical` there.
fn span(cells: &mut [u8], node_col: usize, far: usize, vertical: u8) {
    if far == node_col {
        return;
    }
    let (lo, hi) = if far > node_col {
        (node_col, far)
    } else {
        (far, node_col)
    };
    for c in lo + 1..hi {
        add(cells, c, LEFT | RIGHT);
    }
    let toward_node = if far > node_col { LEFT } else { RIGHT };
    add(cells, far, vertical | toward_node);
}

fn add(cells: &mut [u8], col: usize, bits: u8) {
    if let Some(c) = cells.get_mut(col) {
        *c |= bits;
    }
}

fn box_char(bits: u8) -> char {
    match bits {
        0 => ' ',
        b if b == UP | DOWN || b == UP || b == DOWN => '│',
        b if b == LEFT | RIGHT || b == LEFT || b == RIGHT => '─',
        b if b == DOWN | LEFT => '╮',
        b if b == DOWN | RIGHT => '╭',
        b if b == UP | LEFT => '╯',
        b if b == UP | RIGHT => '╰',
        b if b == UP | DOWN | LEFT => '┤',
        b if b == UP | DOWN | RIGHT => '├',
        b if b == DOWN | LEFT | RIGHT => '┬',
        b if b == UP | LEFT | RIGHT => '┴',
        _ => '┼',
    }
}

pub fn relative_age(timestamp: i64, now: OffsetDateTime) -> String {
    let Ok(then) = OffsetDateTime::from_unix_timestamp(timestamp) else {
        return String::new();
    };
    let secs = (now - then).whole_seconds();
    if secs < 0 {
        return "in the future".to_string();
    }

    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;
    if secs < 60 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 48 {
        format!("{}h ago", hours)
    } else if days < 60 {
        format!("{}d ago", days)
    } else {
        format!("{}mo ago", days / 30)
    }
}
