//! `jj` templates used for fetching, and parsers for their output.
//!
//! Records end with 0x1e and fields are split by 0x1f, so descriptions may
//! contain anything except those two bytes.

use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::BackendError;
use crate::model::{ChangeId, CommitHash, Node, OperationId, OperationLogEntry, ParentRef};

pub(super) const FIELD: char = '\u{1f}';
pub(super) const RECORD: char = '\u{1e}';

const LOG_FIELDS: usize = 11;
const OP_FIELDS: usize = 3;

pub(super) fn log_template() -> String {
    let fields = [
        "change_id",
        "commit_id",
        r#"parents.map(|p| p.change_id() ++ ":" ++ p.commit_id()).join(",")"#,
        r#"local_bookmarks.map(|b| b.name()).join(",")"#,
        r#"if(current_working_copy, "1", "0")"#,
        r#"if(immutable, "1", "0")"#,
        r#"if(conflict, "1", "0")"#,
        r#"if(empty, "1", "0")"#,
        r#"author.email()"#,
        r#"committer.timestamp().utc().format("%Y-%m-%dT%H:%M:%SZ")"#,
        "description",
    ];
    join_template(&fields)
}

pub(super) fn op_log_template() -> String {
    let fields = [
        "id.short(16)",
        "description.first_line()",
        r#"time.start().utc().format("%Y-%m-%dT%H:%M:%SZ")"#,
    ];
    join_template(&fields)
}

fn join_template(fields: &[&str]) -> String {
    let sep = format!(r#" ++ "{FIELD}" ++ "#);
    format!(r#"{} ++ "{RECORD}""#, fields.join(&sep))
}

struct RawCommit<'a> {
    change: &'a str,
    commit: &'a str,
    parents: Vec<(&'a str, &'a str)>,
    fields: Vec<&'a str>,
}

fn records(out: &str) -> impl Iterator<Item = &str> {
    out.split(RECORD)
        .map(|r| r.trim_start_matches(['\n', '\r']))
        .filter(|r| !r.trim().is_empty())
}

fn flag(s: &str) -> bool {
    s == "1"
}

fn timestamp(s: &str) -> Result<i64, BackendError> {
    if s.is_empty() {
        return Ok(0);
    }
    OffsetDateTime::parse(s, &Rfc3339)
        .map(OffsetDateTime::unix_timestamp)
        .map_err(|e| BackendError::Parse(format!("timestamp {s:?}: {e}")))
}

/// Parses `jj log --no-graph` output produced with [`log_template`].
///
/// Parents outside the listed set become [`ParentRef::Elided`]. When one
/// change id shows up with several commits (a divergent change) each copy is
/// keyed `<change>/<commit prefix>` so ids stay unique.
pub fn parse_log(out: &str) -> Result<Vec<Node>, BackendError> {
    let mut raw = Vec::new();
    for rec in records(out) {
        let fields: Vec<&str> = rec.splitn(LOG_FIELDS, FIELD).collect();
        if fields.len() != LOG_FIELDS {
            return Err(BackendError::Parse(format!(
                "expected {LOG_FIELDS} fields, got {}: {rec:?}",
                fields.len()
            )));
        }
        let parents = fields[2]
            .split(',')
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.split_once(':')
                    .ok_or_else(|| BackendError::Parse(format!("parent {p:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        raw.push(RawCommit {
            change: fields[0],
            commit: fields[1],
            parents,
            fields,
        });
    }

    let mut per_change: HashMap<&str, usize> = HashMap::new();
    for r in &raw {
        *per_change.entry(r.change).or_default() += 1;
    }
    let key = |change: &str, commit: &str| -> ChangeId {
        if per_change.get(change).copied().unwrap_or(0) > 1 {
            let prefix = commit.get(..8).unwrap_or(commit);
            ChangeId::new(format!("{change}/{prefix}"))
        } else {
            ChangeId::new(change)
        }
    };
    let visible: HashSet<&str> = raw.iter().map(|r| r.commit).collect();

    raw.iter()
        .map(|r| {
            let f = &r.fields;
            let mut node = Node::new(key(r.change, r.commit), CommitHash::new(r.commit));
            node.parents = r
                .parents
                .iter()
                .map(|&(change, commit)| {
                    if visible.contains(commit) {
                        ParentRef::Visible(key(change, commit))
                    } else {
                        ParentRef::Elided(ChangeId::new(change))
                    }
                })
                .collect();
            node.bookmarks = f[3]
                .split(',')
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect();
            node.is_working_copy = flag(f[4]);
            node.is_immutable = flag(f[5]);
            node.is_conflicted = flag(f[6]);
            node.is_empty = flag(f[7]);
            node.is_divergent = per_change.get(r.change).copied().unwrap_or(0) > 1;
            node.author = f[8].to_string();
            node.timestamp = timestamp(f[9])?;
            node.description = f[10].trim_end().to_string();
            Ok(node)
        })
        .collect()
}

/// Parses `jj operation log --no-graph` output produced with [`op_log_template`].
pub fn parse_op_log(out: &str) -> Result<Vec<OperationLogEntry>, BackendError> {
    records(out)
        .map(|rec| {
            let fields: Vec<&str> = rec.splitn(OP_FIELDS, FIELD).collect();
            match fields.as_slice() {
                [id, description, time] => Ok(OperationLogEntry {
                    id: OperationId(id.trim().to_string()),
                    description: description.to_string(),
                    time: time.trim().to_string(),
                }),
                _ => Err(BackendError::Parse(format!("operation record {rec:?}"))),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/backend/log_template_tests.rs"]
mod tests;
