use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use super::Backend;
use super::log_template::{log_template, op_log_template, parse_log, parse_op_log};
use crate::error::BackendError;
use crate::model::{
    AbandonMode, FetchScope, Node, NewPlacement, OperationKind, OperationLogEntry,
    OperationResult, PendingOperation, PushScope, RebasePlacement, RebaseSource,
};

/// Shells out to the `jj` binary for every query and command.
#[derive(Clone, Debug)]
pub struct JjBackend {
    binary: String,
    repository: PathBuf,
}

struct Output {
    success: bool,
    stdout: String,
    stderr: String,
}

impl JjBackend {
    pub fn new(binary: impl Into<String>, repository: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            repository: repository.into(),
        }
    }

    pub fn repository(&self) -> &Path {
        &self.repository
    }

    /// Resolves the workspace root, failing with jj's own message when the
    /// path is not inside a jj repository.
    pub fn workspace_root(&self) -> Result<PathBuf, BackendError> {
        let out = self.run(&["workspace", "root"], false)?;
        if !out.success {
            return Err(BackendError::Failed { stderr: out.stderr });
        }
        Ok(PathBuf::from(out.stdout.trim()))
    }

    fn run(&self, args: &[&str], ignore_immutable: bool) -> Result<Output, BackendError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--repository")
            .arg(&self.repository)
            .args(["--color", "never", "--no-pager"]);
        if ignore_immutable {
            cmd.arg("--ignore-immutable");
        }
        cmd.args(args);
        // Squash may want to merge descriptions; keep jj from opening an editor.
        cmd.env("JJ_EDITOR", "true");

        debug!(program = %self.binary, ?args, "running backend command");
        let output = cmd.output().map_err(|source| BackendError::Io {
            program: self.binary.clone(),
            source,
        })?;
        Ok(Output {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn query(&self, args: &[&str]) -> Result<String, BackendError> {
        let out = self.run(args, false)?;
        if out.success {
            Ok(out.stdout)
        } else {
            Err(BackendError::Failed { stderr: out.stderr })
        }
    }
}

impl Backend for JjBackend {
    fn fetch_log(&self, revset: &str) -> Result<Vec<Node>, BackendError> {
        let template = log_template();
        let out = self.query(&[
            "log",
            "--no-graph",
            "--revisions",
            revset,
            "--template",
            &template,
        ])?;
        parse_log(&out)
    }

    fn fetch_operation_log(&self) -> Result<Vec<OperationLogEntry>, BackendError> {
        let template = op_log_template();
        let out = self.query(&[
            "operation",
            "log",
            "--no-graph",
            "--limit",
            "20",
            "--template",
            &template,
        ])?;
        parse_op_log(&out)
    }

    fn submit(&self, op: &PendingOperation) -> Result<OperationResult, BackendError> {
        let args = command_args(op)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let out = self.run(&args, op.ignore_immutable)?;
        if !out.success {
            warn!(id = op.id, stderr = %out.stderr, "jj refused operation");
            return Ok(OperationResult::Rejected { reason: out.stderr });
        }
        let operation = match self.fetch_operation_log() {
            Ok(log) => log.into_iter().next().map(|e| e.id),
            Err(err) => {
                warn!(error = %err, "operation applied but the op log could not be read");
                None
            }
        };
        Ok(OperationResult::Applied { operation })
    }
}

/// `jj` arguments (after the global flags) for one operation.
pub fn command_args(op: &PendingOperation) -> Result<Vec<String>, BackendError> {
    let revs = op.revisions.clone();
    let first = || {
        revs.first()
            .cloned()
            .ok_or_else(|| BackendError::Parse(format!("{} needs a target", op.kind.label())))
    };
    let destination = || {
        op.destination_revision
            .clone()
            .ok_or_else(|| BackendError::Parse(format!("{} needs a destination", op.kind.label())))
    };
    let repeat = |flag: &str| -> Vec<String> {
        revs.iter()
            .flat_map(|r| [flag.to_string(), r.clone()])
            .collect()
    };

    let mut args: Vec<String> = Vec::new();
    match &op.kind {
        OperationKind::New { placement } => {
            args.push("new".into());
            match placement {
                NewPlacement::After => args.extend(revs.iter().cloned()),
                NewPlacement::InsertAfter => args.extend(repeat("--insert-after")),
                NewPlacement::InsertBefore => {
                    args.push("--no-edit".into());
                    args.extend(repeat("--insert-before"));
                }
            }
        }
        OperationKind::Edit => {
            args.extend(["edit".into(), first()?]);
        }
        OperationKind::Describe { message } => {
            args.extend([
                "describe".into(),
                first()?,
                "--message".into(),
                message.clone(),
            ]);
        }
        OperationKind::Squash { .. } => {
            args.extend([
                "squash".into(),
                "--from".into(),
                first()?,
                "--into".into(),
                destination()?,
            ]);
        }
        OperationKind::Rebase {
            source, placement, ..
        } => {
            args.push("rebase".into());
            args.extend(repeat(match source {
                RebaseSource::Source => "--source",
                RebaseSource::Branch => "--branch",
                RebaseSource::Revisions => "--revisions",
            }));
            args.push(
                match placement {
                    RebasePlacement::Onto => "--onto",
                    RebasePlacement::InsertAfter => "--insert-after",
                    RebasePlacement::InsertBefore => "--insert-before",
                }
                .into(),
            );
            args.push(destination()?);
        }
        OperationKind::Abandon { mode } => {
            args.push("abandon".into());
            match mode {
                AbandonMode::Plain => {}
                AbandonMode::RetainBookmarks => args.push("--retain-bookmarks".into()),
                AbandonMode::RestoreDescendants => args.push("--restore-descendants".into()),
            }
            args.extend(revs.iter().cloned());
        }
        OperationKind::BookmarkMove {
            name,
            allow_backwards,
        } => {
            args.extend([
                "bookmark".into(),
                "move".into(),
                name.clone(),
                "--to".into(),
                first()?,
            ]);
            if *allow_backwards {
                args.push("--allow-backwards".into());
            }
        }
        OperationKind::BookmarkSet {
            name,
            allow_backwards,
        } => {
            args.extend([
                "bookmark".into(),
                "set".into(),
                name.clone(),
                "--revision".into(),
                first()?,
            ]);
            if *allow_backwards {
                args.push("--allow-backwards".into());
            }
        }
        OperationKind::BookmarkDelete { name } => {
            args.extend(["bookmark".into(), "delete".into(), name.clone()]);
        }
        OperationKind::Duplicate => {
            args.extend(["duplicate".into(), first()?]);
        }
        OperationKind::Undo => args.push("undo".into()),
        OperationKind::Redo => args.push("redo".into()),
        OperationKind::GitFetch { scope } => {
            args.extend(["git".into(), "fetch".into()]);
            match scope {
                FetchScope::Default => {}
                FetchScope::AllRemotes => args.push("--all-remotes".into()),
                FetchScope::Tracked => args.push("--tracked".into()),
                FetchScope::Branch { name } => args.extend(["--branch".into(), name.clone()]),
                FetchScope::Remote { name } => args.extend(["--remote".into(), name.clone()]),
            }
        }
        OperationKind::GitPush { scope } => {
            args.extend(["git".into(), "push".into()]);
            match scope {
                PushScope::Default => {}
                PushScope::All => args.push("--all".into()),
                PushScope::Tracked => args.push("--tracked".into()),
                PushScope::Deleted => args.push("--deleted".into()),
                PushScope::Revision => {
                    first()?;
                    args.extend(repeat("--revisions"));
                }
                PushScope::Change => args.extend(["--change".into(), first()?]),
                PushScope::Named { name } => {
                    args.extend(["--named".into(), format!("{name}={}", first()?)]);
                }
                PushScope::Bookmark { name } => args.extend(["--bookmark".into(), name.clone()]),
            }
        }
    }
    Ok(args)
}

#[cfg(test)]
#[path = "../tests/backend/jj_tests.rs"]
mod tests;
