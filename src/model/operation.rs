use serde::{Deserialize, Serialize};

use super::ids::{ChangeId, OperationId};

/// One entry of the backend's operation log, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub id: OperationId,
    pub description: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewPlacement {
    /// `jj new <parents>`
    After,
    /// `jj new --insert-after <target>`
    InsertAfter,
    /// `jj new --no-edit --insert-before <target>`
    InsertBefore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebaseSource {
    /// The source and all of its descendants.
    Source,
    /// Everything on the source's branch relative to the destination.
    Branch,
    /// Only the source; its descendants are re-parented onto its parents.
    Revisions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebasePlacement {
    Onto,
    InsertAfter,
    InsertBefore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonMode {
    Plain,
    RetainBookmarks,
    RestoreDescendants,
}

/// What `jj git fetch` pulls in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FetchScope {
    /// The configured default remote.
    Default,
    AllRemotes,
    Tracked,
    Branch { name: String },
    Remote { name: String },
}

impl FetchScope {
    pub fn label(&self) -> String {
        match self {
            FetchScope::Default => "default remote".into(),
            FetchScope::AllRemotes => "all remotes".into(),
            FetchScope::Tracked => "tracked bookmarks".into(),
            FetchScope::Branch { name } => format!("branch {name}"),
            FetchScope::Remote { name } => format!("remote {name}"),
        }
    }
}

/// What `jj git push` sends. `Revision`, `Change` and `Named` act on the
/// operation's target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum PushScope {
    Default,
    All,
    Tracked,
    Deleted,
    /// Bookmarks pointing at the target.
    Revision,
    /// A generated bookmark for the target.
    Change,
    /// A new bookmark called `name` on the target.
    Named { name: String },
    Bookmark { name: String },
}

impl PushScope {
    pub fn label(&self) -> String {
        match self {
            PushScope::Default => "default bookmarks".into(),
            PushScope::All => "all bookmarks".into(),
            PushScope::Tracked => "tracked bookmarks".into(),
            PushScope::Deleted => "deleted bookmarks".into(),
            PushScope::Revision => "bookmarks at".into(),
            PushScope::Change => "new bookmark for".into(),
            PushScope::Named { name } => format!("new bookmark {name} at"),
            PushScope::Bookmark { name } => format!("bookmark {name}"),
        }
    }

    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            PushScope::Revision | PushScope::Change | PushScope::Named { .. }
        )
    }
}

/// What a submitted operation does, with its kind-specific parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    New {
        placement: NewPlacement,
    },
    Edit,
    Describe {
        message: String,
    },
    Squash {
        into: ChangeId,
    },
    Rebase {
        destination: ChangeId,
        source: RebaseSource,
        placement: RebasePlacement,
    },
    Abandon {
        mode: AbandonMode,
    },
    BookmarkMove {
        name: String,
        allow_backwards: bool,
    },
    /// Create-or-move, for bookmarks whose current target is not in view.
    BookmarkSet {
        name: String,
        allow_backwards: bool,
    },
    BookmarkDelete {
        name: String,
    },
    Duplicate,
    Undo,
    Redo,
    GitFetch {
        scope: FetchScope,
    },
    GitPush {
        scope: PushScope,
    },
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::New { .. } => "new",
            OperationKind::Edit => "edit",
            OperationKind::Describe { .. } => "describe",
            OperationKind::Squash { .. } => "squash",
            OperationKind::Rebase { .. } => "rebase",
            OperationKind::Abandon { .. } => "abandon",
            OperationKind::BookmarkMove { .. } => "bookmark move",
            OperationKind::BookmarkSet { .. } => "bookmark set",
            OperationKind::BookmarkDelete { .. } => "bookmark delete",
            OperationKind::Duplicate => "duplicate",
            OperationKind::Undo => "undo",
            OperationKind::Redo => "redo",
            OperationKind::GitFetch { .. } => "git fetch",
            OperationKind::GitPush { .. } => "git push",
        }
    }
}

/// One mutation, ready to hand to the backend. Never retried.
///
/// `revisions` are the backend revision arguments for `targets`, resolved
/// against the model the operation was planned on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub id: u64,
    pub kind: OperationKind,
    pub targets: Vec<ChangeId>,
    pub revisions: Vec<String>,
    #[serde(default)]
    pub destination_revision: Option<String>,
    #[serde(default)]
    pub ignore_immutable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationResult {
    Applied { operation: Option<OperationId> },
    Rejected { reason: String },
}
