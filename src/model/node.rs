use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::{ChangeId, CommitHash};

/// A parent edge as seen from the child.
///
/// `Elided` marks a parent that exists in the repository but falls outside the
/// revset the snapshot was fetched with.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    Visible(ChangeId),
    Elided(ChangeId),
}

impl ParentRef {
    pub fn change_id(&self) -> &ChangeId {
        match self {
            ParentRef::Visible(id) | ParentRef::Elided(id) => id,
        }
    }

    pub fn visible(&self) -> Option<&ChangeId> {
        match self {
            ParentRef::Visible(id) => Some(id),
            ParentRef::Elided(_) => None,
        }
    }

    pub fn is_elided(&self) -> bool {
        matches!(self, ParentRef::Elided(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub change_id: ChangeId,
    pub commit_hash: CommitHash,
    /// Ordered; the first entry is the first parent.
    pub parents: Vec<ParentRef>,
    pub description: String,
    #[serde(default)]
    pub bookmarks: BTreeSet<String>,
    #[serde(default)]
    pub is_working_copy: bool,
    #[serde(default)]
    pub is_immutable: bool,
    #[serde(default)]
    pub is_conflicted: bool,
    #[serde(default)]
    pub is_empty: bool,
    #[serde(default)]
    pub is_divergent: bool,
    #[serde(default)]
    pub author: String,
    /// Committer time, seconds since the unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl Node {
    pub fn new(change_id: ChangeId, commit_hash: CommitHash) -> Self {
        Self {
            change_id,
            commit_hash,
            parents: Vec::new(),
            description: String::new(),
            bookmarks: BTreeSet::new(),
            is_working_copy: false,
            is_immutable: false,
            is_conflicted: false,
            is_empty: false,
            is_divergent: false,
            author: String::new(),
            timestamp: 0,
        }
    }

    pub fn visible_parents(&self) -> impl Iterator<Item = &ChangeId> {
        self.parents.iter().filter_map(ParentRef::visible)
    }

    pub fn has_elided_parent(&self) -> bool {
        self.parents.iter().any(ParentRef::is_elided)
    }

    /// Revision argument that addresses exactly this node in backend commands.
    ///
    /// Divergent changes share a change id, so they are addressed by commit.
    pub fn revision(&self) -> &str {
        if self.is_divergent {
            self.commit_hash.as_str()
        } else {
            self.change_id.as_str()
        }
    }

    pub fn summary(&self) -> &str {
        self.description.lines().next().unwrap_or("").trim()
    }
}
