use thiserror::Error;

use crate::model::{ChangeId, SequenceNumber};

/// The backend handed us a snapshot the graph model cannot accept.
///
/// Fatal to one fetch cycle only: the previous model stays in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedGraph {
    #[error("snapshot {seq}: parent {parent} of {child} is neither visible nor elided")]
    UnresolvedParent {
        seq: SequenceNumber,
        child: ChangeId,
        parent: ChangeId,
    },

    #[error("snapshot {seq}: cycle through {involved} changesets")]
    Cycle {
        seq: SequenceNumber,
        involved: usize,
    },

    #[error("snapshot {seq}: change {id} appears more than once")]
    DuplicateChange { seq: SequenceNumber, id: ChangeId },

    #[error("snapshot {seq}: more than one working-copy changeset")]
    MultipleWorkingCopies { seq: SequenceNumber },
}

/// A local precondition that failed before anything reached the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is immutable")]
    Immutable(ChangeId),

    #[error("{0} is not in the current graph")]
    UnknownChange(ChangeId),

    #[error("cannot squash {0} into itself")]
    SquashIntoSelf(ChangeId),

    #[error("{from} and {into} are unrelated; squash needs an ancestor, descendant or sibling")]
    SquashUnrelated { from: ChangeId, into: ChangeId },

    #[error("{0} has no single visible parent to squash into")]
    SquashNoParent(ChangeId),

    #[error("cannot rebase {0} onto itself")]
    RebaseOntoSelf(ChangeId),

    #[error("rebasing {moved} onto its descendant {destination} would create a cycle")]
    RebaseOntoDescendant {
        moved: ChangeId,
        destination: ChangeId,
    },

    #[error("bookmark name cannot be empty")]
    EmptyBookmarkName,

    #[error("bookmark {0} does not exist")]
    UnknownBookmark(String),

    #[error("moving bookmark {name} backwards to {to} needs allow-backwards")]
    BookmarkBackwards { name: String, to: ChangeId },

    #[error("remote name cannot be empty")]
    EmptyRemoteName,

    #[error("the operation log has nothing to {0}")]
    NothingToUndo(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("nothing selected")]
    NothingSelected,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("backend rejected operation: {0}")]
    Backend(String),

    #[error("another operation is still running")]
    Busy,
}

/// Failure talking to the backend process itself.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{stderr}")]
    Failed { stderr: String },

    #[error("unexpected backend output: {0}")]
    Parse(String),

    #[error("run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend worker is gone")]
    Disconnected,
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
