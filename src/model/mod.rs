mod config;
mod ids;
mod node;
mod operation;
mod snapshot;

pub use self::config::{CONFIG_FILE_NAME, DEFAULT_REVSET, ViewerConfig};
pub use self::ids::{ChangeId, CommitHash, OperationId};
pub use self::node::{Node, ParentRef};
pub use self::operation::{
    AbandonMode, FetchScope, NewPlacement, OperationKind, OperationLogEntry, OperationResult,
    PendingOperation, PushScope, RebasePlacement, RebaseSource,
};
pub use self::snapshot::{SequenceNumber, Snapshot};
