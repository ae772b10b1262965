//! Query and command interface to the repository engine.

use crate::error::BackendError;
use crate::model::{
    Node, OperationLogEntry, OperationResult, PendingOperation, SequenceNumber, Snapshot,
};

mod jj;
mod log_template;
mod worker;

pub use self::jj::{JjBackend, command_args};
pub use self::log_template::{parse_log, parse_op_log};
pub use self::worker::{BackendEvent, Request, Worker};

/// Everything the engine needs from the repository.
///
/// Implementations are called from blocking worker threads, never from the
/// interaction loop, so they are free to block.
pub trait Backend: Send + Sync + 'static {
    /// Visible changesets for `revset`, newest first as the backend lists them.
    fn fetch_log(&self, revset: &str) -> Result<Vec<Node>, BackendError>;

    /// Operation log, newest first.
    fn fetch_operation_log(&self) -> Result<Vec<OperationLogEntry>, BackendError>;

    /// Runs one operation atomically. A refusal by the repository is
    /// `Ok(Rejected)`; `Err` means the backend could not be run at all.
    fn submit(&self, op: &PendingOperation) -> Result<OperationResult, BackendError>;

    fn fetch_snapshot(&self, revset: &str, seq: SequenceNumber) -> Result<Snapshot, BackendError> {
        let nodes = self.fetch_log(revset)?;
        let operations = self.fetch_operation_log()?;
        Ok(Snapshot::new(seq, revset, nodes, operations))
    }
}
