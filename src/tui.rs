use std::path::PathBuf;

use anyhow::Result;

use crate::backend::Worker;
use crate::session::Session;

/// Everything the terminal front-end needs, already wired up by the caller.
pub struct TuiRunOptions {
    pub session: Session,
    pub worker: Worker,
    /// Workspace root, shown in the header.
    pub repository: PathBuf,
}

pub fn run_with_options(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run_with_options(opts)
}
