use anyhow::Result;

mod app;

mod input;
mod keymap;
mod modal;
mod view;

// Make core TUI types available to submodules via `super::...`.
use app::{App, Modal, ModalKind};

pub fn run_with_options(opts: crate::tui::TuiRunOptions) -> Result<()> {
    app::run(opts)
}
