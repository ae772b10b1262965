pub mod backend;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod selection;
pub mod session;
pub mod tui;
mod tui_shell;

#[cfg(test)]
#[path = "tests/fixtures.rs"]
pub(crate) mod tests_support;
