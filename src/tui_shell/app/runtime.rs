use std::io::{self, IsTerminal, Stdout};

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use super::{App, event_loop};
use crate::tui::TuiRunOptions;

/// Raw mode plus the alternate screen for as long as it lives. Dropping it
/// gives the shell back, also when the loop panics.
struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Screen {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(err).context("enter alternate screen");
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                leave(&mut io::stdout());
                Err(err).context("create terminal")
            }
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        leave(self.terminal.backend_mut());
        self.terminal.show_cursor().ok();
    }
}

fn leave(out: &mut impl io::Write) {
    disable_raw_mode().ok();
    execute!(out, LeaveAlternateScreen).ok();
}

pub(in crate::tui_shell) fn run(opts: TuiRunOptions) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("jjdag needs an interactive terminal; use --dump for JSON output");
    }
    let TuiRunOptions {
        session,
        worker,
        repository,
    } = opts;

    // The first fetch runs while the screen is being set up.
    let mut app = App::new(session, worker, repository);
    let mut screen = Screen::enter()?;
    screen.terminal.clear().context("clear terminal")?;

    let res = event_loop::run_loop(&mut screen.terminal, &mut app);
    drop(screen);
    info!(ok = res.is_ok(), "terminal restored");
    res
}
