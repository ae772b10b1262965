//! Key sequences to commands. Letters may be chained (`nn`, `rs`, ...);
//! a prefix waits for the next key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::{AbandonMode, NewPlacement, RebasePlacement, RebaseSource};
use crate::selection::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Command {
    Quit,
    Help,
    Refresh,
    /// Drops a half-typed sequence, a pending pick, or the selection.
    Cancel,
    /// Finishes a pending pick.
    Accept,
    Move(Direction),
    ToggleSelect,
    New(NewPlacement),
    Edit,
    Describe,
    SquashIntoParent,
    SquashInto,
    Rebase(RebaseSource, RebasePlacement),
    Abandon(AbandonMode),
    Duplicate,
    BookmarkSet { allow_backwards: bool },
    BookmarkDelete,
    Undo,
    Redo,
    EditRevset,
    FilterText,
    CycleFilter,
    ToggleIgnoreImmutable,
    Git(GitCommand),
}

/// `jj git` subcommands. The `*Branch`, `*Remote`, `*Named` and
/// `*Bookmark` forms ask for a name first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum GitCommand {
    Fetch,
    FetchAllRemotes,
    FetchTracked,
    FetchBranch,
    FetchRemote,
    Push,
    PushAll,
    PushTracked,
    PushDeleted,
    PushRevision,
    PushChange,
    PushNamed,
    PushBookmark,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Binding {
    pub(super) keys: &'static str,
    pub(super) help: &'static str,
    pub(super) command: Command,
}

const fn bind(keys: &'static str, help: &'static str, command: Command) -> Binding {
    Binding {
        keys,
        help,
        command,
    }
}

pub(super) const BINDINGS: &[Binding] = &[
    bind("j", "down", Command::Move(Direction::Down)),
    bind("k", "up", Command::Move(Direction::Up)),
    bind("gg", "top", Command::Move(Direction::Top)),
    bind("G", "bottom", Command::Move(Direction::Bottom)),
    bind("p", "first parent", Command::Move(Direction::Parent)),
    bind("c", "first child", Command::Move(Direction::Child)),
    bind("@", "working copy", Command::Move(Direction::WorkingCopy)),
    bind(" ", "toggle selection", Command::ToggleSelect),
    bind("nn", "new on top", Command::New(NewPlacement::After)),
    bind("na", "new, insert after", Command::New(NewPlacement::InsertAfter)),
    bind("nb", "new, insert before", Command::New(NewPlacement::InsertBefore)),
    bind("e", "edit", Command::Edit),
    bind("d", "describe", Command::Describe),
    bind("s", "squash into parent", Command::SquashIntoParent),
    bind("S", "squash into...", Command::SquashInto),
    bind(
        "rr",
        "rebase revisions onto...",
        Command::Rebase(RebaseSource::Revisions, RebasePlacement::Onto),
    ),
    bind(
        "rs",
        "rebase with descendants onto...",
        Command::Rebase(RebaseSource::Source, RebasePlacement::Onto),
    ),
    bind(
        "rb",
        "rebase branch onto...",
        Command::Rebase(RebaseSource::Branch, RebasePlacement::Onto),
    ),
    bind(
        "ra",
        "rebase revisions, insert after...",
        Command::Rebase(RebaseSource::Revisions, RebasePlacement::InsertAfter),
    ),
    bind(
        "ri",
        "rebase revisions, insert before...",
        Command::Rebase(RebaseSource::Revisions, RebasePlacement::InsertBefore),
    ),
    bind("aa", "abandon", Command::Abandon(AbandonMode::Plain)),
    bind(
        "ar",
        "abandon, keep bookmarks",
        Command::Abandon(AbandonMode::RetainBookmarks),
    ),
    bind(
        "ad",
        "abandon, keep descendants' content",
        Command::Abandon(AbandonMode::RestoreDescendants),
    ),
    bind("D", "duplicate", Command::Duplicate),
    bind(
        "bs",
        "set bookmark",
        Command::BookmarkSet {
            allow_backwards: false,
        },
    ),
    bind(
        "bS",
        "set bookmark, allow backwards",
        Command::BookmarkSet {
            allow_backwards: true,
        },
    ),
    bind("bd", "delete bookmark", Command::BookmarkDelete),
    bind("gff", "git fetch", Command::Git(GitCommand::Fetch)),
    bind(
        "gfa",
        "git fetch, all remotes",
        Command::Git(GitCommand::FetchAllRemotes),
    ),
    bind(
        "gft",
        "git fetch, tracked bookmarks",
        Command::Git(GitCommand::FetchTracked),
    ),
    bind("gfb", "git fetch branch...", Command::Git(GitCommand::FetchBranch)),
    bind("gfr", "git fetch remote...", Command::Git(GitCommand::FetchRemote)),
    bind("gpp", "git push", Command::Git(GitCommand::Push)),
    bind("gpa", "git push, all bookmarks", Command::Git(GitCommand::PushAll)),
    bind(
        "gpt",
        "git push, tracked bookmarks",
        Command::Git(GitCommand::PushTracked),
    ),
    bind(
        "gpd",
        "git push, deleted bookmarks",
        Command::Git(GitCommand::PushDeleted),
    ),
    bind(
        "gpr",
        "git push bookmarks at cursor",
        Command::Git(GitCommand::PushRevision),
    ),
    bind(
        "gpc",
        "git push new bookmark for cursor",
        Command::Git(GitCommand::PushChange),
    ),
    bind(
        "gpn",
        "git push named bookmark for cursor...",
        Command::Git(GitCommand::PushNamed),
    ),
    bind("gpb", "git push bookmark...", Command::Git(GitCommand::PushBookmark)),
    bind("u", "undo", Command::Undo),
    bind("U", "redo", Command::Redo),
    bind("L", "change revset", Command::EditRevset),
    bind("/", "filter by text", Command::FilterText),
    bind("f", "cycle filter", Command::CycleFilter),
    bind("!", "toggle immutability override", Command::ToggleIgnoreImmutable),
    bind("R", "refresh", Command::Refresh),
    bind("?", "help", Command::Help),
    bind("q", "quit", Command::Quit),
];

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Lookup {
    Command(Command),
    /// The keys so far are a prefix of at least one binding.
    Pending,
    Unbound(String),
    Ignored,
}

#[derive(Debug, Default)]
pub(super) struct KeySequence {
    pending: String,
}

impl KeySequence {
    pub(super) fn pending(&self) -> &str {
        &self.pending
    }

    pub(super) fn reset(&mut self) {
        self.pending.clear();
    }

    /// Bindings that can still complete the current prefix.
    pub(super) fn continuations(&self) -> impl Iterator<Item = &'static Binding> + '_ {
        BINDINGS
            .iter()
            .filter(|b| !self.pending.is_empty() && b.keys.starts_with(self.pending.as_str()))
    }

    pub(super) fn push(&mut self, key: KeyEvent) -> Lookup {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.reset();
            return match key.code {
                KeyCode::Char('c') => Lookup::Command(Command::Quit),
                KeyCode::Char('r') => Lookup::Command(Command::Redo),
                _ => Lookup::Ignored,
            };
        }

        let direct = match key.code {
            KeyCode::Up => Some(Command::Move(Direction::Up)),
            KeyCode::Down => Some(Command::Move(Direction::Down)),
            KeyCode::Home => Some(Command::Move(Direction::Top)),
            KeyCode::End => Some(Command::Move(Direction::Bottom)),
            KeyCode::Enter => Some(Command::Accept),
            KeyCode::Esc => Some(Command::Cancel),
            KeyCode::F(5) => Some(Command::Refresh),
            _ => None,
        };
        if let Some(cmd) = direct {
            // Esc only abandons a half-typed sequence when there is one.
            let had_prefix = !self.pending.is_empty();
            self.reset();
            if cmd == Command::Cancel && had_prefix {
                return Lookup::Ignored;
            }
            return Lookup::Command(cmd);
        }

        let KeyCode::Char(c) = key.code else {
            return Lookup::Ignored;
        };
        self.pending.push(c);

        if let Some(b) = BINDINGS.iter().find(|b| b.keys == self.pending) {
            self.reset();
            return Lookup::Command(b.command);
        }
        if self.continuations().next().is_some() {
            return Lookup::Pending;
        }
        Lookup::Unbound(std::mem::take(&mut self.pending))
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/keymap_tests.rs"]
mod tests;
