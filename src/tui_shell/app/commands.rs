use super::*;
use crate::model::{FetchScope, OperationKind, PushScope};
use crate::selection::NodeFilter;

impl App {
    pub(super) fn run_command(&mut self, cmd: Command) {
        match cmd {
            Command::Quit => self.quit = true,
            Command::Help => self.open_help(),
            Command::Refresh => {
                let req = self.session.request_fetch();
                if req.is_none() {
                    self.session.note("refresh queued behind the running fetch");
                }
                self.send(req);
            }
            Command::Cancel => self.cancel(),
            Command::Accept => self.finish_pick(),
            Command::Move(dir) => {
                self.session.move_cursor(dir);
            }
            Command::ToggleSelect => {
                self.session.toggle_select();
            }

            Command::New(placement) => self.start_action(Action::New { placement }),
            Command::Edit => self.start_action(Action::Edit),
            Command::Duplicate => self.start_action(Action::Duplicate),
            Command::Undo => self.start_action(Action::Undo),
            Command::Redo => self.start_action(Action::Redo),
            Command::Abandon(mode) => self.start_action(Action::Abandon { mode }),
            Command::SquashIntoParent => self.start_action(Action::Squash { into: None }),

            Command::SquashInto => {
                let Some(from) = self.session.selection().cursor().cloned() else {
                    self.session.report_error("nothing selected");
                    return;
                };
                self.session.note(format!(
                    "squash {} into: move to the destination, Enter to confirm, Esc to cancel",
                    from.short()
                ));
                self.pick = Some(Pick {
                    purpose: PickPurpose::SquashInto { from },
                    auto_selected: false,
                });
            }
            Command::Rebase(source, placement) => {
                let auto_selected = self.session.selection().selected().is_empty();
                if auto_selected && !self.session.toggle_select() {
                    self.session.report_error("nothing selected");
                    return;
                }
                let n = self.session.selection().selected().len();
                self.session.note(format!(
                    "rebase {n} changeset(s): move to the destination, Enter to confirm, Esc to cancel"
                ));
                self.pick = Some(Pick {
                    purpose: PickPurpose::Rebase { source, placement },
                    auto_selected,
                });
            }

            Command::Describe => {
                let current = self
                    .session
                    .selection()
                    .cursor()
                    .and_then(|id| self.session.model().get(id))
                    .map(|n| n.description.clone())
                    .unwrap_or_default();
                self.open_text_input("describe", "message: ", TextPurpose::Describe, &current);
            }
            Command::BookmarkSet { allow_backwards } => {
                self.open_text_input(
                    "set bookmark",
                    "name: ",
                    TextPurpose::BookmarkSet { allow_backwards },
                    "",
                );
            }
            Command::BookmarkDelete => {
                let current = self.cursor_bookmark();
                self.open_text_input(
                    "delete bookmark",
                    "name: ",
                    TextPurpose::BookmarkDelete,
                    &current,
                );
            }
            Command::EditRevset => {
                let current = self.session.revset().to_string();
                self.open_text_input("revset", "revset: ", TextPurpose::Revset, &current);
            }
            Command::FilterText => {
                let current = match self.session.selection().filter() {
                    NodeFilter::Text(q) => q.clone(),
                    _ => String::new(),
                };
                self.open_text_input("filter", "contains: ", TextPurpose::Filter, &current);
            }
            Command::CycleFilter => {
                let next = match self.session.selection().filter() {
                    NodeFilter::All => NodeFilter::Mutable,
                    NodeFilter::Mutable => NodeFilter::Bookmarked,
                    NodeFilter::Bookmarked => NodeFilter::Conflicted,
                    NodeFilter::Conflicted | NodeFilter::Text(_) => NodeFilter::All,
                };
                let label = next.label();
                self.session.set_filter(next);
                self.session.note(format!("filter: {label}"));
            }
            Command::ToggleIgnoreImmutable => {
                let on = !self.session.ignore_immutable();
                self.session.set_ignore_immutable(on);
            }
            Command::Git(git) => self.run_git(git),
        }
    }

    fn run_git(&mut self, git: GitCommand) {
        let fetch = |scope| Action::GitFetch { scope };
        let push = |scope| Action::GitPush { scope };
        let action = match git {
            GitCommand::Fetch => fetch(FetchScope::Default),
            GitCommand::FetchAllRemotes => fetch(FetchScope::AllRemotes),
            GitCommand::FetchTracked => fetch(FetchScope::Tracked),
            GitCommand::Push => push(PushScope::Default),
            GitCommand::PushAll => push(PushScope::All),
            GitCommand::PushTracked => push(PushScope::Tracked),
            GitCommand::PushDeleted => push(PushScope::Deleted),
            GitCommand::PushRevision => push(PushScope::Revision),
            GitCommand::PushChange => push(PushScope::Change),
            GitCommand::FetchBranch => {
                return self.open_text_input(
                    "git fetch",
                    "branch: ",
                    TextPurpose::Git(git),
                    "",
                );
            }
            GitCommand::FetchRemote => {
                return self.open_text_input(
                    "git fetch",
                    "remote: ",
                    TextPurpose::Git(git),
                    "origin",
                );
            }
            GitCommand::PushNamed => {
                return self.open_text_input(
                    "git push",
                    "new bookmark: ",
                    TextPurpose::Git(git),
                    "",
                );
            }
            GitCommand::PushBookmark => {
                let current = self.cursor_bookmark();
                return self.open_text_input(
                    "git push",
                    "bookmark: ",
                    TextPurpose::Git(git),
                    &current,
                );
            }
        };
        self.start_action(action);
    }

    fn cursor_bookmark(&self) -> String {
        self.session
            .selection()
            .cursor()
            .and_then(|id| self.session.model().get(id))
            .and_then(|n| n.bookmarks.iter().next().cloned())
            .unwrap_or_default()
    }

    fn cancel(&mut self) {
        if let Some(pick) = self.pick.take() {
            if pick.auto_selected {
                self.session.clear_selection();
            }
            self.session.note("cancelled");
        } else if !self.session.selection().selected().is_empty() {
            self.session.clear_selection();
        }
    }

    fn finish_pick(&mut self) {
        let Some(pick) = self.pick.take() else {
            return;
        };
        let Some(dest) = self.session.selection().cursor().cloned() else {
            return;
        };
        match pick.purpose {
            PickPurpose::Rebase { source, placement } => {
                self.start_action(Action::Rebase {
                    destination: dest,
                    source,
                    placement,
                });
                if pick.auto_selected {
                    self.session.clear_selection();
                }
            }
            PickPurpose::SquashInto { from } => {
                // Squash reads its source from the cursor.
                self.session.set_cursor(&from);
                self.start_action(Action::Squash {
                    into: Some(dest.clone()),
                });
                self.session.set_cursor(&dest);
            }
        }
    }

    /// Validates `action`; rewrites with a blast radius go through a
    /// confirmation modal, the rest are submitted right away. Refusals
    /// land on the status line.
    pub(super) fn start_action(&mut self, action: Action) {
        if !needs_confirm(&action) {
            if let Ok(req) = self.session.dispatch(&action) {
                self.worker.send(req);
            }
            return;
        }
        let Ok(plan) = self.session.plan(&action) else {
            return;
        };
        let lines = confirm_lines(&self.session, &plan);
        self.modal = Some(Modal::new(
            plan.kind.label(),
            lines,
            ModalKind::Confirm { plan },
        ));
    }

    pub(in crate::tui_shell) fn confirm(&mut self, plan: PlannedOperation) {
        if let Ok(req) = self.session.submit(plan) {
            self.worker.send(req);
        }
    }

    pub(in crate::tui_shell) fn submit_text(&mut self, purpose: TextPurpose, value: String) {
        match purpose {
            TextPurpose::Describe => self.start_action(Action::Describe { message: value }),
            TextPurpose::BookmarkSet { allow_backwards } => {
                let name = value.trim();
                if name.is_empty() {
                    self.session.report_error("bookmark name is empty");
                    return;
                }
                self.start_action(Action::BookmarkMove {
                    name: name.to_string(),
                    to: None,
                    allow_backwards,
                });
            }
            TextPurpose::BookmarkDelete => {
                let name = value.trim();
                if name.is_empty() {
                    self.session.report_error("bookmark name is empty");
                    return;
                }
                self.start_action(Action::BookmarkDelete {
                    name: name.to_string(),
                });
            }
            TextPurpose::Revset => {
                let revset = value.trim();
                if revset.is_empty() {
                    self.session.report_error("revset is empty");
                    return;
                }
                let req = self.session.set_revset(revset);
                self.send(req);
            }
            TextPurpose::Filter => {
                let query = value.trim();
                let filter = if query.is_empty() {
                    NodeFilter::All
                } else {
                    NodeFilter::Text(query.to_string())
                };
                self.session.set_filter(filter);
            }
            TextPurpose::Git(git) => {
                let name = value.trim().to_string();
                let action = match git {
                    GitCommand::FetchBranch => Action::GitFetch {
                        scope: FetchScope::Branch { name },
                    },
                    GitCommand::FetchRemote => Action::GitFetch {
                        scope: FetchScope::Remote { name },
                    },
                    GitCommand::PushNamed => Action::GitPush {
                        scope: PushScope::Named { name },
                    },
                    GitCommand::PushBookmark => Action::GitPush {
                        scope: PushScope::Bookmark { name },
                    },
                    other => return self.run_git(other),
                };
                self.start_action(action);
            }
        }
    }

    fn open_text_input(
        &mut self,
        title: &str,
        prompt: &'static str,
        purpose: TextPurpose,
        initial: &str,
    ) {
        let mut modal = Modal::new(
            title,
            vec!["Enter: apply   Esc: cancel".to_string()],
            ModalKind::TextInput { prompt, purpose },
        );
        modal.input = Input::with_text(initial);
        self.modal = Some(modal);
    }

    fn open_help(&mut self) {
        let mut lines = vec!["arrows/Home/End move, Enter finishes a pick, Esc cancels".to_string()];
        lines.push(String::new());
        for b in BINDINGS {
            let keys = if b.keys == " " { "space" } else { b.keys };
            lines.push(format!("{keys:<6} {}", b.help));
        }
        self.modal = Some(Modal::new("keys", lines, ModalKind::Viewer));
    }
}

fn needs_confirm(action: &Action) -> bool {
    matches!(
        action,
        Action::Rebase { .. }
            | Action::Squash { .. }
            | Action::Abandon { .. }
            | Action::BookmarkDelete { .. }
            | Action::BookmarkMove {
                allow_backwards: true,
                ..
            }
            | Action::Undo
            | Action::Redo
            | Action::GitPush { .. }
    )
}

fn confirm_lines(session: &Session, plan: &PlannedOperation) -> Vec<String> {
    let mut lines = vec![plan.summary(), String::new()];
    if matches!(plan.kind, OperationKind::Undo | OperationKind::Redo) {
        if let Some(top) = session.model().snapshot().operations().first() {
            lines.push(format!("last operation: {}", top.description));
        }
    } else if plan.affected.is_empty() {
        lines.push("no changesets in view are affected".to_string());
    } else {
        lines.push(format!("{} changeset(s) affected:", plan.affected.len()));
        let mut affected = plan.affected.iter().collect::<Vec<_>>();
        affected.sort_by_key(|id| std::cmp::Reverse(session.layout().row_of(id)));
        for id in affected {
            let summary = session
                .model()
                .get(id)
                .map(|n| n.summary())
                .unwrap_or_default();
            lines.push(format!("  {} {}", id.short(), summary));
        }
    }
    lines.push(String::new());
    lines.push("Enter/y: run   Esc/n: cancel".to_string());
    lines
}
