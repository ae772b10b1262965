use std::collections::HashSet;

use super::*;

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn single_keys_resolve_immediately() {
    let mut keys = KeySequence::default();
    assert_eq!(keys.push(key('e')), Lookup::Command(Command::Edit));
    assert_eq!(
        keys.push(key('j')),
        Lookup::Command(Command::Move(Direction::Down))
    );
    assert_eq!(keys.pending(), "");
}

#[test]
fn prefixes_wait_for_the_next_key() {
    let mut keys = KeySequence::default();
    assert_eq!(keys.push(key('r')), Lookup::Pending);
    assert_eq!(keys.pending(), "r");
    assert!(keys.continuations().all(|b| b.keys.starts_with('r')));
    assert_eq!(
        keys.push(key('s')),
        Lookup::Command(Command::Rebase(RebaseSource::Source, RebasePlacement::Onto))
    );
    assert_eq!(keys.pending(), "");
}

#[test]
fn unknown_sequences_are_reported_and_reset() {
    let mut keys = KeySequence::default();
    keys.push(key('n'));
    assert_eq!(keys.push(key('z')), Lookup::Unbound("nz".into()));
    assert_eq!(keys.pending(), "");
    assert_eq!(
        keys.push(key('n')),
        Lookup::Pending,
        "a fresh sequence starts after the reset"
    );
}

#[test]
fn escape_clears_a_prefix_before_cancelling() {
    let mut keys = KeySequence::default();
    keys.push(key('b'));
    assert_eq!(keys.push(code(KeyCode::Esc)), Lookup::Ignored);
    assert_eq!(keys.pending(), "");
    assert_eq!(keys.push(code(KeyCode::Esc)), Lookup::Command(Command::Cancel));
}

#[test]
fn special_keys_and_control_chords() {
    let mut keys = KeySequence::default();
    assert_eq!(
        keys.push(code(KeyCode::Home)),
        Lookup::Command(Command::Move(Direction::Top))
    );
    assert_eq!(keys.push(code(KeyCode::Enter)), Lookup::Command(Command::Accept));
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(keys.push(ctrl_c), Lookup::Command(Command::Quit));
    assert_eq!(keys.push(code(KeyCode::Tab)), Lookup::Ignored);
}

#[test]
fn bindings_are_unambiguous() {
    let mut seen = HashSet::new();
    for b in BINDINGS {
        assert!(seen.insert(b.keys), "duplicate binding {:?}", b.keys);
        // No complete binding may be a prefix of a longer one.
        assert!(
            !BINDINGS
                .iter()
                .any(|o| o.keys != b.keys && o.keys.starts_with(b.keys)),
            "{:?} shadows a longer binding",
            b.keys
        );
    }
}

#[test]
fn git_subtree_shares_the_g_prefix_with_top() {
    let mut keys = KeySequence::default();
    assert_eq!(keys.push(key('g')), Lookup::Pending);
    assert_eq!(keys.push(key('f')), Lookup::Pending);
    assert_eq!(
        keys.push(key('a')),
        Lookup::Command(Command::Git(GitCommand::FetchAllRemotes))
    );

    keys.push(key('g'));
    keys.push(key('p'));
    assert_eq!(
        keys.push(key('c')),
        Lookup::Command(Command::Git(GitCommand::PushChange))
    );

    keys.push(key('g'));
    assert_eq!(
        keys.push(key('g')),
        Lookup::Command(Command::Move(Direction::Top))
    );
}
