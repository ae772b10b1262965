use super::*;

#[test]
fn edits_at_the_cursor() {
    let mut input = Input::with_text("main");
    assert_eq!(input.cursor, 4);
    input.move_left();
    input.insert_char('X');
    assert_eq!(input.buf, "maiXn");
    input.backspace();
    input.home();
    input.delete();
    assert_eq!(input.buf, "ain");
    input.end();
    input.move_right();
    assert_eq!(input.cursor, 3);
}

#[test]
fn multibyte_text_is_edited_by_char() {
    let mut input = Input::with_text("fix ünïcode");
    input.home();
    for _ in 0..5 {
        input.move_right();
    }
    input.backspace();
    assert_eq!(input.buf, "fix nïcode");
    input.insert_char('ü');
    input.insert_char('→');
    assert_eq!(input.buf, "fix ü→nïcode");
    assert_eq!(input.cursor, 6);
}

#[test]
fn backspace_at_start_and_delete_at_end_do_nothing() {
    let mut input = Input::default();
    input.backspace();
    input.delete();
    assert!(input.buf.is_empty());
    input.set("ab");
    input.delete();
    assert_eq!(input.buf, "ab");
    input.clear();
    assert_eq!(input.cursor, 0);
}
