use proptest::prelude::*;
use tsuzuri::editor::{EditError, EditOperations, EditorSession, ManualClock};
use tsuzuri::EditorConfig;

fn open_session(text: &str) -> (EditorSession, ManualClock) {
    let clock = ManualClock::new();
    let mut session = EditorSession::with_clock(&EditorConfig::default(), Box::new(clock.clone()));
    session.load_document(text);
    (session, clock)
}

#[test]
fn test_insert_and_undo_scenario() {
    let (mut session, _clock) = open_session("hello world");
    session.set_cursor(5).unwrap();
    session.type_char('X').unwrap();
    assert_eq!(session.current_text(), "helloX world");

    session.undo().unwrap();
    assert_eq!(session.current_text(), "hello world");
    assert_eq!(session.cursor_offset(), 5);

    session.redo().unwrap();
    assert_eq!(session.current_text(), "helloX world");
    assert_eq!(session.cursor_offset(), 6);
}

#[test]
fn test_vertical_navigation_scenario() {
    let (mut session, _clock) = open_session("hello\nworld");
    session.set_cursor(2).unwrap();

    assert!(session.move_down());
    assert_eq!(session.cursor_offset(), 8);
    assert_eq!(session.line_and_column_of(8).unwrap(), (2, 3));

    assert!(session.move_up());
    assert_eq!(session.cursor_offset(), 2);
}

#[test]
fn test_boundary_noops() {
    let (mut session, _clock) = open_session("one\ntwo");
    assert_eq!(session.backspace(), Ok(false));
    assert!(!session.move_up());
    assert!(!session.move_left());

    session.set_cursor(session.len()).unwrap();
    assert_eq!(session.forward_delete(), Ok(false));
    assert!(!session.move_down());
    assert!(!session.move_right());

    assert_eq!(session.current_text(), "one\ntwo");
    assert!(!session.can_undo());
}

#[test]
fn test_merge_window() {
    let (mut session, clock) = open_session("");
    for ch in "abc".chars() {
        session.type_char(ch).unwrap();
        clock.advance_ms(50);
    }
    assert_eq!(session.history().stack().undo_len(), 1);
    session.undo().unwrap();
    assert_eq!(session.current_text(), "");

    let (mut session, clock) = open_session("");
    session.type_char('a').unwrap();
    clock.advance_ms(2_000);
    session.type_char('b').unwrap();
    assert_eq!(session.history().stack().undo_len(), 2);
}

#[test]
fn test_zero_merge_window_disables_coalescing() {
    let config = EditorConfig {
        merge_window_ms: 0,
        ..EditorConfig::default()
    };
    let clock = ManualClock::new();
    let mut session = EditorSession::with_clock(&config, Box::new(clock));
    session.type_char('a').unwrap();
    session.type_char('b').unwrap();
    assert_eq!(session.history().stack().undo_len(), 2);
}

#[test]
fn test_redo_invalidated_by_new_edit() {
    let (mut session, _clock) = open_session("");
    session.type_char('a').unwrap();
    session.undo().unwrap();
    assert!(session.can_redo());

    session.type_char('b').unwrap();
    assert_eq!(session.redo(), Err(EditError::EmptyHistory));
    assert_eq!(session.current_text(), "b");
}

#[test]
fn test_undo_with_empty_history() {
    let (mut session, _clock) = open_session("text");
    assert_eq!(session.undo(), Err(EditError::EmptyHistory));
    assert_eq!(session.current_text(), "text");
}

#[test]
fn test_backward_and_forward_selection_delete_same_text() {
    let (mut forward, _clock) = open_session("the quick brown fox");
    forward.set_cursor(4).unwrap();
    forward.extend_selection(10).unwrap();
    forward.delete_selection().unwrap();

    let (mut backward, _clock) = open_session("the quick brown fox");
    backward.set_cursor(10).unwrap();
    backward.extend_selection(4).unwrap();
    backward.delete_selection().unwrap();

    assert_eq!(forward.current_text(), "the brown fox");
    assert_eq!(backward.current_text(), forward.current_text());
    assert_eq!(forward.cursor_offset(), 4);
    assert_eq!(backward.cursor_offset(), 4);
}

#[test]
fn test_backspace_with_selection_deletes_range() {
    let (mut session, _clock) = open_session("abcdef");
    session.set_cursor(1).unwrap();
    session.start_selection();
    session.extend_selection(4).unwrap();
    session.finish_selection();

    assert_eq!(session.backspace(), Ok(true));
    assert_eq!(session.current_text(), "aef");
    session.undo().unwrap();
    assert_eq!(session.current_text(), "abcdef");
}

#[test]
fn test_paste_over_selection_is_single_replace() {
    let (mut session, _clock) = open_session("alpha beta");
    session.set_cursor(6).unwrap();
    session.extend_selection(10).unwrap();
    session.paste("gamma\ndelta").unwrap();
    assert_eq!(session.current_text(), "alpha gamma\ndelta");
    assert_eq!(session.cursor_offset(), 17);

    session.undo().unwrap();
    assert_eq!(session.current_text(), "alpha beta");
    assert!(!session.can_undo());
}

#[test]
fn test_newline_and_pointer_mapping() {
    let (mut session, _clock) = open_session("");
    for ch in "ab".chars() {
        session.type_char(ch).unwrap();
    }
    session.insert_newline().unwrap();
    session.type_char('c').unwrap();

    assert_eq!(session.current_text(), "ab\nc");
    assert_eq!(session.offset_at(1, 5), 4);
    assert_eq!(session.offset_at(0, 1), 1);
    assert_eq!(session.cursor_line_and_column(), (2, 2));
}

proptest! {
    #[test]
    fn undo_restores_state_and_redo_reapplies(
        initial in "[a-z\n]{0,24}",
        cursor_seed in 0usize..64,
        op in 0u8..4,
        ch in proptest::char::range('a', 'z'),
    ) {
        let (mut session, clock) = open_session(&initial);
        let cursor = cursor_seed % (session.len() + 1);
        session.set_cursor(cursor).unwrap();
        clock.advance_ms(5_000);

        let applied = match op {
            0 => session.type_char(ch).unwrap(),
            1 => session.backspace().unwrap(),
            2 => session.forward_delete().unwrap(),
            _ => session.paste("pasted\ntext").unwrap(),
        };
        prop_assume!(applied);

        let after = session.current_text();
        session.undo().unwrap();
        prop_assert_eq!(session.current_text(), initial);
        session.redo().unwrap();
        prop_assert_eq!(session.current_text(), after);
    }
}

#[test]
fn test_forward_delete_run_undo_restores_cursor() {
    let (mut session, _clock) = open_session("abcdef");
    session.set_cursor(1).unwrap();
    session.forward_delete().unwrap();
    session.forward_delete().unwrap();
    assert_eq!(session.current_text(), "adef");

    session.undo().unwrap();
    assert_eq!(session.current_text(), "abcdef");
    assert_eq!(session.cursor_offset(), 1);
}
