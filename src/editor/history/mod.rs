//! 編集履歴
//!
//! すべての変更を位置付きのアクションとして記録し、取り消し／やり直しを
//! アクションの構造的な逆操作として適用する。時間的・位置的に連続した
//! 同種のアクションは1つの取り消し単位にまとめる。

use std::time::Duration;

use thiserror::Error;

use crate::buffer::GapBuffer;
use crate::editor::clock::{Clock, SystemClock};
use crate::error::{edit::Result, EditError};

/// 連続入力とみなす既定の時間幅
pub const DEFAULT_MERGE_WINDOW: Duration = Duration::from_millis(800);

/// 履歴操作の最小単位
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Insert {
        position: usize,
        text: String,
    },
    /// `text` は削除された内容（逆操作で再挿入する）
    Delete {
        position: usize,
        text: String,
    },
    Replace {
        position: usize,
        old_text: String,
        new_text: String,
    },
}

impl EditAction {
    /// アクションの基準位置
    pub fn position(&self) -> usize {
        match self {
            EditAction::Insert { position, .. }
            | EditAction::Delete { position, .. }
            | EditAction::Replace { position, .. } => *position,
        }
    }

    /// バッファにアクションを適用し、適用後のカーソル位置を返す
    pub fn apply(&self, buffer: &mut GapBuffer) -> Result<usize> {
        match self {
            EditAction::Insert { position, text } => {
                buffer.insert(*position, text)?;
                Ok(position + char_len(text))
            }
            EditAction::Delete { position, text } => {
                buffer.delete(*position, char_len(text))?;
                Ok(*position)
            }
            EditAction::Replace {
                position,
                old_text,
                new_text,
            } => {
                buffer.delete(*position, char_len(old_text))?;
                buffer.insert(*position, new_text)?;
                Ok(position + char_len(new_text))
            }
        }
    }

    /// 逆操作を適用し、取り消し後のカーソル位置を返す
    pub fn revert(&self, buffer: &mut GapBuffer) -> Result<usize> {
        match self {
            EditAction::Insert { position, text } => {
                buffer.delete(*position, char_len(text))?;
            }
            EditAction::Delete { position, text } => {
                buffer.insert(*position, text)?;
            }
            EditAction::Replace {
                position,
                old_text,
                new_text,
            } => {
                buffer.delete(*position, char_len(new_text))?;
                buffer.insert(*position, old_text)?;
            }
        }
        Ok(self.reverted_cursor())
    }

    /// 編集前のカーソル位置が分からない場合に使う、取り消し後の位置
    fn reverted_cursor(&self) -> usize {
        match self {
            EditAction::Insert { position, .. } => *position,
            EditAction::Delete { position, text } => position + char_len(text),
            EditAction::Replace {
                position, old_text, ..
            } => position + char_len(old_text),
        }
    }
}

/// 結合条件を満たさないことを示す内部シグナル
#[derive(Debug, Error, PartialEq, Eq)]
#[error("actions cannot be merged")]
struct InvalidMerge;

/// 直前のアクションと新しいアクションを結合する
fn merge_actions(prev: &EditAction, new: &EditAction) -> std::result::Result<EditAction, InvalidMerge> {
    match (prev, new) {
        (
            EditAction::Insert {
                position: prev_pos,
                text: prev_text,
            },
            EditAction::Insert {
                position: new_pos,
                text: new_text,
            },
        ) if prev_pos + char_len(prev_text) == *new_pos => Ok(EditAction::Insert {
            position: *prev_pos,
            text: format!("{prev_text}{new_text}"),
        }),
        (
            EditAction::Delete {
                position: prev_pos,
                text: prev_text,
            },
            EditAction::Delete {
                position: new_pos,
                text: new_text,
            },
        ) => {
            if new_pos + char_len(new_text) == *prev_pos {
                // 後退削除：直前の削除位置のすぐ左
                Ok(EditAction::Delete {
                    position: *new_pos,
                    text: format!("{new_text}{prev_text}"),
                })
            } else if new_pos == prev_pos {
                // 前方削除：後続の文字が同じ位置に詰められてくる
                Ok(EditAction::Delete {
                    position: *prev_pos,
                    text: format!("{prev_text}{new_text}"),
                })
            } else {
                Err(InvalidMerge)
            }
        }
        _ => Err(InvalidMerge),
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// 履歴エントリ
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub action: EditAction,
    /// 最後に記録（または結合）された時刻
    pub recorded_at: Duration,
    /// 編集前のカーソル位置（結合後も最初の編集のものを保つ）
    pub cursor_before: usize,
    /// 後続アクションとの結合を許すか
    pub coalescable: bool,
}

/// 編集履歴スタック
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// 取り消しスタックのアクション（古い順）
    pub fn undo_actions(&self) -> impl Iterator<Item = &EditAction> {
        self.undo.iter().map(|entry| &entry.action)
    }

    fn seal_top(&mut self) {
        if let Some(top) = self.undo.last_mut() {
            top.coalescable = false;
        }
    }

    fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// 編集アクションログ
///
/// 取り消し／やり直しの両スタックと、結合判定用の時計を保持する。
pub struct EditLog {
    stack: HistoryStack,
    clock: Box<dyn Clock>,
    merge_window: Duration,
}

impl EditLog {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock::new()), DEFAULT_MERGE_WINDOW)
    }

    pub fn with_clock(clock: Box<dyn Clock>, merge_window: Duration) -> Self {
        Self {
            stack: HistoryStack::new(),
            clock,
            merge_window,
        }
    }

    pub fn stack(&self) -> &HistoryStack {
        &self.stack
    }

    pub fn merge_window(&self) -> Duration {
        self.merge_window
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    /// アクションを記録する（可能なら直前のエントリへ結合）
    pub fn record(&mut self, action: EditAction) {
        let cursor_before = action.reverted_cursor();
        self.record_from(action, cursor_before);
    }

    /// 編集前のカーソル位置とともにアクションを記録する
    pub fn record_from(&mut self, action: EditAction, cursor_before: usize) {
        let now = self.clock.now();
        self.stack.redo.clear();

        if let Some(top) = self.stack.undo.last_mut() {
            if top.coalescable && now.saturating_sub(top.recorded_at) < self.merge_window {
                match merge_actions(&top.action, &action) {
                    Ok(merged) => {
                        log::trace!("merged {:?} into {:?}", action, top.action);
                        top.action = merged;
                        top.recorded_at = now;
                        return;
                    }
                    Err(InvalidMerge) => {}
                }
            }
        }

        let coalescable = !matches!(action, EditAction::Replace { .. });
        self.push(action, now, cursor_before, coalescable);
    }

    /// 結合せず独立した取り消し単位として記録する（貼り付けなど）
    pub fn record_atomic(&mut self, action: EditAction) {
        let cursor_before = action.reverted_cursor();
        self.record_atomic_from(action, cursor_before);
    }

    pub fn record_atomic_from(&mut self, action: EditAction, cursor_before: usize) {
        let now = self.clock.now();
        self.stack.redo.clear();
        self.push(action, now, cursor_before, false);
    }

    fn push(&mut self, action: EditAction, now: Duration, cursor_before: usize, coalescable: bool) {
        self.stack.undo.push(HistoryEntry {
            action,
            recorded_at: now,
            cursor_before,
            coalescable,
        });
    }

    /// 直前のアクションを取り消し、編集前のカーソル位置を返す
    ///
    /// 逆操作の適用に失敗した場合、両スタックは変更されない。
    pub fn undo(&mut self, buffer: &mut GapBuffer) -> Result<usize> {
        let Some(entry) = self.stack.undo.pop() else {
            return Err(EditError::EmptyHistory);
        };

        match entry.action.revert(buffer) {
            Ok(_) => {
                log::debug!("undo {:?}", entry.action);
                let cursor = entry.cursor_before.min(buffer.len());
                self.stack.seal_top();
                self.stack.redo.push(HistoryEntry {
                    coalescable: false,
                    ..entry
                });
                Ok(cursor)
            }
            Err(err) => {
                log::warn!("undo failed for {:?}: {}", entry.action, err);
                self.stack.undo.push(entry);
                Err(err)
            }
        }
    }

    /// 取り消したアクションを再適用し、カーソル位置を返す
    pub fn redo(&mut self, buffer: &mut GapBuffer) -> Result<usize> {
        let Some(entry) = self.stack.redo.pop() else {
            return Err(EditError::EmptyHistory);
        };

        match entry.action.apply(buffer) {
            Ok(cursor) => {
                log::debug!("redo {:?}", entry.action);
                self.stack.undo.push(entry);
                Ok(cursor)
            }
            Err(err) => {
                log::warn!("redo failed for {:?}: {}", entry.action, err);
                self.stack.redo.push(entry);
                Err(err)
            }
        }
    }

    /// 両スタックを空にする
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

impl Default for EditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::clock::ManualClock;

    fn insert(position: usize, text: &str) -> EditAction {
        EditAction::Insert {
            position,
            text: text.to_string(),
        }
    }

    fn delete(position: usize, text: &str) -> EditAction {
        EditAction::Delete {
            position,
            text: text.to_string(),
        }
    }

    fn log_with_manual_clock() -> (EditLog, ManualClock) {
        let clock = ManualClock::new();
        let log = EditLog::with_clock(Box::new(clock.clone()), DEFAULT_MERGE_WINDOW);
        (log, clock)
    }

    #[test]
    fn test_contiguous_inserts_merge() {
        let (mut log, clock) = log_with_manual_clock();
        log.record(insert(0, "a"));
        clock.advance_ms(100);
        log.record(insert(1, "b"));
        clock.advance_ms(100);
        log.record(insert(2, "c"));

        assert_eq!(log.stack().undo_len(), 1);
        assert_eq!(log.stack().undo_actions().next(), Some(&insert(0, "abc")));
    }

    #[test]
    fn test_window_expiry_breaks_merge() {
        let (mut log, clock) = log_with_manual_clock();
        log.record(insert(0, "a"));
        clock.advance_ms(801);
        log.record(insert(1, "b"));
        assert_eq!(log.stack().undo_len(), 2);
    }

    #[test]
    fn test_window_is_measured_from_last_record() {
        let (mut log, clock) = log_with_manual_clock();
        for (idx, ch) in ["a", "b", "c", "d"].iter().enumerate() {
            log.record(insert(idx, ch));
            clock.advance_ms(500);
        }
        assert_eq!(log.stack().undo_len(), 1);
    }

    #[test]
    fn test_non_contiguous_insert_does_not_merge() {
        let (mut log, _clock) = log_with_manual_clock();
        log.record(insert(0, "a"));
        log.record(insert(5, "b"));
        assert_eq!(log.stack().undo_len(), 2);
    }

    #[test]
    fn test_backspace_deletes_merge_leftward() {
        let (mut log, _clock) = log_with_manual_clock();
        log.record(delete(4, "d"));
        log.record(delete(3, "c"));
        log.record(delete(2, "b"));
        assert_eq!(log.stack().undo_actions().last(), Some(&delete(2, "bcd")));
    }

    #[test]
    fn test_forward_deletes_merge_rightward() {
        let (mut log, _clock) = log_with_manual_clock();
        log.record(delete(2, "b"));
        log.record(delete(2, "c"));
        assert_eq!(log.stack().undo_actions().last(), Some(&delete(2, "bc")));
    }

    #[test]
    fn test_type_mismatch_and_replace_never_merge() {
        let (mut log, _clock) = log_with_manual_clock();
        log.record(insert(0, "a"));
        log.record(delete(0, "a"));
        log.record(EditAction::Replace {
            position: 0,
            old_text: "x".into(),
            new_text: "y".into(),
        });
        log.record(insert(1, "z"));
        assert_eq!(log.stack().undo_len(), 4);
    }

    #[test]
    fn test_atomic_record_is_its_own_unit() {
        let (mut log, _clock) = log_with_manual_clock();
        log.record(insert(0, "a"));
        log.record_atomic(insert(1, "pasted"));
        log.record(insert(7, "b"));
        assert_eq!(log.stack().undo_len(), 3);
    }

    #[test]
    fn test_merge_actions_rejects_gaps() {
        assert_eq!(merge_actions(&delete(5, "x"), &delete(1, "y")), Err(InvalidMerge));
        assert_eq!(merge_actions(&insert(0, "ab"), &insert(1, "c")), Err(InvalidMerge));
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let (mut log, _clock) = log_with_manual_clock();
        let mut buffer = GapBuffer::from_str("hello world");
        let action = insert(5, "X");
        action.apply(&mut buffer).unwrap();
        log.record(action);

        assert_eq!(log.undo(&mut buffer).unwrap(), 5);
        assert_eq!(buffer.text(), "hello world");
        assert_eq!(log.redo(&mut buffer).unwrap(), 6);
        assert_eq!(buffer.text(), "helloX world");
    }

    #[test]
    fn test_undo_returns_cursor_before_first_merged_edit() {
        let (mut log, _clock) = log_with_manual_clock();
        let mut buffer = GapBuffer::from_str("abcdef");
        for _ in 0..2 {
            let action = delete(1, &buffer.slice(1, 2).unwrap());
            action.apply(&mut buffer).unwrap();
            log.record_from(action, 1);
        }
        assert_eq!(log.stack().undo_len(), 1);

        assert_eq!(log.undo(&mut buffer).unwrap(), 1);
        assert_eq!(buffer.text(), "abcdef");
        assert_eq!(log.redo(&mut buffer).unwrap(), 1);
        assert_eq!(buffer.text(), "adef");
    }

    #[test]
    fn test_redo_cursor_for_delete_and_replace() {
        let (mut log, clock) = log_with_manual_clock();
        let mut buffer = GapBuffer::from_str("one two three");
        let replace = EditAction::Replace {
            position: 4,
            old_text: "two".into(),
            new_text: "2".into(),
        };
        replace.apply(&mut buffer).unwrap();
        log.record_from(replace, 7);
        clock.advance_ms(1_000);
        let removal = delete(0, "one");
        removal.apply(&mut buffer).unwrap();
        log.record_from(removal, 3);
        assert_eq!(buffer.text(), " 2 three");

        assert_eq!(log.undo(&mut buffer).unwrap(), 3);
        assert_eq!(log.undo(&mut buffer).unwrap(), 7);
        assert_eq!(buffer.text(), "one two three");

        assert_eq!(log.redo(&mut buffer).unwrap(), 5);
        assert_eq!(log.redo(&mut buffer).unwrap(), 0);
        assert_eq!(buffer.text(), " 2 three");
    }

    #[test]
    fn test_replace_inverse() {
        let mut buffer = GapBuffer::from_str("one two three");
        let action = EditAction::Replace {
            position: 4,
            old_text: "two".into(),
            new_text: "2".into(),
        };
        assert_eq!(action.apply(&mut buffer).unwrap(), 5);
        assert_eq!(buffer.text(), "one 2 three");
        assert_eq!(action.revert(&mut buffer).unwrap(), 7);
        assert_eq!(buffer.text(), "one two three");
    }

    #[test]
    fn test_empty_history() {
        let mut log = EditLog::new();
        let mut buffer = GapBuffer::new();
        assert_eq!(log.undo(&mut buffer), Err(EditError::EmptyHistory));
        assert_eq!(log.redo(&mut buffer), Err(EditError::EmptyHistory));
    }

    #[test]
    fn test_record_clears_redo() {
        let (mut log, _clock) = log_with_manual_clock();
        let mut buffer = GapBuffer::new();
        let action = insert(0, "a");
        action.apply(&mut buffer).unwrap();
        log.record(action);
        log.undo(&mut buffer).unwrap();
        assert!(log.can_redo());

        let action = insert(0, "b");
        action.apply(&mut buffer).unwrap();
        log.record(action);
        assert!(!log.can_redo());
        assert_eq!(log.redo(&mut buffer), Err(EditError::EmptyHistory));
    }

    #[test]
    fn test_stale_undo_leaves_stacks_untouched() {
        let (mut log, _clock) = log_with_manual_clock();
        log.record(insert(10, "abc"));
        let mut buffer = GapBuffer::from_str("short");

        assert!(matches!(
            log.undo(&mut buffer),
            Err(EditError::OutOfRange { .. })
        ));
        assert_eq!(log.stack().undo_len(), 1);
        assert_eq!(buffer.text(), "short");
    }

    #[test]
    fn test_undo_seals_remaining_entry() {
        let (mut log, _clock) = log_with_manual_clock();
        let mut buffer = GapBuffer::new();
        for action in [insert(0, "ab"), insert(10, "x")] {
            log.record(action);
        }
        buffer.insert(0, "ab").unwrap();
        buffer.insert(2, "        x").unwrap();
        log.undo(&mut buffer).unwrap();

        log.record(insert(2, "c"));
        assert_eq!(log.stack().undo_len(), 2);
    }
}
