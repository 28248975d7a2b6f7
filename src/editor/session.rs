//! エディタセッション
//!
//! ギャップバッファ・カーソル／選択・編集履歴を単一の所有者としてまとめ、
//! 高水準の編集操作を履歴に対して原子的に適用する。
//! 各編集操作はちょうど1回だけ履歴に記録し、ナビゲーションは記録しない。
//! 失敗した操作は状態を一切変更しない。

use std::time::Duration;

use crate::buffer::{self, CursorMover, GapBuffer, NavigationAction, Selection};
use crate::config::EditorConfig;
use crate::editor::clock::{Clock, SystemClock};
use crate::editor::history::{EditAction, EditLog};
use crate::error::{edit::Result, EditError};

/// 編集操作インターフェース
///
/// 戻り値の `true` は編集が適用されたこと、`false` は定義済みの no-op を表す。
pub trait EditOperations {
    /// 文字を入力（選択中なら置換）
    fn type_char(&mut self, ch: char) -> Result<bool>;

    /// 改行を入力
    fn insert_newline(&mut self) -> Result<bool>;

    /// Backspace削除（カーソル前削除）
    fn backspace(&mut self) -> Result<bool>;

    /// Delete削除（カーソル後削除）
    fn forward_delete(&mut self) -> Result<bool>;

    /// 文字列を貼り付け（1つの取り消し単位）
    fn paste(&mut self, text: &str) -> Result<bool>;

    /// 選択範囲を削除
    fn delete_selection(&mut self) -> Result<bool>;

    /// 直前の編集を取り消し
    fn undo(&mut self) -> Result<()>;

    /// 取り消した編集をやり直し
    fn redo(&mut self) -> Result<()>;
}

/// 履歴への記録方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordMode {
    /// 直前のエントリへの結合を試みる
    Mergeable,
    /// 常に独立した取り消し単位
    Atomic,
}

/// エディタセッション
pub struct EditorSession {
    buffer: GapBuffer,
    cursor: usize,
    selection: Selection,
    history: EditLog,
    modified: bool,
    initial_capacity: usize,
}

impl EditorSession {
    /// 既定設定で空のセッションを作成
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    /// 設定から空のセッションを作成
    pub fn with_config(config: &EditorConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    /// 時計を差し替えてセッションを作成
    pub fn with_clock(config: &EditorConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            buffer: GapBuffer::with_capacity(config.initial_capacity),
            cursor: 0,
            selection: Selection::new(),
            history: EditLog::with_clock(clock, Duration::from_millis(config.merge_window_ms)),
            modified: false,
            initial_capacity: config.initial_capacity,
        }
    }

    /// 文字列からセッションを作成
    pub fn from_str(text: &str) -> Self {
        let mut session = Self::new();
        session.load_document(text);
        session
    }

    // ---- ドキュメント ----

    /// 内容を置き換え、カーソル・選択・履歴をリセット
    pub fn load_document(&mut self, text: &str) {
        self.buffer.load_with_capacity(text, self.initial_capacity);
        self.cursor = 0;
        self.selection.clear();
        self.history.clear();
        self.modified = false;
        log::debug!("loaded document ({} chars)", self.buffer.len());
    }

    /// 新規ドキュメント
    pub fn new_document(&mut self) {
        self.load_document("");
    }

    /// 全テキスト
    pub fn current_text(&self) -> String {
        self.buffer.text()
    }

    pub fn char_at(&self, offset: usize) -> Result<char> {
        self.buffer.char_at(offset)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 保存後に変更があるか
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 保存済みとしてマーク
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn history(&self) -> &EditLog {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- カーソル・選択 ----

    pub fn cursor_offset(&self) -> usize {
        self.cursor
    }

    /// 正規化済みの選択範囲 `[start, end)`
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        self.selection.normalized()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// 1始まりの（行, 列）
    pub fn line_and_column_of(&self, offset: usize) -> Result<(usize, usize)> {
        buffer::line_and_column_of(&self.buffer, offset)
    }

    /// カーソル位置の1始まりの（行, 列）
    pub fn cursor_line_and_column(&self) -> (usize, usize) {
        buffer::line_and_column_of(&self.buffer, self.cursor).unwrap_or((1, 1))
    }

    /// 表示位置（0始まりの行・表示列）からオフセットを解決
    pub fn offset_at(&self, line: usize, column: usize) -> usize {
        buffer::xy_to_offset(&self.buffer, line, column)
    }

    /// カーソル移動。`extend` が真なら選択範囲を伸ばし、偽なら選択を解除する
    pub fn navigate(&mut self, action: NavigationAction, extend: bool) -> bool {
        if extend {
            self.selection.start(self.cursor);
        } else {
            self.selection.clear();
        }

        let moved = CursorMover::move_cursor(&self.buffer, &mut self.cursor, action);

        if extend {
            self.selection.extend_to(self.cursor);
        }
        moved
    }

    pub fn move_left(&mut self) -> bool {
        self.navigate(NavigationAction::MoveCharBackward, false)
    }

    pub fn move_right(&mut self) -> bool {
        self.navigate(NavigationAction::MoveCharForward, false)
    }

    pub fn move_up(&mut self) -> bool {
        self.navigate(NavigationAction::MoveLineUp, false)
    }

    pub fn move_down(&mut self) -> bool {
        self.navigate(NavigationAction::MoveLineDown, false)
    }

    /// カーソルを指定オフセットへ移動（選択は解除）
    pub fn set_cursor(&mut self, offset: usize) -> Result<()> {
        self.check_offset(offset)?;
        self.cursor = offset;
        self.selection.clear();
        Ok(())
    }

    /// 現在位置をアンカーとして選択を開始
    pub fn start_selection(&mut self) {
        self.selection.start(self.cursor);
    }

    /// 選択のアクティブ端（とカーソル）を指定オフセットへ
    pub fn extend_selection(&mut self, offset: usize) -> Result<()> {
        self.check_offset(offset)?;
        self.selection.start(self.cursor);
        self.cursor = offset;
        self.selection.extend_to(offset);
        Ok(())
    }

    /// 選択範囲の拡張を終了（範囲は保持）
    pub fn finish_selection(&mut self) {
        self.selection.finish();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// 全体を選択し、カーソルを末尾へ
    pub fn select_all(&mut self) {
        self.selection.clear();
        self.selection.start(0);
        self.selection.extend_to(self.buffer.len());
        self.selection.finish();
        self.cursor = self.buffer.len();
    }

    /// 選択中のテキスト（コピー用）
    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection.normalized()?;
        self.buffer.slice(start, end).ok()
    }

    /// 選択範囲を切り取り、切り取ったテキストを返す
    pub fn cut(&mut self) -> Result<Option<String>> {
        let Some((start, end)) = self.selection.normalized() else {
            return Ok(None);
        };
        let text = self.buffer.slice(start, end)?;
        self.apply(
            EditAction::Delete {
                position: start,
                text: text.clone(),
            },
            RecordMode::Mergeable,
        )?;
        Ok(Some(text))
    }

    // ---- 内部処理 ----

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.buffer.len() {
            return Err(EditError::out_of_range(offset, self.buffer.len()));
        }
        Ok(())
    }

    /// アクションをバッファへ適用してから記録する
    fn apply(&mut self, action: EditAction, mode: RecordMode) -> Result<bool> {
        let cursor_before = self.cursor;
        let cursor = action.apply(&mut self.buffer)?;
        log::trace!("applied {:?}", action);

        match mode {
            RecordMode::Mergeable => self.history.record_from(action, cursor_before),
            RecordMode::Atomic => self.history.record_atomic_from(action, cursor_before),
        }

        self.cursor = cursor;
        self.selection.clear();
        self.modified = true;
        Ok(true)
    }

    /// 選択があれば置換、なければカーソル位置に挿入
    fn insert_text(&mut self, text: &str, mode: RecordMode) -> Result<bool> {
        let action = match self.selection.normalized() {
            Some((start, end)) => EditAction::Replace {
                position: start,
                old_text: self.buffer.slice(start, end)?,
                new_text: text.to_string(),
            },
            None => EditAction::Insert {
                position: self.cursor,
                text: text.to_string(),
            },
        };
        self.apply(action, mode)
    }

    fn delete_one(&mut self, position: usize) -> Result<bool> {
        let text = self.buffer.slice(position, position + 1)?;
        self.apply(EditAction::Delete { position, text }, RecordMode::Mergeable)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditOperations for EditorSession {
    fn type_char(&mut self, ch: char) -> Result<bool> {
        if !is_valid_input_char(ch) {
            return Err(EditError::InvalidChar(ch));
        }
        let mut buf = [0u8; 4];
        self.insert_text(ch.encode_utf8(&mut buf), RecordMode::Mergeable)
    }

    fn insert_newline(&mut self) -> Result<bool> {
        self.type_char('\n')
    }

    fn backspace(&mut self) -> Result<bool> {
        if self.selection.has_selection() {
            return self.delete_selection();
        }
        if self.cursor == 0 {
            return Ok(false);
        }
        self.delete_one(self.cursor - 1)
    }

    fn forward_delete(&mut self) -> Result<bool> {
        if self.selection.has_selection() {
            return self.delete_selection();
        }
        if self.cursor >= self.buffer.len() {
            return Ok(false);
        }
        self.delete_one(self.cursor)
    }

    fn paste(&mut self, text: &str) -> Result<bool> {
        let normalized = normalize_line_ending(text);
        if normalized.is_empty() {
            return Ok(false);
        }
        self.insert_text(&normalized, RecordMode::Atomic)
    }

    fn delete_selection(&mut self) -> Result<bool> {
        let Some((start, end)) = self.selection.normalized() else {
            return Ok(false);
        };
        let text = self.buffer.slice(start, end)?;
        self.apply(
            EditAction::Delete {
                position: start,
                text,
            },
            RecordMode::Mergeable,
        )
    }

    fn undo(&mut self) -> Result<()> {
        self.cursor = self.history.undo(&mut self.buffer)?;
        self.selection.clear();
        self.modified = true;
        Ok(())
    }

    fn redo(&mut self) -> Result<()> {
        self.cursor = self.history.redo(&mut self.buffer)?;
        self.selection.clear();
        self.modified = true;
        Ok(())
    }
}

/// 有効な入力文字かどうかを判定
pub(crate) fn is_valid_input_char(ch: char) -> bool {
    ch == '\n' || ch == '\t' || !ch.is_control()
}

/// 改行コードの正規化
fn normalize_line_ending(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}
