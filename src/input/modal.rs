//! モーダル入力
//!
//! ノーマルモードと挿入モードを切り替えながら単一キーを編集操作に変換する。
//! ノーマルモードでは `h` `j` `k` `l` で移動、`x` でカーソル位置の文字を削除、
//! `i` で挿入モードへ入る。挿入モードでは Esc でノーマルモードへ戻る。

use std::fmt;

use crate::buffer::NavigationAction;
use crate::editor::{EditOperations, EditorSession};
use crate::error::edit::Result;

/// Esc キー
pub const ESCAPE: char = '\u{1b}';

/// 入力モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Normal,
    Insert,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::Normal => write!(f, "-- NORMAL --"),
            EditMode::Insert => write!(f, "-- INSERT --"),
        }
    }
}

/// キー処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// 編集またはカーソル移動が起きた
    Applied,
    /// モードが切り替わった
    ModeChanged(EditMode),
    /// 割り当てのないキー、または境界での no-op
    Ignored,
}

/// モーダルキー処理
#[derive(Debug, Clone, Default)]
pub struct ModalInput {
    mode: EditMode,
}

impl ModalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// 1キーを処理する
    pub fn process_key(&mut self, session: &mut EditorSession, key: char) -> Result<KeyOutcome> {
        match self.mode {
            EditMode::Normal => self.process_normal_key(session, key),
            EditMode::Insert => self.process_insert_key(session, key),
        }
    }

    /// キー列を順に処理し、何か適用されたかを返す
    ///
    /// 途中のキーが失敗した場合はそこで止まり、それまでの結果は残る。
    pub fn process_keys(&mut self, session: &mut EditorSession, keys: &str) -> Result<bool> {
        let mut applied = false;
        for key in keys.chars() {
            applied |= self.process_key(session, key)? != KeyOutcome::Ignored;
        }
        Ok(applied)
    }

    fn process_normal_key(&mut self, session: &mut EditorSession, key: char) -> Result<KeyOutcome> {
        let moved = match key {
            'i' => return Ok(self.switch_to(EditMode::Insert)),
            'h' => session.navigate(NavigationAction::MoveCharBackward, false),
            'l' => session.navigate(NavigationAction::MoveCharForward, false),
            'j' => session.navigate(NavigationAction::MoveLineDown, false),
            'k' => session.navigate(NavigationAction::MoveLineUp, false),
            'x' => session.forward_delete()?,
            _ => false,
        };
        Ok(if moved {
            KeyOutcome::Applied
        } else {
            KeyOutcome::Ignored
        })
    }

    fn process_insert_key(&mut self, session: &mut EditorSession, key: char) -> Result<KeyOutcome> {
        if key == ESCAPE {
            return Ok(self.switch_to(EditMode::Normal));
        }
        session.type_char(key)?;
        Ok(KeyOutcome::Applied)
    }

    fn switch_to(&mut self, mode: EditMode) -> KeyOutcome {
        log::debug!("mode {} -> {}", self.mode, mode);
        self.mode = mode;
        KeyOutcome::ModeChanged(mode)
    }
}
