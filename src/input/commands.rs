//! コマンドシステム
//!
//! 行指向のコマンド言語でセッションを操作する。UI を持たない実行環境
//! （バッチ編集やテスト）から編集コアを駆動するために使う。

use crate::buffer::NavigationAction;
use crate::editor::session::is_valid_input_char;
use crate::editor::{EditOperations, EditorSession};
use crate::error::{EditError, InputError, Result};
use crate::input::modal::{EditMode, ModalInput, ESCAPE};

/// コマンド実行の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// 実行が成功したか（no-op は失敗扱い）
    pub success: bool,
    /// 呼び出し側へ渡す出力（コピー内容やステータス）
    pub output: Option<String>,
}

impl CommandResult {
    /// 成功結果を作成
    pub fn success() -> Self {
        Self {
            success: true,
            output: None,
        }
    }

    /// 出力付き成功結果を作成
    pub fn with_output(output: String) -> Self {
        Self {
            success: true,
            output: Some(output),
        }
    }

    /// 何も起きなかった結果を作成
    pub fn noop() -> Self {
        Self {
            success: false,
            output: None,
        }
    }

    fn from_applied(applied: bool) -> Self {
        if applied {
            Self::success()
        } else {
            Self::noop()
        }
    }
}

/// コマンドの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // 編集操作
    Type(String),
    Paste(String),
    Newline,
    Backspace,
    Delete,
    DeleteSelection,
    Cut,
    Copy,
    Undo,
    Redo,

    // カーソル移動
    Move(NavigationAction),
    Extend(NavigationAction),
    Goto(usize),
    Click { line: usize, column: usize },

    // 選択
    SelectStart,
    SelectTo(usize),
    SelectAll,
    SelectClear,

    // モーダルキー入力
    Keys(String),
    Mode,

    // 表示
    Status,
    Print,
}

impl Command {
    /// 1行をコマンドとして解釈する。空行と `#` で始まる行は `None`
    pub fn parse(line: &str) -> std::result::Result<Option<Command>, InputError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            return Ok(None);
        }

        let trimmed = trimmed.trim_start();
        let (name, arg) = match trimmed.split_once(' ') {
            Some((name, arg)) => (name, Some(arg)),
            None => (trimmed, None),
        };

        let command = match name {
            "type" => Command::Type(unescape(required(name, arg)?)),
            "paste" => Command::Paste(unescape(required(name, arg)?)),
            "newline" => Command::Newline,
            "backspace" => Command::Backspace,
            "delete" => Command::Delete,
            "delete-selection" => Command::DeleteSelection,
            "cut" => Command::Cut,
            "copy" => Command::Copy,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "extend" => Command::Extend(direction(name, required(name, arg)?.trim())?),
            "goto" => Command::Goto(number(name, required(name, arg)?)?),
            "click" => {
                let raw = required(name, arg)?;
                let mut parts = raw.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(line), Some(column), None) => Command::Click {
                        line: number(name, line)?,
                        column: number(name, column)?,
                    },
                    _ => return Err(invalid_argument(name, raw)),
                }
            }
            "select-start" => Command::SelectStart,
            "select" => Command::SelectTo(number(name, required(name, arg)?)?),
            "select-all" => Command::SelectAll,
            "select-clear" => Command::SelectClear,
            "keys" => Command::Keys(unescape(required(name, arg)?)),
            "mode" => Command::Mode,
            "status" => Command::Status,
            "print" => Command::Print,
            other => match direction(other, other) {
                Ok(action) => Command::Move(action),
                Err(_) => {
                    return Err(InputError::InvalidCommand {
                        line: trimmed.to_string(),
                    })
                }
            },
        };

        Ok(Some(command))
    }
}

/// コマンドをセッションに適用する
///
/// `keys` コマンドのためにモーダル入力の状態を保持する。
#[derive(Debug, Clone, Default)]
pub struct CommandProcessor {
    modal: ModalInput,
}

impl CommandProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の入力モード
    pub fn mode(&self) -> EditMode {
        self.modal.mode()
    }

    /// コマンドを実行
    ///
    /// 履歴が空の取り消し／やり直しは no-op として扱う。
    pub fn execute(&mut self, session: &mut EditorSession, command: &Command) -> Result<CommandResult> {
        let result = match command {
            Command::Type(text) => {
                // 適用前に全文字を検証する
                if let Some(ch) = text.chars().find(|ch| !is_valid_input_char(*ch)) {
                    return Err(EditError::InvalidChar(ch).into());
                }
                let mut applied = false;
                for ch in text.chars() {
                    applied |= session.type_char(ch)?;
                }
                CommandResult::from_applied(applied)
            }
            Command::Paste(text) => CommandResult::from_applied(session.paste(text)?),
            Command::Newline => CommandResult::from_applied(session.insert_newline()?),
            Command::Backspace => CommandResult::from_applied(session.backspace()?),
            Command::Delete => CommandResult::from_applied(session.forward_delete()?),
            Command::DeleteSelection => CommandResult::from_applied(session.delete_selection()?),
            Command::Cut => match session.cut()? {
                Some(text) => CommandResult::with_output(text),
                None => CommandResult::noop(),
            },
            Command::Copy => match session.selected_text() {
                Some(text) => CommandResult::with_output(text),
                None => CommandResult::noop(),
            },
            Command::Undo => history_result(session.undo())?,
            Command::Redo => history_result(session.redo())?,
            Command::Move(action) => CommandResult::from_applied(session.navigate(*action, false)),
            Command::Extend(action) => CommandResult::from_applied(session.navigate(*action, true)),
            Command::Goto(offset) => {
                session.set_cursor(*offset)?;
                CommandResult::success()
            }
            Command::Click { line, column } => {
                let offset = session.offset_at(*line, *column);
                session.set_cursor(offset)?;
                CommandResult::success()
            }
            Command::SelectStart => {
                session.start_selection();
                CommandResult::success()
            }
            Command::SelectTo(offset) => {
                session.extend_selection(*offset)?;
                CommandResult::success()
            }
            Command::SelectAll => {
                session.select_all();
                CommandResult::success()
            }
            Command::SelectClear => {
                session.clear_selection();
                CommandResult::success()
            }
            Command::Keys(keys) => CommandResult::from_applied(self.modal.process_keys(session, keys)?),
            Command::Mode => CommandResult::with_output(self.modal.mode().to_string()),
            Command::Status => CommandResult::with_output(status_line(session)),
            Command::Print => CommandResult::with_output(session.current_text()),
        };

        Ok(result)
    }

}

fn history_result(result: std::result::Result<(), EditError>) -> Result<CommandResult> {
    match result {
        Ok(()) => Ok(CommandResult::success()),
        Err(EditError::EmptyHistory) => Ok(CommandResult::noop()),
        Err(err) => Err(err.into()),
    }
}

/// ステータスバー相当の1行表示
pub fn status_line(session: &EditorSession) -> String {
    let (line, column) = session.cursor_line_and_column();
    let selection = match session.selection_range() {
        Some((start, end)) => format!(" sel {}-{}", start, end),
        None => String::new(),
    };
    let modified = if session.is_modified() { " [+]" } else { "" };
    format!(
        "Ln {}, Col {} ({} chars){}{}",
        line,
        column,
        session.len(),
        selection,
        modified
    )
}

fn required<'a>(command: &str, arg: Option<&'a str>) -> std::result::Result<&'a str, InputError> {
    match arg {
        Some(arg) if !arg.is_empty() => Ok(arg),
        _ => Err(invalid_argument(command, "")),
    }
}

fn number(command: &str, raw: &str) -> std::result::Result<usize, InputError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid_argument(command, raw))
}

fn direction(command: &str, raw: &str) -> std::result::Result<NavigationAction, InputError> {
    let action = match raw {
        "left" => NavigationAction::MoveCharBackward,
        "right" => NavigationAction::MoveCharForward,
        "up" => NavigationAction::MoveLineUp,
        "down" => NavigationAction::MoveLineDown,
        "home" => NavigationAction::MoveLineStart,
        "end" => NavigationAction::MoveLineEnd,
        "top" => NavigationAction::MoveBufferStart,
        "bottom" => NavigationAction::MoveBufferEnd,
        _ => return Err(invalid_argument(command, raw)),
    };
    Ok(action)
}

fn invalid_argument(command: &str, arg: &str) -> InputError {
    InputError::InvalidArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    }
}

/// `\n` `\t` `\e` `\\` のエスケープを展開
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('e') => out.push(ESCAPE),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
