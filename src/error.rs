//! エラーハンドリングシステム
//!
//! tsuzuri 全体で使用される統一されたエラー型を定義

use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TsuzuriError {
    /// 編集操作エラー
    #[error("Edit operation failed: {0}")]
    Edit(#[from] EditError),

    /// ファイル操作エラー
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// コマンド入力エラー
    #[error("Input processing failed: {0}")]
    Input(#[from] InputError),
}

/// 編集操作エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// オフセットまたは範囲がバッファ境界を超えている
    #[error("offset {offset} is out of range (length {len})")]
    OutOfRange { offset: usize, len: usize },

    /// 取り消し／やり直しの履歴が空
    #[error("nothing to undo or redo")]
    EmptyHistory,

    /// 入力として受け付けない文字
    #[error("invalid character: {0:?}")]
    InvalidChar(char),
}

impl EditError {
    pub(crate) fn out_of_range(offset: usize, len: usize) -> Self {
        EditError::OutOfRange { offset, len }
    }
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// コマンド入力固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid command: {line}")]
    InvalidCommand { line: String },

    #[error("Invalid argument for {command}: {arg}")]
    InvalidArgument { command: String, arg: String },
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, TsuzuriError>;

/// 各モジュール固有のResult型
pub mod edit {
    pub type Result<T> = std::result::Result<T, super::EditError>;
}

pub mod file {
    pub type Result<T> = std::result::Result<T, super::FileError>;
}

// std::io::Error から FileError への変換
impl From<std::io::Error> for FileError {
    fn from(error: std::io::Error) -> Self {
        FileError::Io {
            message: error.to_string(),
        }
    }
}

impl From<std::io::Error> for TsuzuriError {
    fn from(error: std::io::Error) -> Self {
        TsuzuriError::File(error.into())
    }
}

// UTF-8エラーの変換
impl From<std::string::FromUtf8Error> for FileError {
    fn from(error: std::string::FromUtf8Error) -> Self {
        FileError::Encoding {
            message: format!("invalid UTF-8 at byte {}", error.utf8_error().valid_up_to()),
        }
    }
}
