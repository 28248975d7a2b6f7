//! tsuzuri - gap-buffer text engine for interactive editors
//!
//! 編集コア（ギャップバッファ・カーソル・編集履歴）と、その周辺の設定・ログ・ファイルI/O

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;
pub mod file;

// 編集層
pub mod editor;

// 入力層
pub mod input;

// 公開API
pub use buffer::{GapBuffer, NavigationAction};
pub use config::EditorConfig;
pub use editor::{EditAction, EditOperations, EditorSession};
pub use error::{EditError, Result, TsuzuriError};
