//! 入力処理モジュール
//!
//! 行指向コマンドの解釈と実行、モーダルキー入力を提供

pub mod commands;
pub mod modal;

// 公開API
pub use commands::{status_line, Command, CommandProcessor, CommandResult};
pub use modal::{EditMode, KeyOutcome, ModalInput};
