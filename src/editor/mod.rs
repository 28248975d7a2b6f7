//! エディタモジュール
//!
//! 編集履歴とエディタセッションの統合モジュール

pub mod clock;
pub mod history;
pub mod session;

// 公開API
pub use clock::{Clock, ManualClock, SystemClock};
pub use history::{EditAction, EditLog, HistoryEntry, HistoryStack, DEFAULT_MERGE_WINDOW};
pub use session::{EditOperations, EditorSession};

pub use crate::error::{edit::Result, EditError};
