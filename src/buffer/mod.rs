//! バッファ管理モジュール
//!
//! テキストデータの格納（ギャップバッファ）、カーソル位置計算、選択範囲を提供

pub mod cursor;
pub mod gap_buffer;
pub mod selection;

// 公開API
pub use cursor::{
    line_and_column_of, line_end, line_start, visual_column_of, xy_to_offset, CursorMover,
    NavigationAction,
};
pub use gap_buffer::{GapBuffer, DEFAULT_CAPACITY};
pub use selection::Selection;
