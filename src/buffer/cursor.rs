//! カーソル位置管理
//!
//! 絶対オフセットと行・列の相互変換、およびカーソル移動を提供する。
//! 行インデックスのキャッシュは持たず、すべて走査距離に比例するコストで計算する。

use crate::buffer::gap_buffer::GapBuffer;
use crate::error::{edit::Result, EditError};
use unicode_width::UnicodeWidthChar;

/// カーソル操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationAction {
    /// 文字単位の移動
    MoveCharForward,
    MoveCharBackward,
    /// 行単位の移動
    MoveLineUp,
    MoveLineDown,
    /// 行内の移動
    MoveLineStart,
    MoveLineEnd,
    /// バッファ全体の移動
    MoveBufferStart,
    MoveBufferEnd,
}

/// 指定オフセットを含む行の先頭オフセット
pub fn line_start(buffer: &GapBuffer, offset: usize) -> usize {
    let mut pos = offset.min(buffer.len());
    while pos > 0 && !is_newline(buffer, pos - 1) {
        pos -= 1;
    }
    pos
}

/// 指定オフセットを含む行の末尾オフセット（改行文字の位置、またはバッファ末尾）
pub fn line_end(buffer: &GapBuffer, offset: usize) -> usize {
    let len = buffer.len();
    let mut pos = offset.min(len);
    while pos < len && !is_newline(buffer, pos) {
        pos += 1;
    }
    pos
}

/// オフセットを1始まりの（行, 列）に変換（ステータスバー表示用）
pub fn line_and_column_of(buffer: &GapBuffer, offset: usize) -> Result<(usize, usize)> {
    if offset > buffer.len() {
        return Err(EditError::out_of_range(offset, buffer.len()));
    }

    let newlines = (0..offset).filter(|&pos| is_newline(buffer, pos)).count();
    let column = offset - line_start(buffer, offset);
    Ok((newlines + 1, column + 1))
}

/// オフセットの表示列（0始まり、全角文字は2列）
pub fn visual_column_of(buffer: &GapBuffer, offset: usize) -> Result<usize> {
    if offset > buffer.len() {
        return Err(EditError::out_of_range(offset, buffer.len()));
    }

    let start = line_start(buffer, offset);
    Ok((start..offset)
        .filter_map(|pos| buffer.char_at(pos).ok())
        .map(char_width)
        .sum())
}

/// 表示上の（行, 列）をオフセットに変換する（いずれも0始まり）
///
/// ポインタ入力の解決に使う。行が範囲外ならバッファ末尾、
/// 列が行長を超える場合は行末に丸める。
pub fn xy_to_offset(buffer: &GapBuffer, line: usize, column: usize) -> usize {
    let len = buffer.len();
    let mut pos = 0;
    let mut current_line = 0;

    while current_line < line && pos < len {
        if is_newline(buffer, pos) {
            current_line += 1;
        }
        pos += 1;
    }

    let mut current_column = 0;
    while current_column < column && pos < len && !is_newline(buffer, pos) {
        if let Ok(ch) = buffer.char_at(pos) {
            current_column += char_width(ch);
        }
        pos += 1;
    }

    pos
}

/// カーソル移動ユーティリティ
pub struct CursorMover;

impl CursorMover {
    /// テキスト内容を考慮してカーソル位置を更新
    ///
    /// 移動しなかった場合（境界での操作）は `false` を返す。
    pub fn move_cursor(buffer: &GapBuffer, cursor: &mut usize, action: NavigationAction) -> bool {
        let current = (*cursor).min(buffer.len());
        let target = match action {
            NavigationAction::MoveCharForward => Self::move_right(buffer, current),
            NavigationAction::MoveCharBackward => Self::move_left(current),
            NavigationAction::MoveLineUp => Self::move_up(buffer, current),
            NavigationAction::MoveLineDown => Self::move_down(buffer, current),
            NavigationAction::MoveLineStart => line_start(buffer, current),
            NavigationAction::MoveLineEnd => line_end(buffer, current),
            NavigationAction::MoveBufferStart => 0,
            NavigationAction::MoveBufferEnd => buffer.len(),
        };

        let moved = target != *cursor;
        *cursor = target;
        moved
    }

    fn move_left(offset: usize) -> usize {
        offset.saturating_sub(1)
    }

    fn move_right(buffer: &GapBuffer, offset: usize) -> usize {
        (offset + 1).min(buffer.len())
    }

    /// 前の行へ。前の行が短い場合は行末に着地し、元の列は記憶しない
    fn move_up(buffer: &GapBuffer, offset: usize) -> usize {
        let start = line_start(buffer, offset);
        if start == 0 {
            return offset;
        }

        let column = offset - start;
        let prev_end = start - 1;
        let prev_start = line_start(buffer, prev_end);
        let prev_len = prev_end - prev_start;

        if column > prev_len {
            prev_end
        } else {
            prev_start + column
        }
    }

    /// 次の行へ。次の行が短い場合は行末に着地する
    fn move_down(buffer: &GapBuffer, offset: usize) -> usize {
        let len = buffer.len();
        if offset >= len {
            return offset;
        }

        let column = offset - line_start(buffer, offset);
        let end = line_end(buffer, offset);
        if end >= len {
            return offset;
        }

        let next_start = end + 1;
        let next_end = line_end(buffer, next_start);
        let next_len = next_end - next_start;

        if column > next_len {
            next_end
        } else {
            next_start + column
        }
    }
}

fn is_newline(buffer: &GapBuffer, offset: usize) -> bool {
    matches!(buffer.char_at(offset), Ok('\n'))
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(text: &str, start: usize, action: NavigationAction) -> (bool, usize) {
        let buffer = GapBuffer::from_str(text);
        let mut cursor = start;
        let moved = CursorMover::move_cursor(&buffer, &mut cursor, action);
        (moved, cursor)
    }

    #[test]
    fn test_line_boundaries() {
        let buffer = GapBuffer::from_str("ab\ncde\n\nf");
        assert_eq!(line_start(&buffer, 4), 3);
        assert_eq!(line_end(&buffer, 4), 6);
        assert_eq!(line_start(&buffer, 7), 7);
        assert_eq!(line_end(&buffer, 7), 7);
        assert_eq!(line_start(&buffer, 2), 0);
        assert_eq!(line_end(&buffer, 8), 9);
    }

    #[test]
    fn test_vertical_round_trip() {
        assert_eq!(
            moved("hello\nworld", 2, NavigationAction::MoveLineDown),
            (true, 8)
        );
        assert_eq!(
            moved("hello\nworld", 8, NavigationAction::MoveLineUp),
            (true, 2)
        );
    }

    #[test]
    fn test_vertical_clamps_to_shorter_line() {
        let text = "long line\nab\nanother line";
        // 列7から短い行へ：行末に着地
        assert_eq!(moved(text, 7, NavigationAction::MoveLineDown), (true, 12));
        // 列は記憶しないため、次の下移動は列2を使う
        assert_eq!(moved(text, 12, NavigationAction::MoveLineDown), (true, 15));
        assert_eq!(moved(text, 20, NavigationAction::MoveLineUp), (true, 12));
    }

    #[test]
    fn test_vertical_boundaries_are_noops() {
        assert_eq!(moved("hello\nworld", 3, NavigationAction::MoveLineUp), (false, 3));
        assert_eq!(moved("hello\nworld", 9, NavigationAction::MoveLineDown), (false, 9));
        assert_eq!(moved("hello\n", 6, NavigationAction::MoveLineDown), (false, 6));
        assert_eq!(moved("", 0, NavigationAction::MoveLineDown), (false, 0));
    }

    #[test]
    fn test_horizontal_clamps() {
        assert_eq!(moved("ab", 0, NavigationAction::MoveCharBackward), (false, 0));
        assert_eq!(moved("ab", 2, NavigationAction::MoveCharForward), (false, 2));
        assert_eq!(moved("a\nb", 1, NavigationAction::MoveCharForward), (true, 2));
    }

    #[test]
    fn test_line_and_buffer_jumps() {
        let text = "first\nsecond";
        assert_eq!(moved(text, 8, NavigationAction::MoveLineStart), (true, 6));
        assert_eq!(moved(text, 8, NavigationAction::MoveLineEnd), (true, 12));
        assert_eq!(moved(text, 8, NavigationAction::MoveBufferStart), (true, 0));
        assert_eq!(moved(text, 0, NavigationAction::MoveBufferEnd), (true, 12));
    }

    #[test]
    fn test_line_and_column_of() {
        let buffer = GapBuffer::from_str("hello\nworld");
        assert_eq!(line_and_column_of(&buffer, 0).unwrap(), (1, 1));
        assert_eq!(line_and_column_of(&buffer, 5).unwrap(), (1, 6));
        assert_eq!(line_and_column_of(&buffer, 6).unwrap(), (2, 1));
        assert_eq!(line_and_column_of(&buffer, 11).unwrap(), (2, 6));
        assert!(line_and_column_of(&buffer, 12).is_err());
    }

    #[test]
    fn test_xy_to_offset() {
        let buffer = GapBuffer::from_str("hello\nwor\nx");
        assert_eq!(xy_to_offset(&buffer, 0, 3), 3);
        assert_eq!(xy_to_offset(&buffer, 1, 2), 8);
        assert_eq!(xy_to_offset(&buffer, 1, 40), 9);
        assert_eq!(xy_to_offset(&buffer, 9, 0), 11);
    }

    #[test]
    fn test_wide_characters_take_two_columns() {
        let buffer = GapBuffer::from_str("日本語abc");
        assert_eq!(xy_to_offset(&buffer, 0, 4), 2);
        assert_eq!(xy_to_offset(&buffer, 0, 7), 4);
        assert_eq!(visual_column_of(&buffer, 3).unwrap(), 6);
    }
}
