//! ギャップバッファ実装
//!
//! 効率的なテキスト編集のためのギャップバッファデータ構造。
//! オフセットはすべて文字単位（`char` インデックス）で扱う。

use crate::error::{edit::Result, EditError};

/// デフォルトの初期容量（文字数）
pub const DEFAULT_CAPACITY: usize = 1024;
const GAP_GROWTH_FACTOR: usize = 2;
const EMPTY_CELL: char = '\0';

/// ギャップバッファ構造体
///
/// 編集位置付近にギャップ（空き領域）を保持し、
/// 同じ位置での連続した挿入・削除を償却O(1)で行う。
/// ギャップの移動コストは移動距離に比例する。
#[derive(Debug, Clone)]
pub struct GapBuffer {
    /// 内部バッファ（ギャップを含む）
    buffer: Vec<char>,
    /// ギャップの開始位置
    gap_start: usize,
    /// ギャップの終了位置（排他的）
    gap_end: usize,
}

impl GapBuffer {
    /// 新しいギャップバッファを作成
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 指定容量で新しいギャップバッファを作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![EMPTY_CELL; capacity],
            gap_start: 0,
            gap_end: capacity,
        }
    }

    /// 文字列からギャップバッファを作成
    pub fn from_str(s: &str) -> Self {
        let mut buffer = Self::with_capacity(0);
        buffer.load_from(s);
        buffer
    }

    /// 内部バッファの総容量
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// 現在のギャップサイズを取得
    pub fn gap_size(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// 現在のギャップ位置（論理オフセット）
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// 有効な文字数を取得
    pub fn len(&self) -> usize {
        self.capacity() - self.gap_size()
    }

    /// 空かどうかを判定
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 指定位置の文字を取得
    pub fn char_at(&self, offset: usize) -> Result<char> {
        if offset >= self.len() {
            return Err(EditError::out_of_range(offset, self.len()));
        }
        Ok(self.buffer[self.physical_index(offset)])
    }

    /// 全テキストを文字列として取得
    pub fn text(&self) -> String {
        self.buffer[..self.gap_start]
            .iter()
            .chain(self.buffer[self.gap_end..].iter())
            .collect()
    }

    /// 指定範囲 `[start, end)` のテキストを取得
    pub fn slice(&self, start: usize, end: usize) -> Result<String> {
        if start > end {
            return Err(EditError::out_of_range(start, self.len()));
        }
        if end > self.len() {
            return Err(EditError::out_of_range(end, self.len()));
        }
        Ok((start..end)
            .map(|offset| self.buffer[self.physical_index(offset)])
            .collect())
    }

    /// 指定位置に文字列を挿入
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        if offset > self.len() {
            return Err(EditError::out_of_range(offset, self.len()));
        }

        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Ok(());
        }

        self.move_gap_to(offset);

        // ギャップサイズが不足している場合は拡張
        if self.gap_size() < chars.len() {
            self.grow(chars.len());
        }

        let end = self.gap_start + chars.len();
        self.buffer[self.gap_start..end].copy_from_slice(&chars);
        self.gap_start = end;

        Ok(())
    }

    /// 指定位置に1文字を挿入
    pub fn insert_char(&mut self, offset: usize, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.insert(offset, ch.encode_utf8(&mut buf))
    }

    /// 指定位置から `count` 文字を削除し、削除した文字列を返す
    pub fn delete(&mut self, offset: usize, count: usize) -> Result<String> {
        let end = offset
            .checked_add(count)
            .ok_or_else(|| EditError::out_of_range(offset, self.len()))?;
        if end > self.len() {
            return Err(EditError::out_of_range(end, self.len()));
        }
        if count == 0 {
            return Ok(String::new());
        }

        self.move_gap_to(offset);
        let new_gap_end = (self.gap_end + count).min(self.capacity());
        let removed: String = self.buffer[self.gap_end..new_gap_end].iter().collect();
        self.gap_end = new_gap_end;

        Ok(removed)
    }

    /// 内容を指定文字列で置き換える（ギャップは末尾）
    pub fn load_from(&mut self, text: &str) {
        self.load_with_capacity(text, DEFAULT_CAPACITY);
    }

    /// 最低容量を指定して内容を置き換える
    pub fn load_with_capacity(&mut self, text: &str, min_capacity: usize) {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let capacity = (len * GAP_GROWTH_FACTOR).max(min_capacity);

        let mut buffer = chars;
        buffer.resize(capacity, EMPTY_CELL);

        self.buffer = buffer;
        self.gap_start = len;
        self.gap_end = capacity;
    }

    /// 内容を空にする
    pub fn clear(&mut self) {
        self.gap_start = 0;
        self.gap_end = self.capacity();
    }

    fn physical_index(&self, offset: usize) -> usize {
        if offset < self.gap_start {
            offset
        } else {
            offset + self.gap_size()
        }
    }

    /// ギャップを指定位置に移動（移動距離分だけブロックコピー）
    fn move_gap_to(&mut self, offset: usize) {
        if offset == self.gap_start {
            return;
        }

        if offset < self.gap_start {
            // ギャップを左に移動：[offset, gap_start) を右へ
            let len = self.gap_start - offset;
            self.buffer
                .copy_within(offset..self.gap_start, self.gap_end - len);
            self.gap_start = offset;
            self.gap_end -= len;
        } else {
            // ギャップを右に移動：後半部の先頭を左へ
            let len = offset - self.gap_start;
            self.buffer
                .copy_within(self.gap_end..self.gap_end + len, self.gap_start);
            self.gap_start += len;
            self.gap_end += len;
        }
    }

    /// ギャップを拡張（容量は2倍か必要量の大きい方）
    fn grow(&mut self, needed: usize) {
        let old_capacity = self.capacity();
        let new_capacity = (old_capacity * GAP_GROWTH_FACTOR).max(old_capacity + needed);
        let tail_len = old_capacity - self.gap_end;
        let new_gap_end = new_capacity - tail_len;

        let mut new_buffer = vec![EMPTY_CELL; new_capacity];
        new_buffer[..self.gap_start].copy_from_slice(&self.buffer[..self.gap_start]);
        new_buffer[new_gap_end..].copy_from_slice(&self.buffer[self.gap_end..]);

        log::trace!(
            "gap buffer grew from {} to {} cells",
            old_capacity,
            new_capacity
        );

        self.buffer = new_buffer;
        self.gap_end = new_gap_end;
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}
