//! 選択範囲の管理
//!
//! アンカーとアクティブ端の2点で範囲を表現する。どちらが前でもよく、
//! 利用時に `[min, max)` へ正規化する。

/// 選択範囲
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    anchor: Option<usize>,
    active: Option<usize>,
    selecting: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 選択を開始（既に選択中ならアンカーを維持）
    pub fn start(&mut self, cursor: usize) {
        if !self.selecting {
            self.anchor = Some(cursor);
            self.active = Some(cursor);
            self.selecting = true;
        }
    }

    /// アクティブ端を更新
    pub fn extend_to(&mut self, offset: usize) {
        if self.anchor.is_none() {
            self.anchor = Some(offset);
        }
        self.active = Some(offset);
    }

    /// ドラッグなどの範囲拡張を終了する（範囲は保持）
    pub fn finish(&mut self) {
        self.selecting = false;
    }

    /// 選択を解除
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// 範囲拡張中かどうか
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// 正規化された範囲。空の場合は `None`
    pub fn normalized(&self) -> Option<(usize, usize)> {
        match (self.anchor, self.active) {
            (Some(anchor), Some(active)) if anchor != active => {
                Some((anchor.min(active), anchor.max(active)))
            }
            _ => None,
        }
    }

    /// 空でない選択があるか
    pub fn has_selection(&self) -> bool {
        self.normalized().is_some()
    }
}
