//! 履歴の結合判定に使う時計
//!
//! 連続入力の判定は経過時間に依存するため、時計を差し替え可能にしておく。

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// 単調増加する時刻の供給元
pub trait Clock {
    /// 任意の基準点からの経過時間
    fn now(&self) -> Duration;
}

/// 実時間の時計
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// 手動で進める時計（テスト用）
///
/// クローンは同じ時刻を共有するため、セッションに渡した後も外から進められる。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 時刻を進める
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// ミリ秒単位で時刻を進める
    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.elapsed.get()
    }
}
