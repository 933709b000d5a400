//! # Clock（時刻プロバイダ）
//!
//! ユースケース層での `Utc::now()` 直接呼び出しを置き換え、
//! テストで固定時刻を注入可能にするための抽象化。
//!
//! 満了日の判定（「N 日後に満了する契約」）と完了通知のタイムスタンプは
//! 運用上のローカル時刻で扱うため、UTC オフセット付きの変換も提供する。

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 指定オフセットでの現在時刻
    fn now_in(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.now().with_timezone(&offset)
    }

    /// 指定オフセットでの今日の日付
    fn today_in(&self, offset: FixedOffset) -> NaiveDate {
        self.now_in(offset).date_naive()
    }
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
