//! # ユースケース層
//!
//! 通知ジョブのビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと送信実装を `Arc<dyn Trait>` で外部から注入
//! - **薄いエントリーポイント**: `main` は設定と配線のみを行い、ロジックはユースケースに集約

pub mod notification;

pub use notification::{DispatchSummary, NotificationDispatcher, Trigger};
