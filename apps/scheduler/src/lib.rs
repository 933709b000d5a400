//! # Scheduler ライブラリ
//!
//! 通知ジョブの設定・エラー・ユースケースを公開する。
//! バイナリ（`main.rs`）はこのクレートを配線して実行する。

pub mod config;
pub mod error;
pub mod usecase;
