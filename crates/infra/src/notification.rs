//! # 通知送信
//!
//! メール送信と完了ステータスの通知を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（テナントの SMTP サーバー）、Noop（ローカル・テスト用）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **接続情報は送信ごと**: SMTP 接続先と認証情報はテナントごとに異なるため、
//!   送信のたびに [`SmtpProfile`] を受け取る

mod completion;
mod noop;
mod smtp;

use async_trait::async_trait;
pub use completion::{CompletionNotifier, LogCompletionNotifier};
pub use noop::NoopNotificationSender;
use remindflow_domain::{
    email_settings::SmtpProfile,
    notification::{EmailMessage, NotificationError},
};
pub use smtp::{SmtpNotificationSender, SmtpSecurity};

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// `profile` の SMTP サーバー経由でメールを送信する
    async fn send_email(
        &self,
        email: &EmailMessage,
        profile: &SmtpProfile,
    ) -> Result<(), NotificationError>;
}
