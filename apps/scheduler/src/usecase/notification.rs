//! # 通知ユースケース
//!
//! 満了契約・レポートリマインダーのメール通知を、受信者解決から完了通知まで統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - `[name]` プレースホルダーのリテラル置換
//! - [`recipient_resolver`] - ロールとスコープによる受信者解決
//! - [`email_settings`] - テナントの SMTP 設定と宛先ルーティング
//! - [`audit_recorder`] - 送信試行の監査記録
//! - [`status_line`] - 完了ステータス行
//! - [`dispatcher`] - 上記を束ねてトリガーを実行する

pub mod audit_recorder;
pub mod dispatcher;
pub mod email_settings;
pub mod recipient_resolver;
pub mod status_line;
pub mod template_renderer;

pub use audit_recorder::{AuditRecorder, SendAttempt};
pub use dispatcher::{
    DeliveryOutcome,
    DispatchSummary,
    DispatcherDeps,
    DispatcherSettings,
    NotificationDispatcher,
    Trigger,
};
pub use email_settings::{EmailSettingsResolver, ResolvedEmailSettings};
pub use recipient_resolver::RecipientResolver;
pub use status_line::{CompletionStatus, StatusLine};
pub use template_renderer::{RenderedEmail, TemplateRenderer};
