//! # RemindFlow ドメイン層
//!
//! 契約満了通知・レポートリマインダーのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: DB の行に対応する識別子付きオブジェクト（例: Contract, ReportReminder）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: TenantCode, RecipientSet）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! scheduler → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、SMTP）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`contract`] - 契約と関連エンティティ
//! - [`report`] - レポートテンプレートとリマインダー
//! - [`notification`] - 通知イベント、テンプレート、送信メール
//! - [`recipient`] - 受信者集合と抽出範囲
//! - [`email_settings`] - テナントの SMTP 設定と宛先ルーティング
//! - [`deployment`] - デプロイ環境とリンク用ドメイン
//! - [`tenant`] - テナント（クライアント）
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層エラー

#[macro_use]
mod macros;

pub mod clock;
pub mod contract;
pub mod deployment;
pub mod email_settings;
pub mod error;
pub mod notification;
pub mod recipient;
pub mod report;
pub mod tenant;

pub use error::DomainError;
