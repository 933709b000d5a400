//! # リポジトリ実装
//!
//! ジョブが読み書きするテーブルごとのリポジトリトレイトと PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **トレイト + 実装**: ユースケース層はトレイトにのみ依存する
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計（[`crate::mock`]）

pub mod contract_repository;
pub mod email_settings_repository;
pub mod email_template_repository;
pub mod recipient_repository;
pub mod report_repository;
pub mod system_email_repository;
pub mod tenant_repository;

pub use contract_repository::{ContractRepository, PostgresContractRepository};
pub use email_settings_repository::{
    EmailSettingsRecord,
    EmailSettingsRepository,
    PostgresEmailSettingsRepository,
};
pub use email_template_repository::{EmailTemplateRepository, PostgresEmailTemplateRepository};
pub use recipient_repository::{PostgresRecipientRepository, RecipientRepository};
pub use report_repository::{PostgresReportRepository, ReportRepository};
pub use system_email_repository::{
    PostgresSystemEmailRepository,
    SystemEmail,
    SystemEmailRepository,
};
pub use tenant_repository::{PostgresTenantRepository, TenantRepository};
