//! # RemindFlow インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ユースケース層が依存するトレイト（リポジトリ・メール送信・完了通知）と、
//! その PostgreSQL / SMTP による具体的な実装を提供する。外部システムの詳細を
//! カプセル化し、ユースケース層をインフラの変更から保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール、トランザクション、トリガー制御
//! - **リポジトリ実装**: 契約・リマインダー・受信者・メール設定・送信監査
//! - **メール送信**: テナントの SMTP サーバーへの送信
//! - **完了通知**: ジョブ結果のステータス行の転送
//!
//! ## 依存関係
//!
//! ```text
//! scheduler → infra → domain
//!               ↘
//!                shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信と完了通知
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use remindflow_infra::{db, repository::PostgresContractRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/remindflow", Duration::from_secs(30)).await?;
//!     let contracts = PostgresContractRepository::new(pool.clone());
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::InfraError;
