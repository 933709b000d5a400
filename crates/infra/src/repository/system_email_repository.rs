//! # SystemEmailRepository
//!
//! 送信試行ごとの監査レコード（`system_emails`）を保存するリポジトリ。
//!
//! ## 設計方針
//!
//! - **1 試行 1 行**: 送信の成否に関わらず 1 回の送信試行につき 1 行を挿入する
//! - **トリガー停止**: `system_emails` の挿入トリガーは外部配信キューへ転送するため、
//!   ジョブ自身が送信済みの記録では [`with_trigger_suspended`] で一時停止する
//! - **トランザクション**: トリガーの停止・挿入・再開は呼び出し元のトランザクション内で行う。
//!   ロールバックや中断ではトリガーの停止も取り消される
//!
//! [`with_trigger_suspended`]: crate::db::with_trigger_suspended

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use remindflow_domain::tenant::TenantCode;

use crate::{
    db::{PgTableTrigger, TxContext, with_trigger_suspended},
    error::InfraError,
};

/// 挿入トリガーを持つテーブル名
pub const SYSTEM_EMAILS_TABLE: &str = "system_emails";

/// `system_emails` の挿入トリガー名
pub const SYSTEM_EMAILS_INSERT_TRIGGER: &str = "system_emails_insert";

/// 送信監査レコード（リポジトリ INSERT 用データ型）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEmail {
    pub recipient:   String,
    pub subject:     String,
    pub body:        String,
    pub sent:        bool,
    pub tenant_code: TenantCode,
    pub active:      bool,
    pub created_at:  DateTime<Utc>,
}

/// 送信監査リポジトリトレイト
#[async_trait]
pub trait SystemEmailRepository: Send + Sync {
    /// 監査レコードを 1 行挿入する
    ///
    /// 挿入トリガーは同じトランザクション内で停止・再開される。
    /// コミットまたはロールバックは呼び出し元が行う。
    async fn insert(&self, tx: &mut TxContext, email: &SystemEmail) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の SystemEmailRepository
#[derive(Debug, Clone)]
pub struct PostgresSystemEmailRepository {
    trigger: PgTableTrigger,
}

impl PostgresSystemEmailRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new() -> Self {
        Self {
            trigger: PgTableTrigger::new(SYSTEM_EMAILS_TABLE, SYSTEM_EMAILS_INSERT_TRIGGER),
        }
    }
}

impl Default for PostgresSystemEmailRepository {
    fn default() -> Self {
        Self::new()
    }
}

async fn insert_row(tx: &mut TxContext, email: &SystemEmail) -> Result<(), InfraError> {
    sqlx::query(
        r#"
        INSERT INTO system_emails (
            recipient, subject, body, sent, tenant_code, active, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&email.recipient)
    .bind(&email.subject)
    .bind(&email.body)
    .bind(email.sent)
    .bind(email.tenant_code.as_str())
    .bind(email.active)
    .bind(email.created_at)
    .execute(tx.conn())
    .await?;
    Ok(())
}

#[async_trait]
impl SystemEmailRepository for PostgresSystemEmailRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(tenant = %email.tenant_code, sent = email.sent))]
    async fn insert(&self, tx: &mut TxContext, email: &SystemEmail) -> Result<(), InfraError> {
        let email = email.clone();
        with_trigger_suspended(&self.trigger, tx, move |tx| {
            Box::pin(async move { insert_row(tx, &email).await })
        })
        .await
    }
}
