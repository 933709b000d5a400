//! # EmailTemplateRepository
//!
//! 通知種別 → メールテンプレートの対応（`email_notification_types` →
//! `email_templates`）をテナント単位で解決するリポジトリ。

use async_trait::async_trait;
use remindflow_domain::{notification::EmailTemplate, tenant::TenantCode};
use sqlx::PgPool;

use crate::error::InfraError;

#[derive(sqlx::FromRow)]
struct EmailTemplateRow {
    subject:  String,
    template: String,
}

/// メールテンプレートリポジトリトレイト
#[async_trait]
pub trait EmailTemplateRepository: Send + Sync {
    /// 有効な通知種別に紐づくテンプレートを取得
    async fn find_by_notification_type(
        &self,
        tenant: &TenantCode,
        notification_type: &str,
    ) -> Result<Option<EmailTemplate>, InfraError>;
}

/// PostgreSQL 実装の EmailTemplateRepository
#[derive(Debug, Clone)]
pub struct PostgresEmailTemplateRepository {
    pool: PgPool,
}

impl PostgresEmailTemplateRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailTemplateRepository for PostgresEmailTemplateRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%tenant, %notification_type))]
    async fn find_by_notification_type(
        &self,
        tenant: &TenantCode,
        notification_type: &str,
    ) -> Result<Option<EmailTemplate>, InfraError> {
        let row: Option<EmailTemplateRow> = sqlx::query_as(
            r#"
            SELECT t.subject, t.template
            FROM email_templates t
            INNER JOIN email_notification_types n ON n.id = t.email_type_id
            WHERE n.client_code = $1
              AND n.notification_type = $2
              AND n.active
            ORDER BY t.id
            LIMIT 1
            "#,
        )
        .bind(tenant.as_str())
        .bind(notification_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| EmailTemplate {
            subject: r.subject,
            body:    r.template,
        }))
    }
}
