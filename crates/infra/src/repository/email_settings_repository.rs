//! # EmailSettingsRepository
//!
//! テナントごとの SMTP 設定（`email_settings`）を取得するリポジトリ。
//!
//! 送信者アドレスの既定値の補完や本番・テスト振り分けはユースケース層が行う。
//! このリポジトリは DB の値をそのまま返す。

use async_trait::async_trait;
use remindflow_domain::tenant::TenantCode;
use sqlx::PgPool;

use crate::error::InfraError;

/// `email_settings` の有効な 1 行
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmailSettingsRecord {
    pub smtp_server:  String,
    pub port:         i32,
    pub sender:       Option<String>,
    pub password:     String,
    pub user_name:    Option<String>,
    pub is_live:      bool,
    pub test_address: Option<String>,
}

/// メール設定リポジトリトレイト
#[async_trait]
pub trait EmailSettingsRepository: Send + Sync {
    /// テナントの有効なメール設定を取得
    async fn find_active(
        &self,
        tenant: &TenantCode,
    ) -> Result<Option<EmailSettingsRecord>, InfraError>;
}

/// PostgreSQL 実装の EmailSettingsRepository
#[derive(Debug, Clone)]
pub struct PostgresEmailSettingsRepository {
    pool: PgPool,
}

impl PostgresEmailSettingsRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailSettingsRepository for PostgresEmailSettingsRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%tenant))]
    async fn find_active(
        &self,
        tenant: &TenantCode,
    ) -> Result<Option<EmailSettingsRecord>, InfraError> {
        let record = sqlx::query_as(
            r#"
            SELECT smtp_server, port, sender, password, user_name, is_live, test_address
            FROM email_settings
            WHERE tenant_code = $1 AND active
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresEmailSettingsRepository>();
    }
}
