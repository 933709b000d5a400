//! # TenantRepository
//!
//! テナント（クライアント）情報とテナント設定の取得を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: クライアントの作成・更新はこのジョブのスコープ外
//! - **有効なもののみ**: 無効化されたクライアントは見つからない扱いにする

use async_trait::async_trait;
use remindflow_domain::tenant::{Client, ClientId, TenantCode};
use sqlx::PgPool;

use crate::error::InfraError;

/// テナントリポジトリトレイト
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// ID で有効なクライアントを検索
    async fn find_active_client(&self, id: ClientId) -> Result<Option<Client>, InfraError>;

    /// テナントのサポート窓口アドレス（送信元 From に使う）を取得
    async fn find_support_email(&self, tenant: &TenantCode)
    -> Result<Option<String>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct ClientRow {
    id:   i32,
    code: String,
}

/// PostgreSQL 実装の TenantRepository
#[derive(Debug, Clone)]
pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_active_client(&self, id: ClientId) -> Result<Option<Client>, InfraError> {
        let row: Option<ClientRow> = sqlx::query_as(
            r#"
            SELECT id, code
            FROM clients
            WHERE id = $1 AND active
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Client {
            id:   ClientId::new(row.id),
            code: TenantCode::new(row.code)?,
        }))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%tenant))]
    async fn find_support_email(
        &self,
        tenant: &TenantCode,
    ) -> Result<Option<String>, InfraError> {
        let email: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT support_email
            FROM client_settings
            WHERE client_code = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(email
            .flatten()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()))
    }
}
