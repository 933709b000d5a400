//! # RecipientRepository
//!
//! 通知の受信者アドレスを検索するリポジトリ。
//!
//! 指定ロールを持つ有効なユーザーのうち、連絡先がスコープ内の組織に
//! 関連付けられているユーザーの連絡先アドレスを返す。
//!
//! ## 設計方針
//!
//! - **生の結果を返す**: 重複排除と失敗時の空集合へのフォールバックは
//!   ユースケース層（受信者リゾルバ）の責務
//! - **スコープごとの条件**: 組織 / レポートテンプレート / テナントの 3 種で
//!   組織の絞り込み条件だけを差し替える

use async_trait::async_trait;
use remindflow_domain::recipient::RecipientScope;
use sqlx::PgPool;

use crate::error::InfraError;

/// 受信者リポジトリトレイト
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// ロールとスコープに該当する連絡先アドレスを取得
    ///
    /// 重複を含む可能性がある。順序は連絡先 ID 順。
    async fn find_emails(
        &self,
        role: &str,
        scope: &RecipientScope,
    ) -> Result<Vec<String>, InfraError>;
}

/// PostgreSQL 実装の RecipientRepository
#[derive(Debug, Clone)]
pub struct PostgresRecipientRepository {
    pool: PgPool,
}

impl PostgresRecipientRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 受信者検索 SQL を組み立てる
///
/// `$1` はロール表示名、`$2` はスコープの値。
/// `organization_filter` は `coa.organization_id` に対する条件式。
fn recipient_query(organization_filter: &str) -> String {
    format!(
        r#"
        SELECT c.primary_email
        FROM contacts c
        WHERE c.primary_email IS NOT NULL
          AND c.app_user_id IN (
              SELECT ur.user_id
              FROM security_user_roles ur
              INNER JOIN security_roles r ON r.id = ur.role_id
              INNER JOIN security_users u ON u.id = ur.user_id
              WHERE r.display_text = $1
                AND u.active
                AND u.id IN (
                    SELECT c2.app_user_id
                    FROM contacts c2
                    INNER JOIN contact_organization_associations coa
                        ON coa.contact_id = c2.id
                    WHERE c2.app_user_id IS NOT NULL
                      AND {organization_filter}
                )
          )
        ORDER BY c.id
        "#
    )
}

const ORGANIZATION_FILTER: &str = "coa.organization_id = $2";

const REPORT_TEMPLATE_FILTER: &str = r#"coa.organization_id IN (
                          SELECT rto.organization_id
                          FROM reporting_profile_template_organizations rto
                          WHERE rto.reporting_profile_template_id = $2
                            AND rto.active
                      )"#;

const TENANT_FILTER: &str = r#"coa.organization_id IN (
                          SELECT o.id
                          FROM organizations o
                          INNER JOIN clients cl ON cl.id = o.client_id
                          WHERE cl.code = $2
                      )"#;

#[async_trait]
impl RecipientRepository for PostgresRecipientRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%role, ?scope))]
    async fn find_emails(
        &self,
        role: &str,
        scope: &RecipientScope,
    ) -> Result<Vec<String>, InfraError> {
        let emails = match scope {
            RecipientScope::Organization(id) => {
                sqlx::query_scalar::<_, String>(&recipient_query(ORGANIZATION_FILTER))
                    .bind(role)
                    .bind(id.as_i32())
                    .fetch_all(&self.pool)
                    .await?
            }
            RecipientScope::ReportTemplate(id) => {
                sqlx::query_scalar::<_, String>(&recipient_query(REPORT_TEMPLATE_FILTER))
                    .bind(role)
                    .bind(id.as_i32())
                    .fetch_all(&self.pool)
                    .await?
            }
            RecipientScope::Tenant(code) => {
                sqlx::query_scalar::<_, String>(&recipient_query(TENANT_FILTER))
                    .bind(role)
                    .bind(code.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresRecipientRepository>();
    }

    #[test]
    fn test_受信者クエリはスコープ条件を埋め込む() {
        let sql = recipient_query(ORGANIZATION_FILTER);
        assert!(sql.contains("coa.organization_id = $2"));
        assert!(sql.contains("r.display_text = $1"));
        assert!(sql.contains("u.active"));
    }
}
