//! # ReportRepository
//!
//! レポートリマインダーとレポートテンプレートの取得を担当するリポジトリ。

use async_trait::async_trait;
use remindflow_domain::{
    report::{ReminderId, ReportReminder, ReportTemplate, ReportTemplateId, WhenToSend},
    tenant::ClientId,
};
use sqlx::PgPool;

use crate::error::InfraError;

/// レポートリポジトリトレイト
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// 有効なリマインダーを取得
    async fn find_active_reminder(
        &self,
        id: ReminderId,
    ) -> Result<Option<ReportReminder>, InfraError>;

    /// テンプレートに属する有効なリマインダーを ID 順に取得
    async fn find_active_reminders_by_template(
        &self,
        template_id: ReportTemplateId,
    ) -> Result<Vec<ReportReminder>, InfraError>;

    /// 有効なレポートテンプレートを取得
    async fn find_active_template(
        &self,
        id: ReportTemplateId,
    ) -> Result<Option<ReportTemplate>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct ReminderRow {
    id:                      i32,
    report_template_id:      i32,
    number_of_days:          i32,
    when_to_send:            String,
    months:                  Option<String>,
    email_notification_type: String,
}

impl From<ReminderRow> for ReportReminder {
    fn from(row: ReminderRow) -> Self {
        Self {
            id:                 ReminderId::new(row.id),
            report_template_id: ReportTemplateId::new(row.report_template_id),
            number_of_days:     row.number_of_days,
            when_to_send:       WhenToSend::from_code(&row.when_to_send),
            months:             row.months,
            notification_type:  row.email_notification_type,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id:           i32,
    display_name: String,
    client_id:    i32,
    status:       Option<String>,
}

/// PostgreSQL 実装の ReportRepository
#[derive(Debug, Clone)]
pub struct PostgresReportRepository {
    pool: PgPool,
}

impl PostgresReportRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const REMINDER_COLUMNS: &str = r#"
    id, report_template_id, number_of_days, when_to_send, months, email_notification_type
"#;

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_active_reminder(
        &self,
        id: ReminderId,
    ) -> Result<Option<ReportReminder>, InfraError> {
        let sql = format!(
            "SELECT {REMINDER_COLUMNS} FROM report_reminders WHERE id = $1 AND active"
        );
        let row: Option<ReminderRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ReportReminder::from))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%template_id))]
    async fn find_active_reminders_by_template(
        &self,
        template_id: ReportTemplateId,
    ) -> Result<Vec<ReportReminder>, InfraError> {
        let sql = format!(
            "SELECT {REMINDER_COLUMNS} FROM report_reminders \
             WHERE report_template_id = $1 AND active ORDER BY id"
        );
        let rows: Vec<ReminderRow> = sqlx::query_as(&sql)
            .bind(template_id.as_i32())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReportReminder::from).collect())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_active_template(
        &self,
        id: ReportTemplateId,
    ) -> Result<Option<ReportTemplate>, InfraError> {
        let row: Option<TemplateRow> = sqlx::query_as(
            r#"
            SELECT id, display_name, client_id, status
            FROM reporting_profile_templates
            WHERE id = $1 AND active
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ReportTemplate {
            id:           ReportTemplateId::new(r.id),
            display_name: r.display_name,
            client_id:    ClientId::new(r.client_id),
            status:       r.status.unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresReportRepository>();
    }

    #[test]
    fn test_送信タイミングのコードを変換する() {
        let row = ReminderRow {
            id:                      3,
            report_template_id:      9,
            number_of_days:          14,
            when_to_send:            "2".to_string(),
            months:                  Some("January,July".to_string()),
            email_notification_type: "ReportReminder".to_string(),
        };

        let reminder = ReportReminder::from(row);

        assert_eq!(reminder.when_to_send, WhenToSend::After);
        assert_eq!(reminder.report_template_id, ReportTemplateId::new(9));
    }
}
