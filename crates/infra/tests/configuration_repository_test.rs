//! テナント設定系リポジトリの統合テスト
//!
//! TenantRepository / EmailSettingsRepository / EmailTemplateRepository / ReportRepository。
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://... cargo test -p remindflow-infra --test configuration_repository_test
//! ```

mod common;

use common::{TENANT_CODE, insert_client};
use pretty_assertions::assert_eq;
use remindflow_domain::{
    notification::notification_type,
    report::{ReminderId, ReportTemplateId, WhenToSend},
    tenant::{ClientId, TenantCode},
};
use remindflow_infra::repository::{
    EmailSettingsRepository,
    EmailTemplateRepository,
    PostgresEmailSettingsRepository,
    PostgresEmailTemplateRepository,
    PostgresReportRepository,
    PostgresTenantRepository,
    ReportRepository,
    TenantRepository,
};
use sqlx::PgPool;

fn tenant() -> TenantCode {
    TenantCode::new(TENANT_CODE).unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_クライアントとサポートアドレスを取得できる(pool: PgPool) {
    let client_id = insert_client(&pool, TENANT_CODE).await;
    sqlx::query("INSERT INTO client_settings (client_code, support_email) VALUES ($1, ' support@tx.example ')")
        .bind(TENANT_CODE)
        .execute(&pool)
        .await
        .unwrap();
    let repo = PostgresTenantRepository::new(pool);

    let client = repo.find_active_client(ClientId::new(client_id)).await.unwrap().unwrap();
    let support = repo.find_support_email(&tenant()).await.unwrap();

    assert_eq!(client.code, tenant());
    assert_eq!(support.as_deref(), Some("support@tx.example"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_有効なメール設定だけを取得する(pool: PgPool) {
    insert_client(&pool, TENANT_CODE).await;
    sqlx::query(
        r#"
        INSERT INTO email_settings (tenant_code, smtp_server, port, sender, password, is_live, active)
        VALUES ($1, 'old.smtp.example', 25, NULL, 'x', FALSE, FALSE),
               ($1, 'smtp.example', 587, NULL, 'secret', TRUE, TRUE)
        "#,
    )
    .bind(TENANT_CODE)
    .execute(&pool)
    .await
    .unwrap();
    let repo = PostgresEmailSettingsRepository::new(pool);

    let record = repo.find_active(&tenant()).await.unwrap().unwrap();

    assert_eq!(record.smtp_server, "smtp.example");
    assert_eq!(record.port, 587);
    assert_eq!(record.sender, None);
    assert!(record.is_live);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_無効な通知種別のテンプレートは見つからない(pool: PgPool) {
    insert_client(&pool, TENANT_CODE).await;
    sqlx::query(
        r#"
        WITH t AS (
            INSERT INTO email_notification_types (notification_type, client_code, active)
            VALUES ($2, $1, TRUE), ('Disabled', $1, FALSE)
            RETURNING id, notification_type
        )
        INSERT INTO email_templates (email_type_id, subject, template)
        SELECT id, notification_type || ' subject', '<p>[days]</p>' FROM t
        "#,
    )
    .bind(TENANT_CODE)
    .bind(notification_type::CONTRACT_EXPIRATION)
    .execute(&pool)
    .await
    .unwrap();
    let repo = PostgresEmailTemplateRepository::new(pool);

    let found = repo
        .find_by_notification_type(&tenant(), notification_type::CONTRACT_EXPIRATION)
        .await
        .unwrap()
        .unwrap();
    let disabled = repo
        .find_by_notification_type(&tenant(), "Disabled")
        .await
        .unwrap();

    assert_eq!(found.subject, "ContractExpiration subject");
    assert_eq!(found.body, "<p>[days]</p>");
    assert!(disabled.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_テンプレートの有効なリマインダーをid順に取得する(pool: PgPool) {
    let client_id = insert_client(&pool, TENANT_CODE).await;
    let template_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO reporting_profile_templates (client_id, display_name, status)
        VALUES ($1, 'Quarterly Report', 'Published')
        RETURNING id
        "#,
    )
    .bind(client_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    let ids: Vec<i32> = sqlx::query_scalar(
        r#"
        INSERT INTO report_reminders
            (report_template_id, number_of_days, when_to_send, email_notification_type, active)
        VALUES ($1, 7, '1', 'ReportReminder', TRUE),
               ($1, 3, '2', 'ReportReminder', TRUE),
               ($1, 1, '1', 'ReportReminder', FALSE)
        RETURNING id
        "#,
    )
    .bind(template_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    let repo = PostgresReportRepository::new(pool);

    let reminders = repo
        .find_active_reminders_by_template(ReportTemplateId::new(template_id))
        .await
        .unwrap();
    let inactive = repo.find_active_reminder(ReminderId::new(ids[2])).await.unwrap();
    let template = repo
        .find_active_template(ReportTemplateId::new(template_id))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].when_to_send, WhenToSend::Before);
    assert_eq!(reminders[1].when_to_send, WhenToSend::After);
    assert!(inactive.is_none());
    assert_eq!(template.status, "Published");
}
