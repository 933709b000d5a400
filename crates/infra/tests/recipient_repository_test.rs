//! RecipientRepository 統合テスト
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://... cargo test -p remindflow-infra --test recipient_repository_test
//! ```

mod common;

use common::{TENANT_CODE, insert_client, insert_organization, insert_role, insert_user_with_contact};
use pretty_assertions::assert_eq;
use remindflow_domain::{
    contract::OrganizationId,
    notification::role_name,
    recipient::RecipientScope,
    report::ReportTemplateId,
    tenant::TenantCode,
};
use remindflow_infra::repository::{PostgresRecipientRepository, RecipientRepository};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_組織スコープでは有効なロール保持者だけを返す(pool: PgPool) {
    let client_id = insert_client(&pool, TENANT_CODE).await;
    let org_id = insert_organization(&pool, client_id, "Acme Corp", "Acme").await;
    let other_org = insert_organization(&pool, client_id, "Other Corp", "Other").await;
    let view = insert_role(&pool, role_name::VIEW_CONTRACTS).await;
    let submit = insert_role(&pool, role_name::SUBMIT_REPORTING).await;

    insert_user_with_contact(&pool, "viewer@acme.example", true, view, org_id).await;
    insert_user_with_contact(&pool, "inactive@acme.example", false, view, org_id).await;
    insert_user_with_contact(&pool, "submitter@acme.example", true, submit, org_id).await;
    insert_user_with_contact(&pool, "viewer@other.example", true, view, other_org).await;

    let repo = PostgresRecipientRepository::new(pool);
    let emails = repo
        .find_emails(
            role_name::VIEW_CONTRACTS,
            &RecipientScope::Organization(OrganizationId::new(org_id)),
        )
        .await
        .unwrap();

    assert_eq!(emails, vec!["viewer@acme.example".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_テンプレートスコープでは有効な組織リンクを辿る(pool: PgPool) {
    let client_id = insert_client(&pool, TENANT_CODE).await;
    let linked = insert_organization(&pool, client_id, "Linked Corp", "Linked").await;
    let unlinked = insert_organization(&pool, client_id, "Unlinked Corp", "Unlinked").await;
    let submit = insert_role(&pool, role_name::SUBMIT_REPORTING).await;
    insert_user_with_contact(&pool, "linked@example.com", true, submit, linked).await;
    insert_user_with_contact(&pool, "unlinked@example.com", true, submit, unlinked).await;

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
    sqlx::query(
        r#"
        INSERT INTO reporting_profile_template_organizations
            (reporting_profile_template_id, organization_id, active)
        VALUES ($1, $2, TRUE), ($1, $3, FALSE)
        "#,
    )
    .bind(template_id)
    .bind(linked)
    .bind(unlinked)
    .execute(&pool)
    .await
    .unwrap();

    let repo = PostgresRecipientRepository::new(pool);
    let emails = repo
        .find_emails(
            role_name::SUBMIT_REPORTING,
            &RecipientScope::ReportTemplate(ReportTemplateId::new(template_id)),
        )
        .await
        .unwrap();

    assert_eq!(emails, vec!["linked@example.com".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_テナントスコープではテナントの全組織を対象にする(pool: PgPool) {
    let client_id = insert_client(&pool, TENANT_CODE).await;
    let other_client = insert_client(&pool, "NM").await;
    let org_a = insert_organization(&pool, client_id, "A Corp", "A").await;
    let org_b = insert_organization(&pool, client_id, "B Corp", "B").await;
    let foreign = insert_organization(&pool, other_client, "C Corp", "C").await;
    let view = insert_role(&pool, role_name::VIEW_CONTRACTS).await;
    insert_user_with_contact(&pool, "a@example.com", true, view, org_a).await;
    insert_user_with_contact(&pool, "b@example.com", true, view, org_b).await;
    insert_user_with_contact(&pool, "c@example.com", true, view, foreign).await;

    let repo = PostgresRecipientRepository::new(pool);
    let emails = repo
        .find_emails(
            role_name::VIEW_CONTRACTS,
            &RecipientScope::Tenant(TenantCode::new(TENANT_CODE).unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(emails, vec!["a@example.com".to_string(), "b@example.com".to_string()]);
}
