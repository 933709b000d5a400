//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシードデータ投入ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use sqlx::PgPool;

/// テスト用テナントコード
pub const TENANT_CODE: &str = "TX";

/// クライアントを作成し ID を返す
pub async fn insert_client(pool: &PgPool, code: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO clients (code, name, active) VALUES ($1, $1 || ' Client', TRUE) RETURNING id",
    )
    .bind(code)
    .fetch_one(pool)
    .await
    .expect("クライアント作成に失敗")
}

/// 組織を作成し ID を返す
pub async fn insert_organization(pool: &PgPool, client_id: i32, legal: &str, common: &str) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO organizations (client_id, legal_name, common_name)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(client_id)
    .bind(legal)
    .bind(common)
    .fetch_one(pool)
    .await
    .expect("組織作成に失敗")
}

/// ロールを作成し ID を返す
pub async fn insert_role(pool: &PgPool, display_text: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO security_roles (display_text) VALUES ($1) RETURNING id")
        .bind(display_text)
        .fetch_one(pool)
        .await
        .expect("ロール作成に失敗")
}

/// ユーザー・連絡先・ロール割当・組織関連付けをまとめて作成し、ユーザー ID を返す
pub async fn insert_user_with_contact(
    pool: &PgPool,
    email: &str,
    active: bool,
    role_id: i32,
    organization_id: i32,
) -> i32 {
    let user_id: i32 =
        sqlx::query_scalar("INSERT INTO security_users (active) VALUES ($1) RETURNING id")
            .bind(active)
            .fetch_one(pool)
            .await
            .expect("ユーザー作成に失敗");

    sqlx::query("INSERT INTO security_user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await
        .expect("ロール割当に失敗");

    let contact_id: i32 = sqlx::query_scalar(
        "INSERT INTO contacts (app_user_id, primary_email) VALUES ($1, $2) RETURNING id",
    )
    .bind(user_id)
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("連絡先作成に失敗");

    sqlx::query(
        "INSERT INTO contact_organization_associations (contact_id, organization_id) VALUES ($1, $2)",
    )
    .bind(contact_id)
    .bind(organization_id)
    .execute(pool)
    .await
    .expect("組織関連付けに失敗");

    user_id
}

/// `system_emails_insert` トリガーの状態（`O` = 有効, `D` = 無効）
pub async fn trigger_state(pool: &PgPool) -> String {
    sqlx::query_scalar(
        "SELECT tgenabled::text FROM pg_trigger WHERE tgname = 'system_emails_insert'",
    )
    .fetch_one(pool)
    .await
    .expect("トリガー状態の取得に失敗")
}
