//! # 受信者リゾルバ
//!
//! ロールとスコープから通知の受信者集合を求める。
//!
//! ## 設計方針
//!
//! - **fail-soft**: 検索に失敗した場合はエラーを記録して空集合を返す。
//!   空集合の通知はディスパッチャーがスキップする
//! - **重複排除**: 大文字小文字を区別せずにアドレスを比較し、最初の表記を残す

use std::sync::Arc;

use remindflow_domain::recipient::{RecipientScope, RecipientSet};
use remindflow_infra::repository::RecipientRepository;
use remindflow_shared::event_log::error as log_error;

/// 受信者リゾルバ
pub struct RecipientResolver {
    repo: Arc<dyn RecipientRepository>,
}

impl RecipientResolver {
    pub fn new(repo: Arc<dyn RecipientRepository>) -> Self {
        Self { repo }
    }

    /// ロールを持ち、スコープ内の組織に関連付けられた受信者を返す
    ///
    /// 失敗しない。検索エラーは空集合になる。
    pub async fn resolve(&self, role: &str, scope: &RecipientScope) -> RecipientSet {
        match self.repo.find_emails(role, scope).await {
            Ok(emails) => emails.into_iter().collect(),
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::RECIPIENT_LOOKUP,
                    error = %e,
                    role,
                    scope = ?scope,
                    "受信者の検索に失敗、空集合として扱う"
                );
                RecipientSet::empty()
            }
        }
    }
}
