//! # 監査レコーダー
//!
//! 送信試行ごとに `system_emails` へ 1 行記録する。
//!
//! 1 試行ごとにトランザクションを開始し、挿入トリガーの停止・挿入・再開を
//! その中で行ってからコミットする。
//! 保存の失敗はエラーとして伝播せず、ロールバックした上で失敗の [`SendResult`] として返す。

use std::sync::Arc;

use remindflow_domain::{clock::Clock, notification::SendResult, tenant::TenantCode};
use remindflow_infra::{
    InfraError,
    db::TransactionManager,
    repository::{SystemEmail, SystemEmailRepository},
};
use remindflow_shared::{event_log::event, log_business_event};

/// 1 回の送信試行の内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAttempt {
    pub recipient:   String,
    pub subject:     String,
    pub body:        String,
    pub sent:        bool,
    pub tenant_code: TenantCode,
}

/// 監査レコーダー
pub struct AuditRecorder {
    tx_manager: Arc<dyn TransactionManager>,
    repo:       Arc<dyn SystemEmailRepository>,
    clock:      Arc<dyn Clock>,
}

impl AuditRecorder {
    pub fn new(
        tx_manager: Arc<dyn TransactionManager>,
        repo: Arc<dyn SystemEmailRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tx_manager,
            repo,
            clock,
        }
    }

    async fn save(&self, email: &SystemEmail) -> Result<(), InfraError> {
        let mut tx = self.tx_manager.begin().await?;
        match self.repo.insert(&mut tx, email).await {
            Ok(()) => tx.commit().await,
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "監査レコードのロールバックに失敗");
                }
                Err(e)
            }
        }
    }

    /// 送信試行を記録する
    pub async fn record(&self, attempt: SendAttempt) -> SendResult {
        let tenant_code = attempt.tenant_code.clone();
        let email = SystemEmail {
            recipient: attempt.recipient,
            subject: attempt.subject,
            body: attempt.body,
            sent: attempt.sent,
            tenant_code: attempt.tenant_code,
            active: true,
            created_at: self.clock.now(),
        };

        match self.save(&email).await {
            Ok(()) => SendResult::success("送信記録を保存しました"),
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::AUDIT_RECORD_FAILED,
                    event.tenant_code = %tenant_code,
                    event.entity_type = event::entity_type::SYSTEM_EMAIL,
                    event.result = event::result::FAILURE,
                    error = %e,
                    "送信記録の保存に失敗"
                );
                SendResult::failure(format!("送信記録の保存に失敗: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use remindflow_domain::clock::FixedClock;
    use remindflow_infra::mock::{MockSystemEmailRepository, MockTransactionManager};

    use super::*;

    fn make_attempt(sent: bool) -> SendAttempt {
        SendAttempt {
            recipient:   "a@x.com,b@x.com".to_string(),
            subject:     "件名".to_string(),
            body:        "<p>本文</p>".to_string(),
            sent,
            tenant_code: TenantCode::new("TX").unwrap(),
        }
    }

    fn make_recorder(repo: MockSystemEmailRepository) -> AuditRecorder {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 14, 0, 0).unwrap();
        AuditRecorder::new(
            Arc::new(MockTransactionManager),
            Arc::new(repo),
            Arc::new(FixedClock::new(now)),
        )
    }

    #[tokio::test]
    async fn test_送信失敗の試行も1行記録する() {
        let repo = MockSystemEmailRepository::new();
        let recorder = make_recorder(repo.clone());

        let result = recorder.record(make_attempt(false)).await;

        assert!(result.sent);
        let records = repo.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].sent);
        assert!(records[0].active);
        assert_eq!(records[0].recipient, "a@x.com,b@x.com");
        assert_eq!(
            records[0].created_at,
            Utc.with_ymd_and_hms(2025, 1, 2, 14, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_保存失敗は失敗結果を返しトリガーは有効に戻る() {
        let repo = MockSystemEmailRepository::new();
        repo.fail_inserts();
        let recorder = make_recorder(repo.clone());

        let result = recorder.record(make_attempt(true)).await;

        assert!(!result.sent);
        assert!(result.message.contains("送信記録の保存に失敗"));
        assert!(repo.records().is_empty());
        assert!(repo.trigger().is_enabled());
        assert_eq!(repo.trigger().calls(), vec!["disable", "insert", "enable"]);
    }
}
