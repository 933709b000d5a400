//! 完了ステータスの通知
//!
//! ジョブの結果を 1 行のステータス文字列として外部のアラート先へ転送する。
//! 既定の実装は構造化ログ（ビジネスイベント）として出力する。

use async_trait::async_trait;
use remindflow_shared::{event_log::event, log_business_event};

/// 完了ステータス通知トレイト
#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    /// ステータス行を通知する
    ///
    /// 通知先の障害はジョブの結果に影響させない。
    async fn notify(&self, status_line: &str);
}

/// ログ出力による完了ステータス通知
#[derive(Debug, Clone)]
pub struct LogCompletionNotifier;

#[async_trait]
impl CompletionNotifier for LogCompletionNotifier {
    async fn notify(&self, status_line: &str) {
        log_business_event!(
            event.category = event::category::JOB,
            event.action = event::action::STATUS_REPORTED,
            event.status_line = %status_line,
            "{status_line}"
        );
    }
}
