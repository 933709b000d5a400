//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 備考 |
//! |---|------------|------|
//! | [`NotificationEvent`] | 通知イベント | 契約満了 / レポートリマインダー |
//! | [`EmailTemplate`] | メールテンプレート | テナントごとの件名・本文（`[name]` プレースホルダー付き） |
//! | [`EmailMessage`] | 送信メール | レンダリング・宛先ルーティング後のメッセージ |
//! | [`SendResult`] | 送信結果 | 成否フラグと人間可読なメッセージ |
//!
//! ## 設計方針
//!
//! - **enum による通知イベント**: 契約満了とレポートリマインダーを 1 つの型で扱い、
//!   ディスパッチャーはバリアントで分岐する
//! - **結果は値で返す**: 送信失敗・監査記録失敗は [`SendResult`] で表現し、例外的な
//!   制御フローにしない

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    contract::ContractDetails,
    report::{ReportReminder, ReportTemplate},
    tenant::{Client, TenantCode},
};

/// 通知種別キー
pub mod notification_type {
    /// 契約満了通知
    pub const CONTRACT_EXPIRATION: &str = "ContractExpiration";
}

/// 受信者の抽出に使うロール名（`roles.display_text`）
pub mod role_name {
    /// 契約閲覧権限
    pub const VIEW_CONTRACTS: &str = "View Contracts";
    /// レポート提出権限
    pub const SUBMIT_REPORTING: &str = "Submit Reporting";
}

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// 送信がタイムアウトした
    #[error("メール送信がタイムアウト: {0} 秒")]
    Timeout(u64),
}

/// メール優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MailPriority {
    #[default]
    Normal,
    High,
}

impl MailPriority {
    /// `X-Priority` ヘッダーの値
    pub fn x_priority(self) -> &'static str {
        match self {
            Self::Normal => "3 (Normal)",
            Self::High => "1 (Highest)",
        }
    }
}

/// メールテンプレート
///
/// テナント管理者が管理する件名・本文。このジョブからは読み取りのみ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub body:    String,
}

/// 送信メール
///
/// テンプレートレンダリングと宛先ルーティングの結果。`NotificationSender` に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 宛先（カンマ区切り）
    pub to:        String,
    /// 差出人（テナントのサポート窓口アドレス）
    pub from:      String,
    /// 送信者（SMTP 認証に使うアドレス）
    pub sender:    String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// 優先度
    pub priority:  MailPriority,
}

impl EmailMessage {
    /// 宛先を個々のアドレスに分解する（空要素は除外）
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to.split(',').map(str::trim).filter(|s| !s.is_empty())
    }
}

/// 送信結果
///
/// 送信 1 回ごとに生成される一時的な値。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    pub sent:    bool,
    pub message: String,
}

impl SendResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            sent:    true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            sent:    false,
            message: message.into(),
        }
    }
}

/// 通知イベント
///
/// トリガーによって生成され、ディスパッチャーが 1 件ずつ処理する。永続化しない。
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// 契約満了: `days` 日後に満了する契約 → 契約閲覧権限を持つ組織ユーザーに送信
    ContractExpiration {
        details: ContractDetails,
        days:    u32,
    },
    /// レポートリマインダー → レポート提出権限を持つ対象組織ユーザーに送信
    ReportReminder {
        reminder: ReportReminder,
        template: ReportTemplate,
        client:   Client,
        /// 対象月のラベル（例: `January`）
        month:    String,
    },
}

impl NotificationEvent {
    /// 通知先テナントのコード
    pub fn tenant_code(&self) -> &TenantCode {
        match self {
            Self::ContractExpiration { details, .. } => &details.client.code,
            Self::ReportReminder { client, .. } => &client.code,
        }
    }

    /// テンプレート解決に使う通知種別キー
    pub fn notification_type(&self) -> &str {
        match self {
            Self::ContractExpiration { .. } => notification_type::CONTRACT_EXPIRATION,
            Self::ReportReminder { reminder, .. } => &reminder.notification_type,
        }
    }

    /// 完了通知に表示するエンティティ名
    pub fn display_name(&self) -> String {
        match self {
            Self::ContractExpiration { details, .. } => details.display_name(),
            Self::ReportReminder {
                reminder,
                template,
                month,
                ..
            } => format!("{}({}-{month})", template.display_name, reminder.when_to_send),
        }
    }

    /// 送信優先度
    pub fn priority(&self) -> MailPriority {
        match self {
            Self::ContractExpiration { .. } => MailPriority::High,
            Self::ReportReminder { reminder, .. } => reminder.when_to_send.priority(),
        }
    }

    /// ログ用のエンティティ種別
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::ContractExpiration { .. } => "contract",
            Self::ReportReminder { .. } => "report_reminder",
        }
    }

    /// ログ用のエンティティ ID
    pub fn entity_id(&self) -> i32 {
        match self {
            Self::ContractExpiration { details, .. } => details.contract.id.as_i32(),
            Self::ReportReminder { reminder, .. } => reminder.id.as_i32(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        report::{ReminderId, ReportTemplateId, WhenToSend},
        tenant::ClientId,
    };

    fn make_reminder_event(when_to_send: WhenToSend) -> NotificationEvent {
        NotificationEvent::ReportReminder {
            reminder: ReportReminder {
                id: ReminderId::new(9),
                report_template_id: ReportTemplateId::new(4),
                number_of_days: 15,
                when_to_send,
                months: None,
                notification_type: "ReportReminder".to_string(),
            },
            template: ReportTemplate {
                id:           ReportTemplateId::new(4),
                display_name: "Quarterly Ridership".to_string(),
                client_id:    ClientId::new(1),
                status:       "Published".to_string(),
            },
            client:   Client {
                id:   ClientId::new(1),
                code: TenantCode::new("TX").unwrap(),
            },
            month:    "January".to_string(),
        }
    }

    #[test]
    fn test_リマインダーの表示名にタイミングと月を含む() {
        let event = make_reminder_event(WhenToSend::Before);
        assert_eq!(event.display_name(), "Quarterly Ridership(Before-January)");
    }

    #[test]
    fn test_リマインダーはリマインダー固有の通知種別を使う() {
        let event = make_reminder_event(WhenToSend::After);
        assert_eq!(event.notification_type(), "ReportReminder");
        assert_eq!(event.tenant_code().as_str(), "TX");
        assert_eq!(event.priority(), MailPriority::High);
        assert_eq!(event.entity_id(), 9);
    }

    #[test]
    fn test_recipientsはカンマ区切りの宛先を分解する() {
        let message = EmailMessage {
            to:        "a@x.com, b@x.com,,".to_string(),
            from:      "support@x.com".to_string(),
            sender:    "system@x.com".to_string(),
            subject:   "件名".to_string(),
            html_body: "<p>本文</p>".to_string(),
            priority:  MailPriority::Normal,
        };

        assert_eq!(
            message.recipients().collect::<Vec<_>>(),
            vec!["a@x.com", "b@x.com"]
        );
    }

    #[test]
    fn test_send_resultのコンストラクタ() {
        assert!(SendResult::success("ok").sent);
        assert!(!SendResult::failure("ng").sent);
    }
}
