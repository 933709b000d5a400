//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 接続先と認証情報はテナントの [`SmtpProfile`] から送信ごとに組み立てる。

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{
        Mailbox,
        Message,
        header::{ContentType, Header, HeaderName, HeaderValue},
    },
    transport::smtp::authentication::Credentials,
};
use remindflow_domain::{
    email_settings::SmtpProfile,
    notification::{EmailMessage, MailPriority, NotificationError},
};

use super::NotificationSender;

/// SMTP 接続の暗号化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// STARTTLS 必須（本番・検証環境の SMTP リレー）
    #[default]
    StartTls,
    /// 暗号化なし（Mailpit 等のローカル SMTP 向け）
    Plain,
}

impl SmtpSecurity {
    /// 文字列から暗号化方式をパースする（未知の値は STARTTLS）
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" | "none" => Self::Plain,
            _ => Self::StartTls,
        }
    }
}

/// `X-Priority` ヘッダー
#[derive(Debug, Clone, PartialEq, Eq)]
struct XPriority(String);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

impl From<MailPriority> for XPriority {
    fn from(priority: MailPriority) -> Self {
        Self(priority.x_priority().to_string())
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` を送信ごとに構築する。
pub struct SmtpNotificationSender {
    security: SmtpSecurity,
    timeout:  Duration,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `security`: 接続の暗号化方式
    /// - `timeout`: 1 通の送信（接続から応答まで）の上限時間
    pub fn new(security: SmtpSecurity, timeout: Duration) -> Self {
        Self { security, timeout }
    }

    fn build_transport(
        &self,
        profile: &SmtpProfile,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotificationError> {
        let builder = match self.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&profile.host)
                    .map_err(|e| NotificationError::SendFailed(format!("SMTP リレー設定失敗: {e}")))?
            }
            SmtpSecurity::Plain => {
                // builder_dangerous: TLS なしで接続
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&profile.host)
            }
        };

        let builder = builder.port(profile.port).timeout(Some(self.timeout));

        let builder = if profile.password.expose().is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                profile.login_name().to_string(),
                profile.password.expose().to_string(),
            ))
        };

        Ok(builder.build())
    }
}

/// lettre のメッセージを構築する
fn build_message(email: &EmailMessage) -> Result<Message, NotificationError> {
    let parse = |label: &str, address: &str| -> Result<Mailbox, NotificationError> {
        address
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("{label}アドレス不正 ({address}): {e}")))
    };

    let mut builder = Message::builder()
        .from(parse("送信元", &email.from)?)
        .sender(parse("送信者", &email.sender)?)
        .subject(&email.subject)
        .header(XPriority::from(email.priority))
        .header(ContentType::TEXT_HTML);

    let mut has_recipient = false;
    for to in email.recipients() {
        builder = builder.to(parse("宛先", to)?);
        has_recipient = true;
    }
    if !has_recipient {
        return Err(NotificationError::SendFailed("宛先が空です".to_string()));
    }

    builder
        .body(email.html_body.clone())
        .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(
        &self,
        email: &EmailMessage,
        profile: &SmtpProfile,
    ) -> Result<(), NotificationError> {
        let message = build_message(email)?;
        let transport = self.build_transport(profile)?;

        match tokio::time::timeout(self.timeout, transport.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(NotificationError::SendFailed(format!("SMTP 送信失敗: {e}"))),
            Err(_) => Err(NotificationError::Timeout(self.timeout.as_secs())),
        }
    }
}
