//! # メール設定リゾルバ
//!
//! テナントの SMTP 設定と送信元アドレスを解決し、本番・テストの宛先振り分けを行う。
//!
//! ## 設計方針
//!
//! - **fail-fast**: 有効なメール設定やサポート窓口アドレスがないテナントは
//!   `NotFound` とし、送信前にジョブを止める
//! - **送信者の既定値**: テナント設定に送信者がない場合は設定ファイルの既定送信者を使う
//! - **監視用アドレス**: テストモードでテストアドレスと併せて送るアドレスは設定値で渡す

use std::sync::Arc;

use remindflow_domain::{
    email_settings::{SmtpPassword, SmtpProfile},
    recipient::RecipientSet,
    tenant::TenantCode,
};
use remindflow_infra::repository::{EmailSettingsRecord, EmailSettingsRepository, TenantRepository};

use crate::error::DispatchError;

/// 解決済みのメール設定
#[derive(Debug, Clone)]
pub struct ResolvedEmailSettings {
    /// SMTP 接続情報
    pub profile:          SmtpProfile,
    /// メッセージの From（テナントのサポート窓口）
    pub from:             String,
    /// テストモード時の監視用アドレス
    pub observer_address: Option<String>,
}

impl ResolvedEmailSettings {
    /// 実際の宛先文字列を返す
    ///
    /// 本番モードでは受信者をカンマ区切りで連結し、テストモードでは
    /// `"{テストアドレス}, {監視用アドレス}"` に差し替える。
    pub fn route(&self, recipients: &RecipientSet) -> String {
        self.profile
            .route(recipients, self.observer_address.as_deref())
    }
}

/// メール設定リゾルバ
pub struct EmailSettingsResolver {
    settings_repo:    Arc<dyn EmailSettingsRepository>,
    tenant_repo:      Arc<dyn TenantRepository>,
    default_sender:   String,
    observer_address: Option<String>,
}

impl EmailSettingsResolver {
    pub fn new(
        settings_repo: Arc<dyn EmailSettingsRepository>,
        tenant_repo: Arc<dyn TenantRepository>,
        default_sender: String,
        observer_address: Option<String>,
    ) -> Self {
        Self {
            settings_repo,
            tenant_repo,
            default_sender,
            observer_address,
        }
    }

    /// テナントのメール設定を解決する
    pub async fn resolve(
        &self,
        tenant: &TenantCode,
    ) -> Result<ResolvedEmailSettings, DispatchError> {
        let record = self
            .settings_repo
            .find_active(tenant)
            .await?
            .ok_or_else(|| DispatchError::not_found("email_settings", tenant))?;

        let from = self
            .tenant_repo
            .find_support_email(tenant)
            .await?
            .ok_or_else(|| DispatchError::not_found("client_settings", tenant))?;

        Ok(ResolvedEmailSettings {
            profile: self.to_profile(tenant, record)?,
            from,
            observer_address: self.observer_address.clone(),
        })
    }

    fn to_profile(
        &self,
        tenant: &TenantCode,
        record: EmailSettingsRecord,
    ) -> Result<SmtpProfile, DispatchError> {
        let port = u16::try_from(record.port).map_err(|_| {
            DispatchError::InvalidConfiguration(format!(
                "テナント {tenant} の SMTP ポートが範囲外です: {}",
                record.port
            ))
        })?;

        let sender = record
            .sender
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_sender.clone());

        Ok(SmtpProfile {
            host: record.smtp_server,
            port,
            sender,
            password: SmtpPassword::new(record.password),
            username: record.user_name.filter(|u| !u.trim().is_empty()),
            is_live: record.is_live,
            test_address: record.test_address,
        })
    }
}
