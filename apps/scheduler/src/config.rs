//! # Scheduler 設定
//!
//! 環境変数から通知ジョブの設定を読み込む。
//!
//! メールアドレスや認証情報はコードに埋め込まず、すべて環境変数または
//! テナントごとの DB 設定から取得する。

use std::{env, time::Duration};

use chrono::FixedOffset;
use remindflow_domain::deployment::DeploymentEnvironment;
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 環境変数の値が不正
    #[error("{name} の値が不正です（{value}）: {reason}")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// 通知ジョブの設定
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// データベース接続 URL
    pub database_url:         String,
    /// デプロイ環境
    pub deployment:           DeploymentEnvironment,
    /// アプリケーションのベースドメイン（メール内リンク用）
    pub base_domain:          String,
    /// 各 DB 接続の statement_timeout
    pub db_statement_timeout: Duration,
    /// ステータス行の時刻を表示する UTC オフセット
    pub status_utc_offset:    FixedOffset,
    /// 通知設定
    pub notification:         NotificationConfig,
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: テナントの SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド（"smtp" | "noop"）
    pub backend:          String,
    /// テナント設定に送信者がない場合の送信者アドレス
    pub default_sender:   String,
    /// テストモード時にテストアドレスと併せて送る監視用アドレス
    pub observer_address: Option<String>,
    /// 1 通あたりの送信タイムアウト
    pub smtp_timeout:     Duration,
    /// SMTP 接続の暗号化方式（"starttls" | "plain"）
    pub smtp_security:    String,
}

impl SchedulerConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列の値は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let deployment = match var("DEPLOY_ENV") {
            Some(value) => value.parse().map_err(|e: strum::ParseError| ConfigError::Invalid {
                name:   "DEPLOY_ENV",
                value:  value.clone(),
                reason: e.to_string(),
            })?,
            None => DeploymentEnvironment::default(),
        };

        let status_utc_offset = match var("STATUS_UTC_OFFSET") {
            Some(value) => value.trim().parse().map_err(|e: chrono::ParseError| {
                ConfigError::Invalid {
                    name:   "STATUS_UTC_OFFSET",
                    value:  value.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => FixedOffset::east_opt(0).ok_or_else(|| ConfigError::Invalid {
                name:   "STATUS_UTC_OFFSET",
                value:  "+00:00".to_string(),
                reason: "UTC オフセットを生成できません".to_string(),
            })?,
        };

        Ok(Self {
            database_url,
            deployment,
            base_domain: var("APP_BASE_DOMAIN").unwrap_or_else(|| "localhost".to_string()),
            db_statement_timeout: parse_secs(&var, "DB_STATEMENT_TIMEOUT_SECS", 30)?,
            status_utc_offset,
            notification: NotificationConfig {
                backend:          var("NOTIFICATION_BACKEND").unwrap_or_else(|| "noop".to_string()),
                default_sender:   var("NOTIFICATION_DEFAULT_SENDER")
                    .unwrap_or_else(|| "noreply@remindflow.example.com".to_string()),
                observer_address: var("NOTIFICATION_OBSERVER_ADDRESS"),
                smtp_timeout:     parse_secs(&var, "SMTP_TIMEOUT_SECS", 30)?,
                smtp_security:    var("SMTP_SECURITY").unwrap_or_else(|| "starttls".to_string()),
            },
        })
    }
}

/// 秒数の環境変数を Duration として読み込む
fn parse_secs(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(value) = var(name) else {
        return Ok(Duration::from_secs(default));
    };

    let secs: u64 = value.trim().parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::Invalid {
            name,
            value: value.clone(),
            reason: e.to_string(),
        }
    })?;

    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            value,
            reason: "1 以上を指定してください".to_string(),
        });
    }

    Ok(Duration::from_secs(secs))
}
