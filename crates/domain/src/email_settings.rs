//! # メール送信設定
//!
//! テナントごとの SMTP 接続情報と宛先ルーティング（本番 / テスト）を定義する。
//!
//! テナントが本番モード（live）でない場合、実際の受信者には送らず
//! テスト用アドレスと監視用アドレスに送る。

use std::fmt;

use crate::recipient::RecipientSet;

/// SMTP パスワード
///
/// `Debug` 出力をマスクし、ログへの平文出力を防ぐ。
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpPassword(String);

impl SmtpPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SmtpPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SmtpPassword").field(&"[REDACTED]").finish()
    }
}

/// テナントの SMTP 設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProfile {
    pub host:         String,
    pub port:         u16,
    /// 送信者アドレス（未設定時は既定の送信者で補完済み）
    pub sender:       String,
    pub password:     SmtpPassword,
    /// SMTP 認証ユーザー名（未設定時は送信者アドレスで認証する）
    pub username:     Option<String>,
    pub is_live:      bool,
    pub test_address: Option<String>,
}

impl SmtpProfile {
    /// 認証に使うユーザー名
    pub fn login_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.sender)
    }

    /// 実際の宛先文字列を決定する
    ///
    /// - 本番モード: 受信者集合をカンマ区切りで連結
    /// - テストモード: `"{テストアドレス}, {監視用アドレス}"`（受信者集合は使わない）
    pub fn route(&self, recipients: &RecipientSet, observer_address: Option<&str>) -> String {
        if self.is_live {
            return recipients.join();
        }

        [self.test_address.as_deref(), observer_address]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
