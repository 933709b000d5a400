//! # レポートリマインダー
//!
//! レポート提出のリマインダー設定と、その対象となるレポートテンプレートを定義する。
//!
//! リマインダーは「基準日の何日前（または後）に、どの通知種別のメールを送るか」を
//! 表す設定であり、1 つのレポートテンプレートに複数登録できる。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{notification::MailPriority, tenant::ClientId};

define_int_id! {
    /// レポートテンプレート ID
    pub struct ReportTemplateId;
}

define_int_id! {
    /// リマインダー ID
    pub struct ReminderId;
}

/// 送信タイミング（基準日の前か後か）
///
/// DB 上は `"1"`（前）/ それ以外（後）のコード値で保持される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhenToSend {
    Before,
    After,
}

impl WhenToSend {
    /// DB のコード値から変換する
    pub fn from_code(code: &str) -> Self {
        if code.trim() == "1" {
            Self::Before
        } else {
            Self::After
        }
    }

    /// 送信優先度
    ///
    /// 基準日を過ぎてからのリマインダーは督促にあたるため高優先度で送る。
    pub fn priority(self) -> MailPriority {
        match self {
            Self::Before => MailPriority::Normal,
            Self::After => MailPriority::High,
        }
    }
}

impl fmt::Display for WhenToSend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("Before"),
            Self::After => f.write_str("After"),
        }
    }
}

/// レポートテンプレートの公開ステータス
pub mod template_status {
    /// 公開済み
    pub const PUBLISHED: &str = "Published";
    /// 開発中（ローカル環境でのみ通知対象）
    pub const IN_DEVELOPMENT: &str = "In Development";
}

/// レポートリマインダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportReminder {
    pub id:                 ReminderId,
    pub report_template_id: ReportTemplateId,
    pub number_of_days:     i32,
    pub when_to_send:       WhenToSend,
    /// 送信対象月（カンマ区切り、未設定なら毎月）
    pub months:             Option<String>,
    /// テンプレート解決に使う通知種別キー
    pub notification_type:  String,
}

impl ReportReminder {
    /// 指定月が送信対象か
    ///
    /// `months` が未設定または空なら毎月対象。月名は大文字小文字を区別しない。
    pub fn is_scheduled_for(&self, month: &str) -> bool {
        let month = month.trim();
        match self.months.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(months) => months
                .split(',')
                .any(|m| m.trim().eq_ignore_ascii_case(month)),
        }
    }
}

/// レポートテンプレート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTemplate {
    pub id:           ReportTemplateId,
    pub display_name: String,
    pub client_id:    ClientId,
    pub status:       String,
}

impl ReportTemplate {
    /// 指定ステータスで公開されているか
    pub fn has_status(&self, expected: &str) -> bool {
        self.status == expected
    }
}
