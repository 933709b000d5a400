//! # 受信者
//!
//! 通知の受信者集合と、その抽出範囲（スコープ）を定義する。

use std::collections::HashSet;

use crate::{contract::OrganizationId, report::ReportTemplateId, tenant::TenantCode};

/// 受信者の抽出範囲
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientScope {
    /// 組織に所属するユーザー
    Organization(OrganizationId),
    /// レポートテンプレートの対象組織に所属するユーザー
    ReportTemplate(ReportTemplateId),
    /// テナント配下の全組織に所属するユーザー
    Tenant(TenantCode),
}

/// 受信者集合
///
/// 重複のないメールアドレスの順序付き列。ディスパッチごとに再計算され、キャッシュしない。
/// 重複判定は大文字小文字を区別せず、最初に現れた表記を残す。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSet(Vec<String>);

impl RecipientSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// 宛先文字列（カンマ区切り）
    pub fn join(&self) -> String {
        self.0.join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for RecipientSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let addresses = iter
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.to_lowercase()))
            .collect();
        Self(addresses)
    }
}
