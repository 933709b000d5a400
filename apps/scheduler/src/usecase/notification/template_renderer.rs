//! # テンプレートレンダラー
//!
//! テナントのメールテンプレート（件名・本文）中の `[name]` 形式のプレースホルダーを
//! 通知イベントの値で置換する。
//!
//! ## 設計方針
//!
//! - **リテラル置換**: 式評価もエスケープも行わない（本文は HTML としてそのまま送る）
//! - **未知のプレースホルダーは残す**: 対応表にない `[name]` はそのまま出力する
//! - **1 パス走査**: 左から 1 回だけ走査し、置換した値は再走査しない。そのため
//!   値が対応表のトークンを含まない限り、レンダリング結果を再度レンダリングしても変わらない
//! - **失敗しない**: どの入力に対しても文字列を返す

use std::collections::BTreeMap;

use remindflow_domain::{
    deployment::DeploymentEnvironment,
    notification::{EmailTemplate, NotificationEvent},
};

/// プレースホルダー名
pub mod placeholder {
    // 契約満了
    pub const DAYS: &str = "days";
    pub const ORGANIZATION: &str = "organization";
    pub const PROGRAM: &str = "program";
    pub const YEAR: &str = "year";
    pub const CONTRACT: &str = "contract";
    pub const EXPIRATION: &str = "expiration";
    pub const REQUEST_LINK: &str = "requestlink";

    // レポートリマインダー
    pub const REPORTING_DISPLAY_NAME: &str = "Reporting_Display_Name";
    pub const NUMBER_OF_DAYS: &str = "numberofdays";
}

/// プレースホルダー名 → 置換値の対応表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders(BTreeMap<String, String>);

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// 対応を追加する（同名は上書き）
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// テンプレート文字列のプレースホルダーを置換する
pub fn render(template: &str, placeholders: &Placeholders) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after
            .find(']')
            .map(|close| (&after[..close], close))
            .filter(|(name, _)| !name.contains('['))
            .and_then(|(name, close)| placeholders.get(name).map(|v| (v, close)));

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('[');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// レンダリング済みのメール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body:    String,
}

/// テンプレートレンダラー
///
/// 通知イベントからプレースホルダーの対応表を組み立て、件名と本文を置換する。
pub struct TemplateRenderer {
    deployment:  DeploymentEnvironment,
    base_domain: String,
}

impl TemplateRenderer {
    pub fn new(deployment: DeploymentEnvironment, base_domain: impl Into<String>) -> Self {
        Self {
            deployment,
            base_domain: base_domain.into(),
        }
    }

    /// 通知イベントの置換値を組み立てる
    pub fn placeholders(&self, event: &NotificationEvent) -> Placeholders {
        match event {
            NotificationEvent::ContractExpiration { details, days } => {
                let domain = self
                    .deployment
                    .domain(&details.client.code, &self.base_domain);
                let request_link = format!(
                    "<a href='https://{domain}/organization/{org}/contract/{id}?pid=0'>View Contracts Permissions</a>",
                    org = details.organization.id,
                    id = details.contract.id,
                );

                Placeholders::new()
                    .with(placeholder::DAYS, days.to_string())
                    .with(placeholder::ORGANIZATION, details.organization.display_name())
                    .with(placeholder::PROGRAM, details.program.common_name.clone())
                    .with(placeholder::YEAR, details.contract.contract_year.to_string())
                    .with(placeholder::CONTRACT, details.display_name())
                    .with(
                        placeholder::EXPIRATION,
                        details.contract.expiration_date.format("%Y-%m-%d").to_string(),
                    )
                    .with(placeholder::REQUEST_LINK, request_link)
            }
            NotificationEvent::ReportReminder {
                reminder, template, ..
            } => Placeholders::new()
                .with(placeholder::REPORTING_DISPLAY_NAME, template.display_name.clone())
                .with(placeholder::NUMBER_OF_DAYS, reminder.number_of_days.to_string()),
        }
    }

    /// 件名と本文を同じ対応表でレンダリングする
    pub fn render(&self, event: &NotificationEvent, template: &EmailTemplate) -> RenderedEmail {
        let placeholders = self.placeholders(event);
        RenderedEmail {
            subject: render(&template.subject, &placeholders),
            body:    render(&template.body, &placeholders),
        }
    }
}
