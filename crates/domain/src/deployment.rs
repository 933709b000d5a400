//! # デプロイ環境
//!
//! メール本文に埋め込むリンクのドメインと、リマインダー対象とする
//! レポートテンプレートのステータスはデプロイ環境によって変わる。
//! 環境は設定値として明示的に渡す（プロセス環境を暗黙に参照しない）。

use serde::{Deserialize, Serialize};

use crate::{report::template_status, tenant::TenantCode};

/// デプロイ環境
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeploymentEnvironment {
    #[default]
    Local,
    Qa,
    Staging,
    Production,
}

impl DeploymentEnvironment {
    /// テナントのアプリケーションドメインを返す
    ///
    /// | 環境 | ドメイン |
    /// |------|---------|
    /// | local | `localhost` |
    /// | qa | `test-{code}dot.{base}` |
    /// | staging | `staging-{code}dot.{base}` |
    /// | production | `{code}dot.{base}` |
    pub fn domain(self, tenant: &TenantCode, base_domain: &str) -> String {
        match self {
            Self::Local => "localhost".to_string(),
            Self::Qa => format!("test-{tenant}dot.{base_domain}"),
            Self::Staging => format!("staging-{tenant}dot.{base_domain}"),
            Self::Production => format!("{tenant}dot.{base_domain}"),
        }
    }

    /// リマインダーを送るレポートテンプレートのステータス
    pub fn reportable_template_status(self) -> &'static str {
        match self {
            Self::Local => template_status::IN_DEVELOPMENT,
            Self::Qa | Self::Staging | Self::Production => template_status::PUBLISHED,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DeploymentEnvironment::Local, "localhost")]
    #[case(DeploymentEnvironment::Qa, "test-TXdot.example.com")]
    #[case(DeploymentEnvironment::Staging, "staging-TXdot.example.com")]
    #[case(DeploymentEnvironment::Production, "TXdot.example.com")]
    fn test_環境ごとのドメイン(#[case] env: DeploymentEnvironment, #[case] expected: &str) {
        let code = TenantCode::new("TX").unwrap();
        assert_eq!(env.domain(&code, "example.com"), expected);
    }

    #[test]
    fn test_文字列から環境をパースできる() {
        assert_eq!(
            DeploymentEnvironment::from_str("production").unwrap(),
            DeploymentEnvironment::Production
        );
        assert_eq!(
            DeploymentEnvironment::from_str("QA").unwrap(),
            DeploymentEnvironment::Qa
        );
        assert!(DeploymentEnvironment::from_str("dev").is_err());
    }

    #[test]
    fn test_ローカル環境のみ開発中テンプレートを対象にする() {
        assert_eq!(
            DeploymentEnvironment::Local.reportable_template_status(),
            "In Development"
        );
        assert_eq!(
            DeploymentEnvironment::Production.reportable_template_status(),
            "Published"
        );
    }
}
