//! # テナント
//!
//! 通知を配信する顧客組織（テナント）のモデル。
//!
//! テナントは短いコード（例: `TX`）で識別され、テナントごとに SMTP 設定と
//! メールテンプレートを持つ。DB 上では `clients` テーブルの行がテナントに対応し、
//! 契約やレポートテンプレートは `client_id` でテナントに紐づく。
//!
//! ## 使用例
//!
//! ```rust
//! use remindflow_domain::tenant::TenantCode;
//!
//! let code = TenantCode::new(" TX ").unwrap();
//! assert_eq!(code.as_str(), "TX");
//! assert!(TenantCode::new("").is_err());
//! ```

define_int_id! {
    /// クライアント ID（`clients` テーブルの主キー）
    pub struct ClientId;
}

define_validated_string! {
    /// テナントコード
    ///
    /// `email_settings.tenant_code` や `email_notification_types.client_code` の
    /// 検索キーとして使用する。前後の空白は除去される。
    pub struct TenantCode {
        label: "テナントコード",
        max_length: 16,
    }
}

/// クライアント（テナントの実体）
///
/// 有効（active）なクライアントのみがリポジトリから返される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id:   ClientId,
    pub code: TenantCode,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_テナントコードは前後の空白を除去する() {
        let code = TenantCode::new("  TX\n").unwrap();
        assert_eq!(code.as_str(), "TX");
        assert_eq!(code.to_string(), "TX");
    }

    #[test]
    fn test_空のテナントコードはエラー() {
        assert!(TenantCode::new("   ").is_err());
    }

    #[test]
    fn test_長すぎるテナントコードはエラー() {
        assert!(TenantCode::new("A".repeat(17)).is_err());
        assert!(TenantCode::new("A".repeat(16)).is_ok());
    }

    #[test]
    fn test_クライアントidは整数値をそのまま表示する() {
        assert_eq!(ClientId::new(7).to_string(), "7");
        assert_eq!(ClientId::new(7).as_i32(), 7);
    }
}
