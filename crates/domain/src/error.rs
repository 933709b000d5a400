//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//!
//! ## 使用例
//!
//! ```rust
//! use remindflow_domain::DomainError;
//!
//! fn find_contract(id: i32) -> Result<(), DomainError> {
//!     Err(DomainError::NotFound {
//!         entity_type: "Contract",
//!         id:          id.to_string(),
//!     })
//! }
//!
//! assert!(find_contract(1).is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// DB から読み込んだ値や設定値がドメインの制約を満たさない場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    ///
    /// # フィールド
    ///
    /// - `entity_type`: エンティティの種類（コンパイル時に決定される `&'static str`）
    /// - `id`: 検索に使用した識別子
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Contract", "EmailSettings" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },
}
