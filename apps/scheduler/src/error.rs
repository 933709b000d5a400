//! # Scheduler エラー定義
//!
//! 通知ジョブで発生するエラーを定義する。
//!
//! 送信失敗や監査記録の失敗はエラーではなく結果（[`SendResult`]）として扱う。
//! ここに定義するのはジョブの実行を中断するエラーのみ。
//!
//! [`SendResult`]: remindflow_domain::notification::SendResult

use std::fmt::Display;

use remindflow_infra::InfraError;
use thiserror::Error;

/// 通知ディスパッチで発生するエラー
#[derive(Debug, Error)]
pub enum DispatchError {
    /// 必要なエンティティまたはテナント設定が見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        entity_type: &'static str,
        id:          String,
    },

    /// テナント設定の値が不正
    #[error("不正な設定: {0}")]
    InvalidConfiguration(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),
}

impl DispatchError {
    /// NotFound エラーを生成する
    pub fn not_found(entity_type: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_not_foundはエンティティ種別とidを表示する() {
        let err = DispatchError::not_found("email_settings", "TX");
        assert_eq!(err.to_string(), "email_settings が見つかりません: TX");
    }

    #[test]
    fn test_インフラエラーから変換できる() {
        let err: DispatchError = InfraError::unexpected("boom").into();
        assert!(matches!(err, DispatchError::Database(_)));
    }
}
