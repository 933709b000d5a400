//! # 完了ステータス行
//!
//! 完了通知に渡す 1 行のステータス文字列を組み立てる。
//!
//! 形式: `{STATUS} tenant:{code} / entity:{name} / result:{message} : {MM/DD/YYYY hh:mm:ss AM}`

use std::fmt;

use chrono::{DateTime, FixedOffset};

/// ステータス種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CompletionStatus {
    /// 送信と記録に成功
    Success,
    /// 送信または記録に失敗、もしくはジョブが中断した
    Failed,
    /// 受信者なし、または対象外のため送信しなかった
    Skipped,
    /// 処理対象がなかった
    Done,
}

/// 完了ステータス行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status:  CompletionStatus,
    pub tenant:  String,
    pub entity:  String,
    pub message: String,
    pub at:      DateTime<FixedOffset>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tenant:{} / entity:{} / result:{} : {}",
            self.status,
            self.tenant,
            self.entity,
            self.message,
            self.at.format("%m/%d/%Y %I:%M:%S %p")
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn at(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 2, hour, 5, 9)
            .unwrap()
    }

    #[rstest]
    #[case(CompletionStatus::Success, 9, "SUCCESS tenant:TX / entity:Grant(42) / result:sent : 01/02/2025 09:05:09 AM")]
    #[case(CompletionStatus::Failed, 21, "FAILED tenant:TX / entity:Grant(42) / result:sent : 01/02/2025 09:05:09 PM")]
    #[case(CompletionStatus::Skipped, 0, "SKIPPED tenant:TX / entity:Grant(42) / result:sent : 01/02/2025 12:05:09 AM")]
    fn test_ステータス行の書式(
        #[case] status: CompletionStatus,
        #[case] hour: u32,
        #[case] expected: &str,
    ) {
        let line = StatusLine {
            status,
            tenant: "TX".to_string(),
            entity: "Grant(42)".to_string(),
            message: "sent".to_string(),
            at: at(hour),
        };

        assert_eq!(line.to_string(), expected);
    }

    #[test]
    fn test_doneは大文字で表示する() {
        assert_eq!(CompletionStatus::Done.to_string(), "DONE");
    }
}
