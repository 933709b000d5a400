//! # 契約
//!
//! 満了通知の対象となる契約と、その表示に必要な関連エンティティを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 備考 |
//! |---|------------|------|
//! | [`Contract`] | 契約 | `project_contracts` の 1 行 |
//! | [`Program`] | 資金プログラム | 契約の財源種別（fund source type） |
//! | [`Organization`] | 契約先組織 | 正式名称と通称を持つ |
//! | [`ContractType`] | 契約種別 | 未設定の契約は種別 1 として扱う |

use chrono::NaiveDate;

use crate::tenant::{Client, ClientId};

define_int_id! {
    /// 契約 ID
    pub struct ContractId;
}

define_int_id! {
    /// 組織 ID
    pub struct OrganizationId;
}

define_int_id! {
    /// 資金プログラム ID
    pub struct ProgramId;
}

define_int_id! {
    /// 契約種別 ID
    pub struct ContractTypeId;
}

/// 満了通知の対象から除外する契約ステータス
///
/// 締結前（Pending）と完了済みの契約には通知しない。
pub const EXCLUDED_CONTRACT_STATUSES: [&str; 3] =
    ["Pending Contract", "Pending Amendment", "Completed"];

/// 契約種別が未設定の場合に使用する既定の種別 ID
pub const DEFAULT_CONTRACT_TYPE_ID: i32 = 1;

/// 契約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub id:               ContractId,
    pub organization_id:  OrganizationId,
    pub client_id:        ClientId,
    pub expiration_date:  NaiveDate,
    pub contract_year:    i32,
    pub program_id:       ProgramId,
    pub contract_type_id: ContractTypeId,
}

impl Contract {
    /// 指定日から `days` 日後に満了するかを判定する
    pub fn expires_in(&self, today: NaiveDate, days: u32) -> bool {
        today
            .checked_add_days(chrono::Days::new(u64::from(days)))
            .is_some_and(|target| target == self.expiration_date)
    }
}

/// 資金プログラム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub id:          ProgramId,
    pub name:        String,
    pub common_name: String,
}

/// 契約先組織
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id:          OrganizationId,
    pub legal_name:  String,
    pub common_name: String,
}

impl Organization {
    /// 通知本文に表示する組織名（`正式名称 (通称)`）
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.legal_name, self.common_name)
    }
}

/// 契約種別
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractType {
    pub id:   ContractTypeId,
    pub name: String,
}

/// 満了通知 1 件分に必要な契約と関連エンティティ一式
#[derive(Debug, Clone)]
pub struct ContractDetails {
    pub contract:      Contract,
    pub program:       Program,
    pub organization:  Organization,
    pub client:        Client,
    pub contract_type: ContractType,
}

impl ContractDetails {
    /// 通知本文・完了通知に表示する契約名（`種別名(契約 ID)`）
    pub fn display_name(&self) -> String {
        format!("{}({})", self.contract_type.name, self.contract.id)
    }
}
