//! # ContractRepository
//!
//! 契約とその付随情報（プログラム・組織・契約種別）の取得を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **満了日の完全一致**: 「N 日後に満了する契約」は `expiration_date = 対象日`
//!   で抽出する。対象日の計算はユースケース層が行う
//! - **除外ステータス**: 締結前・変更中・完了の契約は通知対象外
//! - **種別の既定値**: 契約種別が未設定の契約は既定種別として扱う

use async_trait::async_trait;
use chrono::NaiveDate;
use remindflow_domain::{
    contract::{
        Contract,
        ContractId,
        ContractType,
        ContractTypeId,
        DEFAULT_CONTRACT_TYPE_ID,
        EXCLUDED_CONTRACT_STATUSES,
        Organization,
        OrganizationId,
        Program,
        ProgramId,
    },
    tenant::ClientId,
};
use sqlx::PgPool;

use crate::error::InfraError;

/// 契約リポジトリトレイト
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// 指定日に満了する通知対象の契約を取得
    async fn find_expiring_on(&self, expiration_date: NaiveDate)
    -> Result<Vec<Contract>, InfraError>;

    /// 有効なプログラム（資金源種別）を取得
    async fn find_program(&self, id: ProgramId) -> Result<Option<Program>, InfraError>;

    /// 組織を取得
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, InfraError>;

    /// 契約種別を取得
    async fn find_contract_type(
        &self,
        id: ContractTypeId,
    ) -> Result<Option<ContractType>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct ContractRow {
    id:                  i32,
    organization_id:     i32,
    client_id:           i32,
    expiration_date:     NaiveDate,
    contract_year:       i32,
    fund_source_type_id: i32,
    contract_type_id:    Option<i32>,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Self {
            id:               ContractId::new(row.id),
            organization_id:  OrganizationId::new(row.organization_id),
            client_id:        ClientId::new(row.client_id),
            expiration_date:  row.expiration_date,
            contract_year:    row.contract_year,
            program_id:       ProgramId::new(row.fund_source_type_id),
            contract_type_id: ContractTypeId::new(
                row.contract_type_id.unwrap_or(DEFAULT_CONTRACT_TYPE_ID),
            ),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProgramRow {
    id:          i32,
    name:        String,
    common_name: String,
}

#[derive(sqlx::FromRow)]
struct OrganizationRow {
    id:          i32,
    legal_name:  String,
    common_name: String,
}

#[derive(sqlx::FromRow)]
struct ContractTypeRow {
    id:   i32,
    name: String,
}

/// PostgreSQL 実装の ContractRepository
#[derive(Debug, Clone)]
pub struct PostgresContractRepository {
    pool: PgPool,
}

impl PostgresContractRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContractRepository for PostgresContractRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%expiration_date))]
    async fn find_expiring_on(
        &self,
        expiration_date: NaiveDate,
    ) -> Result<Vec<Contract>, InfraError> {
        let rows: Vec<ContractRow> = sqlx::query_as(
            r#"
            SELECT
                id, organization_id, client_id, expiration_date,
                contract_year, fund_source_type_id, contract_type_id
            FROM project_contracts
            WHERE expiration_date = $1
              AND NOT (COALESCE(status, '') = ANY($2))
            ORDER BY id
            "#,
        )
        .bind(expiration_date)
        .bind(&EXCLUDED_CONTRACT_STATUSES[..])
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Contract::from).collect())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_program(&self, id: ProgramId) -> Result<Option<Program>, InfraError> {
        let row: Option<ProgramRow> = sqlx::query_as(
            r#"
            SELECT id, name, common_name
            FROM fund_source_types
            WHERE id = $1 AND active
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Program {
            id:          ProgramId::new(r.id),
            name:        r.name,
            common_name: r.common_name,
        }))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, InfraError> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, legal_name, common_name
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Organization {
            id:          OrganizationId::new(r.id),
            legal_name:  r.legal_name,
            common_name: r.common_name,
        }))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_contract_type(
        &self,
        id: ContractTypeId,
    ) -> Result<Option<ContractType>, InfraError> {
        let row: Option<ContractTypeRow> = sqlx::query_as(
            r#"
            SELECT id, name
            FROM contract_types
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ContractType {
            id:   ContractTypeId::new(r.id),
            name: r.name,
        }))
    }
}
