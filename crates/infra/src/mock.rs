//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモックリポジトリ・送信実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! remindflow-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! すべてのモックは `Clone` で内部状態を共有するため、ユースケースに渡した後も
//! テスト側から記録内容を検証できる。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use remindflow_domain::{
    contract::{
        Contract,
        ContractType,
        ContractTypeId,
        Organization,
        OrganizationId,
        Program,
        ProgramId,
    },
    email_settings::SmtpProfile,
    notification::{EmailMessage, EmailTemplate, NotificationError},
    recipient::RecipientScope,
    report::{ReminderId, ReportReminder, ReportTemplate, ReportTemplateId},
    tenant::{Client, ClientId, TenantCode},
};

use crate::{
    db::{TransactionManager, TriggerControl, TxContext, with_trigger_suspended},
    error::InfraError,
    notification::{CompletionNotifier, NotificationSender},
    repository::{
        ContractRepository,
        EmailSettingsRecord,
        EmailSettingsRepository,
        EmailTemplateRepository,
        RecipientRepository,
        ReportRepository,
        SystemEmail,
        SystemEmailRepository,
        TenantRepository,
    },
};

// ===== MockTenantRepository =====

#[derive(Clone, Default)]
pub struct MockTenantRepository {
    clients:        Arc<Mutex<Vec<Client>>>,
    support_emails: Arc<Mutex<HashMap<String, String>>>,
}

impl MockTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_client(&self, client: Client) {
        self.clients.lock().unwrap().push(client);
    }

    pub fn set_support_email(&self, tenant: &TenantCode, email: &str) {
        self.support_emails
            .lock()
            .unwrap()
            .insert(tenant.as_str().to_string(), email.to_string());
    }
}

#[async_trait]
impl TenantRepository for MockTenantRepository {
    async fn find_active_client(&self, id: ClientId) -> Result<Option<Client>, InfraError> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_support_email(
        &self,
        tenant: &TenantCode,
    ) -> Result<Option<String>, InfraError> {
        Ok(self
            .support_emails
            .lock()
            .unwrap()
            .get(tenant.as_str())
            .cloned())
    }
}

// ===== MockEmailSettingsRepository =====

#[derive(Clone, Default)]
pub struct MockEmailSettingsRepository {
    settings: Arc<Mutex<HashMap<String, EmailSettingsRecord>>>,
    lookups:  Arc<Mutex<u32>>,
}

impl MockEmailSettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_settings(&self, tenant: &TenantCode, record: EmailSettingsRecord) {
        self.settings
            .lock()
            .unwrap()
            .insert(tenant.as_str().to_string(), record);
    }

    /// `find_active` の呼び出し回数
    pub fn lookups(&self) -> u32 {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl EmailSettingsRepository for MockEmailSettingsRepository {
    async fn find_active(
        &self,
        tenant: &TenantCode,
    ) -> Result<Option<EmailSettingsRecord>, InfraError> {
        *self.lookups.lock().unwrap() += 1;
        Ok(self.settings.lock().unwrap().get(tenant.as_str()).cloned())
    }
}

// ===== MockEmailTemplateRepository =====

#[derive(Clone, Default)]
pub struct MockEmailTemplateRepository {
    templates: Arc<Mutex<Vec<(String, String, EmailTemplate)>>>,
}

impl MockEmailTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_template(&self, tenant: &TenantCode, notification_type: &str, template: EmailTemplate) {
        self.templates.lock().unwrap().push((
            tenant.as_str().to_string(),
            notification_type.to_string(),
            template,
        ));
    }
}

#[async_trait]
impl EmailTemplateRepository for MockEmailTemplateRepository {
    async fn find_by_notification_type(
        &self,
        tenant: &TenantCode,
        notification_type: &str,
    ) -> Result<Option<EmailTemplate>, InfraError> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .find(|(t, n, _)| t == tenant.as_str() && n == notification_type)
            .map(|(_, _, template)| template.clone()))
    }
}

// ===== MockRecipientRepository =====

#[derive(Clone, Default)]
pub struct MockRecipientRepository {
    entries: Arc<Mutex<Vec<(String, RecipientScope, Vec<String>)>>>,
    fail:    Arc<Mutex<bool>>,
}

impl MockRecipientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recipients(&self, role: &str, scope: RecipientScope, emails: &[&str]) {
        self.entries.lock().unwrap().push((
            role.to_string(),
            scope,
            emails.iter().map(|e| e.to_string()).collect(),
        ));
    }

    /// 以降の検索をすべて失敗させる
    pub fn fail_lookups(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl RecipientRepository for MockRecipientRepository {
    async fn find_emails(
        &self,
        role: &str,
        scope: &RecipientScope,
    ) -> Result<Vec<String>, InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::unexpected("recipient lookup failed"));
        }

        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, s, _)| r == role && s == scope)
            .flat_map(|(_, _, emails)| emails.iter().cloned())
            .collect())
    }
}

// ===== MockContractRepository =====

#[derive(Clone, Default)]
pub struct MockContractRepository {
    contracts:      Arc<Mutex<Vec<Contract>>>,
    programs:       Arc<Mutex<Vec<Program>>>,
    organizations:  Arc<Mutex<Vec<Organization>>>,
    contract_types: Arc<Mutex<Vec<ContractType>>>,
}

impl MockContractRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_contract(&self, contract: Contract) {
        self.contracts.lock().unwrap().push(contract);
    }

    pub fn add_program(&self, program: Program) {
        self.programs.lock().unwrap().push(program);
    }

    pub fn add_organization(&self, organization: Organization) {
        self.organizations.lock().unwrap().push(organization);
    }

    pub fn add_contract_type(&self, contract_type: ContractType) {
        self.contract_types.lock().unwrap().push(contract_type);
    }
}

#[async_trait]
impl ContractRepository for MockContractRepository {
    async fn find_expiring_on(
        &self,
        expiration_date: NaiveDate,
    ) -> Result<Vec<Contract>, InfraError> {
        Ok(self
            .contracts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.expiration_date == expiration_date)
            .cloned()
            .collect())
    }

    async fn find_program(&self, id: ProgramId) -> Result<Option<Program>, InfraError> {
        Ok(self
            .programs
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, InfraError> {
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn find_contract_type(
        &self,
        id: ContractTypeId,
    ) -> Result<Option<ContractType>, InfraError> {
        Ok(self
            .contract_types
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }
}

// ===== MockReportRepository =====

#[derive(Clone, Default)]
pub struct MockReportRepository {
    reminders: Arc<Mutex<Vec<ReportReminder>>>,
    templates: Arc<Mutex<Vec<ReportTemplate>>>,
}

impl MockReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reminder(&self, reminder: ReportReminder) {
        self.reminders.lock().unwrap().push(reminder);
    }

    pub fn add_template(&self, template: ReportTemplate) {
        self.templates.lock().unwrap().push(template);
    }
}

#[async_trait]
impl ReportRepository for MockReportRepository {
    async fn find_active_reminder(
        &self,
        id: ReminderId,
    ) -> Result<Option<ReportReminder>, InfraError> {
        Ok(self
            .reminders
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_active_reminders_by_template(
        &self,
        template_id: ReportTemplateId,
    ) -> Result<Vec<ReportReminder>, InfraError> {
        Ok(self
            .reminders
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.report_template_id == template_id)
            .cloned()
            .collect())
    }

    async fn find_active_template(
        &self,
        id: ReportTemplateId,
    ) -> Result<Option<ReportTemplate>, InfraError> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }
}

// ===== MockTransactionManager =====

/// モック TxContext を返す TransactionManager
#[derive(Clone, Default)]
pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}

// ===== MockTriggerControl =====

/// トリガー操作を記録するモック
#[derive(Clone, Default)]
pub struct MockTriggerControl {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockTriggerControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録された操作（`"disable"` / `"insert"` / `"enable"`）
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// トリガーが現在有効かどうか
    pub fn is_enabled(&self) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| matches!(**c, "disable" | "enable"))
            .is_none_or(|c| *c == "enable")
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TriggerControl for MockTriggerControl {
    async fn disable(&self, _tx: &mut TxContext) -> Result<(), InfraError> {
        self.record("disable");
        Ok(())
    }

    async fn enable(&self, _tx: &mut TxContext) -> Result<(), InfraError> {
        self.record("enable");
        Ok(())
    }
}

// ===== MockSystemEmailRepository =====

/// 監査レコードをメモリに保存するモック
///
/// PostgreSQL 実装と同じく、挿入を [`with_trigger_suspended`] で囲む。
#[derive(Clone, Default)]
pub struct MockSystemEmailRepository {
    records: Arc<Mutex<Vec<SystemEmail>>>,
    trigger: MockTriggerControl,
    fail:    Arc<Mutex<bool>>,
}

impl MockSystemEmailRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の挿入をすべて失敗させる
    pub fn fail_inserts(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn records(&self) -> Vec<SystemEmail> {
        self.records.lock().unwrap().clone()
    }

    pub fn trigger(&self) -> &MockTriggerControl {
        &self.trigger
    }
}

#[async_trait]
impl SystemEmailRepository for MockSystemEmailRepository {
    async fn insert(&self, tx: &mut TxContext, email: &SystemEmail) -> Result<(), InfraError> {
        let trigger = self.trigger.clone();
        let records = self.records.clone();
        let fail = *self.fail.lock().unwrap();
        let email = email.clone();

        with_trigger_suspended(&self.trigger, tx, move |_tx| {
            Box::pin(async move {
                trigger.record("insert");
                if fail {
                    return Err(InfraError::unexpected("system_emails insert failed"));
                }
                records.lock().unwrap().push(email);
                Ok(())
            })
        })
        .await
    }
}

// ===== MockNotificationSender =====

/// 送信内容を記録するモック送信
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:  Arc<Mutex<Vec<EmailMessage>>>,
    hosts: Arc<Mutex<Vec<String>>>,
    fail:  Arc<Mutex<Option<String>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の送信をすべて失敗させる
    pub fn fail_with(&self, message: &str) {
        *self.fail.lock().unwrap() = Some(message.to_string());
    }

    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 送信に使われた SMTP ホスト
    pub fn hosts(&self) -> Vec<String> {
        self.hosts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(
        &self,
        email: &EmailMessage,
        profile: &SmtpProfile,
    ) -> Result<(), NotificationError> {
        if let Some(message) = self.fail.lock().unwrap().clone() {
            return Err(NotificationError::SendFailed(message));
        }
        self.sent.lock().unwrap().push(email.clone());
        self.hosts.lock().unwrap().push(profile.host.clone());
        Ok(())
    }
}

// ===== MockCompletionNotifier =====

/// ステータス行を記録するモック
#[derive(Clone, Default)]
pub struct MockCompletionNotifier {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionNotifier for MockCompletionNotifier {
    async fn notify(&self, status_line: &str) {
        self.lines.lock().unwrap().push(status_line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_record() -> SystemEmail {
        SystemEmail {
            recipient:   "a@example.com".to_string(),
            subject:     "件名".to_string(),
            body:        "本文".to_string(),
            sent:        true,
            tenant_code: TenantCode::new("TX").unwrap(),
            active:      true,
            created_at:  Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_監査モックは挿入をトリガー停止で囲む() {
        let repo = MockSystemEmailRepository::new();
        let mut tx = MockTransactionManager.begin().await.unwrap();

        repo.insert(&mut tx, &make_record()).await.unwrap();

        assert_eq!(repo.trigger().calls(), vec!["disable", "insert", "enable"]);
        assert_eq!(repo.records().len(), 1);
    }

    #[tokio::test]
    async fn test_監査モックの挿入失敗でもトリガーは有効に戻る() {
        let repo = MockSystemEmailRepository::new();
        repo.fail_inserts();
        let mut tx = TxContext::mock();

        let result = repo.insert(&mut tx, &make_record()).await;

        assert!(result.is_err());
        assert!(repo.records().is_empty());
        assert!(repo.trigger().is_enabled());
    }
}
