//! # 通知ディスパッチャー
//!
//! トリガーごとに対象エンティティを列挙し、1 件ずつ
//! 解決 → レンダリング → 送信 → 監査記録 → 完了通知 を行う。
//!
//! ## 設計方針
//!
//! - **単一のディスパッチャー**: 契約満了とレポートリマインダーはタグ付きの
//!   [`Trigger`] / [`NotificationEvent`] で区別し、同じ処理経路を通す
//! - **逐次処理**: 1 件の処理が終わってから次に進む
//! - **エラー方針**: 受信者検索は fail-soft（空ならスキップ）、テナント設定や
//!   エンティティの欠落は `NotFound` で即時中断、送信・記録の失敗は結果として扱い
//!   残りのバッチを打ち切る
//!
//! ## エンティティごとの状態遷移
//!
//! ```text
//! Pending → Resolved → Rendered → Sent ───────┐
//!                              └→ SendFailed ─┴→ Audited → Reported
//! Resolved → SkippedNoRecipients ──────────────────────────→ Reported
//! Pending → SkippedTemplateStatus | SkippedMonth ───────────→ Reported
//! ```

use std::{fmt, ops::ControlFlow, sync::Arc, time::Duration};

use chrono::{Days, FixedOffset};
use remindflow_domain::{
    clock::Clock,
    contract::{Contract, ContractDetails},
    deployment::DeploymentEnvironment,
    email_settings::SmtpProfile,
    notification::{EmailMessage, NotificationError, NotificationEvent, SendResult, role_name},
    recipient::RecipientScope,
    report::{ReminderId, ReportReminder, ReportTemplate, ReportTemplateId},
    tenant::{Client, ClientId, TenantCode},
};
use remindflow_infra::{
    notification::{CompletionNotifier, NotificationSender},
    repository::{ContractRepository, EmailTemplateRepository, ReportRepository, TenantRepository},
};
use remindflow_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

use super::{
    AuditRecorder,
    EmailSettingsResolver,
    RecipientResolver,
    SendAttempt,
    TemplateRenderer,
    status_line::{CompletionStatus, StatusLine},
};
use crate::error::DispatchError;

/// ステータス行でテナントが特定できない場合の表記
const NO_TENANT: &str = "-";

/// ジョブの起動単位
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// `days` 日後に満了する契約の通知
    ContractExpiration { days: u32 },
    /// 1 件のレポートリマインダーの送信
    ReportReminder { reminder_id: ReminderId, month: String },
    /// レポートテンプレートに属する全リマインダーの送信
    ReportTemplate {
        template_id: ReportTemplateId,
        month:       String,
    },
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractExpiration { days } => write!(f, "contracts(+{days}d)"),
            Self::ReportReminder { reminder_id, month } => {
                write!(f, "reminder:{reminder_id}({month})")
            }
            Self::ReportTemplate { template_id, month } => {
                write!(f, "template:{template_id}({month})")
            }
        }
    }
}

/// 1 エンティティの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 送信と記録に成功
    Sent { recipients: usize },
    /// 送信に失敗（記録は行った）
    SendFailed(String),
    /// 送信は成功したが記録に失敗
    AuditFailed { recipients: usize, message: String },
    /// 受信者がいないため送信しなかった
    SkippedNoRecipients,
    /// レポートテンプレートのステータスが対象外のため送信しなかった
    SkippedTemplateStatus(String),
    /// 対象月ではないため送信しなかった
    SkippedMonth(String),
}

/// バッチ全体の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// 処理したエンティティ数（スキップを含む）
    pub processed:   usize,
    /// 送信に成功したメールの受信者数
    pub emails_sent: usize,
    /// スキップしたエンティティ数
    pub skipped:     usize,
    /// バッチを打ち切った失敗のメッセージ
    pub failure:     Option<String>,
    /// 単一テナントのバッチならそのテナント
    pub tenant:      Option<TenantCode>,
}

impl DispatchSummary {
    fn for_tenant(tenant: TenantCode) -> Self {
        Self {
            tenant: Some(tenant),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// 実行全体のステータス行に載せる結果
    fn result_message(&self) -> String {
        match &self.failure {
            Some(message) => message.clone(),
            None => format!("{} emails sent", self.emails_sent),
        }
    }

    /// 結果を集計し、バッチを続けるかどうかを返す
    fn record(&mut self, outcome: DeliveryOutcome) -> ControlFlow<()> {
        self.processed += 1;
        match outcome {
            DeliveryOutcome::Sent { recipients } => {
                self.emails_sent += recipients;
                ControlFlow::Continue(())
            }
            DeliveryOutcome::SkippedNoRecipients
            | DeliveryOutcome::SkippedTemplateStatus(_)
            | DeliveryOutcome::SkippedMonth(_) => {
                self.skipped += 1;
                ControlFlow::Continue(())
            }
            DeliveryOutcome::AuditFailed {
                recipients,
                message,
            } => {
                self.emails_sent += recipients;
                self.failure = Some(message);
                ControlFlow::Break(())
            }
            DeliveryOutcome::SendFailed(message) => {
                self.failure = Some(message);
                ControlFlow::Break(())
            }
        }
    }
}

/// ディスパッチャーの依存コンポーネント
pub struct DispatcherDeps {
    pub contracts:      Arc<dyn ContractRepository>,
    pub reports:        Arc<dyn ReportRepository>,
    pub tenants:        Arc<dyn TenantRepository>,
    pub templates:      Arc<dyn EmailTemplateRepository>,
    pub recipients:     RecipientResolver,
    pub email_settings: EmailSettingsResolver,
    pub sender:         Arc<dyn NotificationSender>,
    pub audit:          AuditRecorder,
    pub notifier:       Arc<dyn CompletionNotifier>,
    pub clock:          Arc<dyn Clock>,
}

/// ディスパッチャーの動作設定
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// デプロイ環境（リンクのドメインと対象テンプレートのステータスを決める）
    pub deployment:   DeploymentEnvironment,
    /// アプリケーションのベースドメイン
    pub base_domain:  String,
    /// 「今日」の判定とステータス行の時刻に使う UTC オフセット
    pub utc_offset:   FixedOffset,
    /// 1 通あたりの送信タイムアウト
    pub send_timeout: Duration,
}

/// 通知ディスパッチャー
pub struct NotificationDispatcher {
    deps:     DispatcherDeps,
    settings: DispatcherSettings,
    renderer: TemplateRenderer,
}

impl NotificationDispatcher {
    pub fn new(deps: DispatcherDeps, settings: DispatcherSettings) -> Self {
        let renderer = TemplateRenderer::new(settings.deployment, settings.base_domain.clone());
        Self {
            deps,
            settings,
            renderer,
        }
    }

    /// トリガーを実行する
    ///
    /// 送信・記録の失敗は [`DispatchSummary::failure`] に入る。
    /// `Err` になるのはテナント設定やエンティティの欠落、DB エラーでジョブが中断した場合のみ。
    ///
    /// 1 件以上処理した場合は、エンティティごとの行の後に実行全体の行を 1 行出力する。
    #[tracing::instrument(skip_all, fields(trigger = %trigger))]
    pub async fn dispatch(&self, trigger: &Trigger) -> Result<DispatchSummary, DispatchError> {
        let result = match trigger {
            Trigger::ContractExpiration { days } => self.dispatch_contracts(*days).await,
            Trigger::ReportReminder { reminder_id, month } => {
                self.dispatch_reminder(*reminder_id, month).await
            }
            Trigger::ReportTemplate { template_id, month } => {
                self.dispatch_template(*template_id, month).await
            }
        };

        match &result {
            Ok(summary) => {
                let (outcome, status) = if summary.is_success() {
                    (event::result::SUCCESS, CompletionStatus::Success)
                } else {
                    (event::result::FAILURE, CompletionStatus::Failed)
                };
                log_business_event!(
                    event.category = event::category::JOB,
                    event.action = event::action::JOB_COMPLETED,
                    event.result = outcome,
                    job.processed = summary.processed,
                    job.emails_sent = summary.emails_sent,
                    job.skipped = summary.skipped,
                    "通知ジョブ完了"
                );
                // 対象なしの場合は DONE 行を出力済み
                if summary.processed > 0 {
                    let tenant = summary.tenant.as_ref().map_or(NO_TENANT, TenantCode::as_str);
                    self.report(
                        status,
                        tenant,
                        &trigger.to_string(),
                        &summary.result_message(),
                    )
                    .await;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "通知ジョブを中断");
                self.report(
                    CompletionStatus::Failed,
                    NO_TENANT,
                    &trigger.to_string(),
                    &e.to_string(),
                )
                .await;
            }
        }

        result
    }

    async fn dispatch_contracts(&self, days: u32) -> Result<DispatchSummary, DispatchError> {
        let today = self.deps.clock.today_in(self.settings.utc_offset);
        let target = today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                DispatchError::InvalidConfiguration(format!("満了日を計算できません: +{days} 日"))
            })?;

        let contracts: Vec<Contract> = self
            .deps
            .contracts
            .find_expiring_on(target)
            .await?
            .into_iter()
            .filter(|c| c.expires_in(today, days))
            .collect();

        let mut summary = DispatchSummary::default();
        if contracts.is_empty() {
            self.report(
                CompletionStatus::Done,
                NO_TENANT,
                &format!("contracts expiring {target}"),
                "no contracts to process",
            )
            .await;
            return Ok(summary);
        }

        for contract in contracts {
            let details = self.load_contract_details(contract).await?;
            let scope = RecipientScope::Organization(details.organization.id);
            let notification = NotificationEvent::ContractExpiration { details, days };

            let outcome = self
                .deliver(&notification, role_name::VIEW_CONTRACTS, &scope)
                .await?;
            if summary.record(outcome).is_break() {
                break;
            }
        }

        Ok(summary)
    }

    async fn dispatch_reminder(
        &self,
        reminder_id: ReminderId,
        month: &str,
    ) -> Result<DispatchSummary, DispatchError> {
        let reminder = self
            .deps
            .reports
            .find_active_reminder(reminder_id)
            .await?
            .ok_or_else(|| DispatchError::not_found("report_reminder", reminder_id))?;
        let template = self.load_template(reminder.report_template_id).await?;
        let client = self.load_client(template.client_id).await?;

        let mut summary = DispatchSummary::for_tenant(client.code.clone());
        let outcome = self
            .deliver_reminder(reminder, &template, &client, month)
            .await?;
        // 1 件のみなので打ち切り判定は不要
        let _ = summary.record(outcome);

        Ok(summary)
    }

    async fn dispatch_template(
        &self,
        template_id: ReportTemplateId,
        month: &str,
    ) -> Result<DispatchSummary, DispatchError> {
        let template = self.load_template(template_id).await?;
        let client = self.load_client(template.client_id).await?;
        let reminders = self
            .deps
            .reports
            .find_active_reminders_by_template(template_id)
            .await?;

        let mut summary = DispatchSummary::for_tenant(client.code.clone());
        if reminders.is_empty() {
            self.report(
                CompletionStatus::Done,
                client.code.as_str(),
                &template.display_name,
                "no reminders to process",
            )
            .await;
            return Ok(summary);
        }

        for reminder in reminders {
            let outcome = self
                .deliver_reminder(reminder, &template, &client, month)
                .await?;
            if summary.record(outcome).is_break() {
                break;
            }
        }

        Ok(summary)
    }

    async fn deliver_reminder(
        &self,
        reminder: ReportReminder,
        template: &ReportTemplate,
        client: &Client,
        month: &str,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let scheduled = reminder.is_scheduled_for(month);
        let notification = NotificationEvent::ReportReminder {
            reminder,
            template: template.clone(),
            client: client.clone(),
            month: month.to_string(),
        };

        let expected = self.settings.deployment.reportable_template_status();
        if !template.has_status(expected) {
            let message = format!(
                "template status '{}' is not '{expected}'",
                template.status
            );
            self.report_skipped(&notification, &message).await;
            return Ok(DeliveryOutcome::SkippedTemplateStatus(message));
        }

        if !scheduled {
            let message = format!("month '{month}' is not scheduled");
            self.report_skipped(&notification, &message).await;
            return Ok(DeliveryOutcome::SkippedMonth(message));
        }

        let scope = RecipientScope::ReportTemplate(template.id);
        self.deliver(&notification, role_name::SUBMIT_REPORTING, &scope)
            .await
    }

    /// 1 エンティティ分の通知を送る
    async fn deliver(
        &self,
        notification: &NotificationEvent,
        role: &str,
        scope: &RecipientScope,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let tenant = notification.tenant_code();

        // Resolved
        let recipients = self.deps.recipients.resolve(role, scope).await;
        if recipients.is_empty() {
            self.report_skipped(notification, "no recipients").await;
            return Ok(DeliveryOutcome::SkippedNoRecipients);
        }

        let template = self
            .deps
            .templates
            .find_by_notification_type(tenant, notification.notification_type())
            .await?
            .ok_or_else(|| {
                DispatchError::not_found(
                    "email_template",
                    format!("{tenant}/{}", notification.notification_type()),
                )
            })?;

        // Rendered
        let rendered = self.renderer.render(notification, &template);
        let settings = self.deps.email_settings.resolve(tenant).await?;
        let message = EmailMessage {
            to:        settings.route(&recipients),
            from:      settings.from.clone(),
            sender:    settings.profile.sender.clone(),
            subject:   rendered.subject,
            html_body: rendered.body,
            priority:  notification.priority(),
        };

        // Sent | SendFailed
        let send_result = self.send(notification, &message, &settings.profile).await;

        // Audited
        let audit_result = self
            .deps
            .audit
            .record(SendAttempt {
                recipient:   message.to.clone(),
                subject:     message.subject.clone(),
                body:        message.html_body.clone(),
                sent:        send_result.sent,
                tenant_code: tenant.clone(),
            })
            .await;

        let (outcome, status, result_message) = if !send_result.sent {
            (
                DeliveryOutcome::SendFailed(send_result.message.clone()),
                CompletionStatus::Failed,
                send_result.message,
            )
        } else if !audit_result.sent {
            (
                DeliveryOutcome::AuditFailed {
                    recipients: recipients.len(),
                    message:    audit_result.message.clone(),
                },
                CompletionStatus::Failed,
                audit_result.message,
            )
        } else {
            (
                DeliveryOutcome::Sent {
                    recipients: recipients.len(),
                },
                CompletionStatus::Success,
                send_result.message,
            )
        };

        // Reported
        self.report(
            status,
            tenant.as_str(),
            &notification.display_name(),
            &result_message,
        )
        .await;

        Ok(outcome)
    }

    /// タイムアウト付きで送信し、結果を値として返す
    async fn send(
        &self,
        notification: &NotificationEvent,
        message: &EmailMessage,
        profile: &SmtpProfile,
    ) -> SendResult {
        let timeout = self.settings.send_timeout;
        let result =
            match tokio::time::timeout(timeout, self.deps.sender.send_email(message, profile))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(NotificationError::Timeout(timeout.as_secs())),
            };

        match result {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.tenant_code = %notification.tenant_code(),
                    event.entity_type = notification.entity_type(),
                    event.entity_id = notification.entity_id(),
                    event.result = event::result::SUCCESS,
                    notification.kind = notification.notification_type(),
                    notification.recipient = %message.to,
                    "通知メール送信成功"
                );
                SendResult::success(format!(
                    "email sent to {} recipient(s)",
                    message.recipients().count()
                ))
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.tenant_code = %notification.tenant_code(),
                    event.entity_type = notification.entity_type(),
                    event.entity_id = notification.entity_id(),
                    event.result = event::result::FAILURE,
                    notification.kind = notification.notification_type(),
                    notification.recipient = %message.to,
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::MAIL_TRANSPORT,
                    error = %e,
                    "通知メール送信失敗"
                );
                SendResult::failure(e.to_string())
            }
        }
    }

    async fn report_skipped(&self, notification: &NotificationEvent, reason: &str) {
        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_SKIPPED,
            event.tenant_code = %notification.tenant_code(),
            event.entity_type = notification.entity_type(),
            event.entity_id = notification.entity_id(),
            event.result = event::result::SKIPPED,
            reason,
            "通知をスキップ"
        );
        self.report(
            CompletionStatus::Skipped,
            notification.tenant_code().as_str(),
            &notification.display_name(),
            reason,
        )
        .await;
    }

    async fn report(&self, status: CompletionStatus, tenant: &str, entity: &str, message: &str) {
        let line = StatusLine {
            status,
            tenant: tenant.to_string(),
            entity: entity.to_string(),
            message: message.to_string(),
            at: self.deps.clock.now_in(self.settings.utc_offset),
        };
        self.deps.notifier.notify(&line.to_string()).await;
    }

    async fn load_contract_details(
        &self,
        contract: Contract,
    ) -> Result<ContractDetails, DispatchError> {
        let repo = &self.deps.contracts;
        let program = repo
            .find_program(contract.program_id)
            .await?
            .ok_or_else(|| DispatchError::not_found("program", contract.program_id))?;
        let organization = repo
            .find_organization(contract.organization_id)
            .await?
            .ok_or_else(|| DispatchError::not_found("organization", contract.organization_id))?;
        let contract_type = repo
            .find_contract_type(contract.contract_type_id)
            .await?
            .ok_or_else(|| DispatchError::not_found("contract_type", contract.contract_type_id))?;
        let client = self.load_client(contract.client_id).await?;

        Ok(ContractDetails {
            contract,
            program,
            organization,
            client,
            contract_type,
        })
    }

    async fn load_template(&self, id: ReportTemplateId) -> Result<ReportTemplate, DispatchError> {
        self.deps
            .reports
            .find_active_template(id)
            .await?
            .ok_or_else(|| DispatchError::not_found("report_template", id))
    }

    async fn load_client(&self, id: ClientId) -> Result<Client, DispatchError> {
        self.deps
            .tenants
            .find_active_client(id)
            .await?
            .ok_or_else(|| DispatchError::not_found("client", id))
    }
}
