//! # RemindFlow Scheduler
//!
//! cron 等の外部スケジューラーから起動される通知ジョブ。
//!
//! ## 役割
//!
//! - **契約満了通知**: N 日後に満了する契約を抽出し、契約閲覧権限を持つユーザーに送信
//! - **レポートリマインダー**: リマインダー（またはテンプレート配下の全リマインダー）を送信
//! - **監査記録**: 送信試行ごとに `system_emails` へ 1 行記録
//! - **完了通知**: 1 件ごとにステータス行を出力
//!
//! ```text
//! ┌──────────┐     ┌─────────────────────┐     ┌──────────────┐
//! │   cron   │────▶│ remindflow-scheduler│────▶│  PostgreSQL  │
//! └──────────┘     └─────────────────────┘     └──────────────┘
//!                             │
//!                             ▼
//!                    ┌─────────────────┐
//!                    │ テナントの SMTP  │
//!                    └─────────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `DEPLOY_ENV` | No | `local` / `qa` / `staging` / `production`（デフォルト: `local`） |
//! | `APP_BASE_DOMAIN` | No | リンク生成に使うベースドメイン（デフォルト: `localhost`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `noop`（デフォルト: `noop`） |
//! | `NOTIFICATION_DEFAULT_SENDER` | No | テナントの送信者が未設定の場合の送信者 |
//! | `NOTIFICATION_OBSERVER_ADDRESS` | No | テストモード時に追加する監視用アドレス |
//! | `SMTP_SECURITY` | No | `starttls` / `plain`（デフォルト: `starttls`） |
//! | `SMTP_TIMEOUT_SECS` | No | 1 通あたりの送信タイムアウト秒（デフォルト: 30） |
//! | `DB_STATEMENT_TIMEOUT_SECS` | No | クエリのタイムアウト秒（デフォルト: 30） |
//! | `STATUS_UTC_OFFSET` | No | 日付判定とステータス行の UTC オフセット（デフォルト: `+00:00`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 30 日後に満了する契約を通知
//! cargo run -p remindflow-scheduler -- contracts --days 30
//!
//! # リマインダー 12 を 1 月分として送信
//! cargo run -p remindflow-scheduler -- reminder --id 12 --month January
//!
//! # マイグレーションのみ実行
//! cargo run -p remindflow-scheduler -- migrate
//! ```

use std::sync::Arc;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use remindflow_domain::{
    clock::{Clock, SystemClock},
    report::{ReminderId, ReportTemplateId},
};
use remindflow_infra::{
    db::{self, PgTransactionManager},
    notification::{
        LogCompletionNotifier,
        NoopNotificationSender,
        NotificationSender,
        SmtpNotificationSender,
        SmtpSecurity,
    },
    repository::{
        PostgresContractRepository,
        PostgresEmailSettingsRepository,
        PostgresEmailTemplateRepository,
        PostgresRecipientRepository,
        PostgresReportRepository,
        PostgresSystemEmailRepository,
        PostgresTenantRepository,
    },
};
use remindflow_scheduler::{
    config::{NotificationConfig, SchedulerConfig},
    usecase::notification::{
        AuditRecorder,
        DispatcherDeps,
        DispatcherSettings,
        EmailSettingsResolver,
        NotificationDispatcher,
        RecipientResolver,
        Trigger,
    },
};
use remindflow_shared::observability::{TracingConfig, init_tracing};
use sqlx::PgPool;
use tracing::Instrument as _;

#[derive(Parser)]
#[command(name = "remindflow-scheduler")]
#[command(about = "契約満了・レポートリマインダーの通知ジョブ")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 起動前にマイグレーションを適用する
    #[arg(long, global = true)]
    migrate: bool,
}

#[derive(Subcommand)]
enum Command {
    /// N 日後に満了する契約を通知する
    Contracts {
        #[arg(long)]
        days: u32,
    },
    /// レポートリマインダーを 1 件送信する
    Reminder {
        #[arg(long)]
        id:    i32,
        /// 対象月のラベル（例: January）
        #[arg(long)]
        month: String,
    },
    /// レポートテンプレート配下の全リマインダーを送信する
    Template {
        #[arg(long)]
        id:    i32,
        #[arg(long)]
        month: String,
    },
    /// マイグレーションのみ適用して終了する
    Migrate,
}

impl Command {
    fn trigger(self) -> Option<Trigger> {
        match self {
            Self::Contracts { days } => Some(Trigger::ContractExpiration { days }),
            Self::Reminder { id, month } => Some(Trigger::ReportReminder {
                reminder_id: ReminderId::new(id),
                month,
            }),
            Self::Template { id, month } => Some(Trigger::ReportTemplate {
                template_id: ReportTemplateId::new(id),
                month,
            }),
            Self::Migrate => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let tracing_config = TracingConfig::from_env("remindflow-scheduler");
    let span = init_tracing(&tracing_config);

    run(cli).instrument(span).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SchedulerConfig::from_env().context("設定の読み込みに失敗しました")?;
    tracing::info!(
        deployment = %config.deployment,
        backend = %config.notification.backend,
        "通知ジョブを起動します"
    );

    let pool = db::create_pool(&config.database_url, config.db_statement_timeout)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let migrate_only = matches!(cli.command, Command::Migrate);
    if cli.migrate || migrate_only {
        db::run_migrations(&pool)
            .await
            .context("マイグレーションに失敗しました")?;
        tracing::info!("マイグレーションを適用しました");
    }

    let Some(trigger) = cli.command.trigger() else {
        return Ok(());
    };

    let dispatcher = build_dispatcher(&config, pool)?;
    let summary = dispatcher.dispatch(&trigger).await?;

    tracing::info!(
        processed = summary.processed,
        emails_sent = summary.emails_sent,
        skipped = summary.skipped,
        "通知ジョブが終了しました"
    );

    if let Some(failure) = summary.failure {
        bail!("通知ジョブが失敗しました: {failure}");
    }
    Ok(())
}

/// 依存コンポーネントを組み立てる
fn build_dispatcher(
    config: &SchedulerConfig,
    pool: PgPool,
) -> anyhow::Result<NotificationDispatcher> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tenants = Arc::new(PostgresTenantRepository::new(pool.clone()));

    let deps = DispatcherDeps {
        contracts: Arc::new(PostgresContractRepository::new(pool.clone())),
        reports: Arc::new(PostgresReportRepository::new(pool.clone())),
        tenants: tenants.clone(),
        templates: Arc::new(PostgresEmailTemplateRepository::new(pool.clone())),
        recipients: RecipientResolver::new(Arc::new(PostgresRecipientRepository::new(
            pool.clone(),
        ))),
        email_settings: EmailSettingsResolver::new(
            Arc::new(PostgresEmailSettingsRepository::new(pool.clone())),
            tenants,
            config.notification.default_sender.clone(),
            config.notification.observer_address.clone(),
        ),
        sender: build_sender(&config.notification)?,
        audit: AuditRecorder::new(
            Arc::new(PgTransactionManager::new(pool)),
            Arc::new(PostgresSystemEmailRepository::new()),
            clock.clone(),
        ),
        notifier: Arc::new(LogCompletionNotifier),
        clock,
    };

    let settings = DispatcherSettings {
        deployment:   config.deployment,
        base_domain:  config.base_domain.clone(),
        utc_offset:   config.status_utc_offset,
        send_timeout: config.notification.smtp_timeout,
    };

    Ok(NotificationDispatcher::new(deps, settings))
}

/// `NOTIFICATION_BACKEND` に応じた送信実装を選ぶ
fn build_sender(config: &NotificationConfig) -> anyhow::Result<Arc<dyn NotificationSender>> {
    match config.backend.as_str() {
        "smtp" => {
            let security = SmtpSecurity::parse(&config.smtp_security);
            tracing::info!(?security, "SMTP 送信を使用します");
            Ok(Arc::new(SmtpNotificationSender::new(
                security,
                config.smtp_timeout,
            )))
        }
        "noop" => {
            tracing::info!("Noop 送信を使用します（メールは送信されません）");
            Ok(Arc::new(NoopNotificationSender))
        }
        other => bail!("未知の NOTIFICATION_BACKEND です: {other}"),
    }
}
