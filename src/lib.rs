pub mod aggregate;
pub mod db;
pub mod models;
pub mod report;
pub mod settings;
pub mod sync;
pub mod timer;
pub mod utils;
pub mod week;

use std::{path::Path, sync::Arc};

use anyhow::{bail, Result};
use chrono::Utc;
use log::{info, warn};
use tokio::sync::broadcast;
use uuid::Uuid;

use db::Database;
use models::{DailyLog, MemberSummary, Session, WeeklyReport};
use report::{HttpAnalyst, ReportDraft, ReportPipeline};
use settings::SettingsStore;
use sync::{HttpLedger, Reconciler};
use timer::{TimerController, TimerEvent};

/// Initialize logging from the `RUST_LOG` environment, defaulting to info.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// The application core: timer, session ledger, daily logs, weekly
/// reports, and group reconciliation behind one handle. The UI surface
/// (tabs, name gate, settings panel) sits on top of this API.
#[derive(Clone)]
pub struct App {
    db: Database,
    settings: Arc<SettingsStore>,
    timer: TimerController,
    events: broadcast::Sender<TimerEvent>,
    reconciler: Arc<Reconciler<HttpLedger>>,
    pipeline: Arc<ReportPipeline<HttpAnalyst>>,
}

impl App {
    /// Opens (or creates) the data directory, runs migrations, drops
    /// daily logs left over from prior weeks, and wires the components.
    pub async fn init(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let db = Database::new(data_dir.join("studybuddy.sqlite3"))?;
        let settings = Arc::new(SettingsStore::new(data_dir.join("settings.json"))?);

        // Logs from a prior week never carry into the new cycle.
        match db.delete_daily_logs_before(&week::current_week_start()).await {
            Ok(dropped) if dropped > 0 => info!("dropped {dropped} daily logs from prior weeks"),
            Ok(_) => {}
            Err(err) => warn!("failed to purge stale daily logs: {err:#}"),
        }

        let (events, _) = broadcast::channel(64);
        let timer = TimerController::new(
            db.clone(),
            events.clone(),
            settings.work_secs(),
            settings.break_secs(),
        );
        let reconciler = Arc::new(Reconciler::new(HttpLedger::new(settings.clone())));
        let pipeline = Arc::new(ReportPipeline::new(
            db.clone(),
            settings.clone(),
            HttpAnalyst::new(settings.clone()),
        ));

        Ok(Self {
            db,
            settings,
            timer,
            events,
            reconciler,
            pipeline,
        })
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn sessions(&self) -> Result<Vec<Session>> {
        self.db.list_sessions().await
    }

    pub async fn daily_logs(&self) -> Result<Vec<DailyLog>> {
        self.db.list_daily_logs().await
    }

    pub async fn reports(&self) -> Result<Vec<WeeklyReport>> {
        self.db.list_reports().await
    }

    /// Records a daily log for today. Empty content is rejected here and
    /// never reaches the data model.
    pub async fn add_daily_log(&self, content: &str, gap: Option<&str>) -> Result<DailyLog> {
        let content = content.trim();
        if content.is_empty() {
            bail!("daily log content must not be empty");
        }

        let log = DailyLog {
            id: Uuid::new_v4().to_string(),
            date: week::today(),
            content: content.to_string(),
            gap: gap
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
        };
        self.db.insert_daily_log(&log).await?;
        Ok(log)
    }

    /// Total focus hours in the current week, recomputed from the ledger.
    pub async fn current_week_hours(&self) -> Result<f64> {
        let sessions = self.db.list_sessions().await?;
        Ok(aggregate::week_hours(&sessions, &week::current_week_start()))
    }

    /// The freshly computed roster entry for this user. Read failures
    /// degrade to empty collections rather than failing the sync.
    pub async fn self_summary(&self) -> MemberSummary {
        let sessions = self.db.list_sessions().await.unwrap_or_else(|err| {
            warn!("failed to load sessions for summary: {err:#}");
            Vec::new()
        });
        let logs = self.db.list_daily_logs().await.unwrap_or_else(|err| {
            warn!("failed to load daily logs for summary: {err:#}");
            Vec::new()
        });
        let reports = self.db.list_reports().await.unwrap_or_else(|err| {
            warn!("failed to load reports for summary: {err:#}");
            Vec::new()
        });

        let week_start = week::current_week_start();
        let week_log_count = aggregate::week_logs(&logs, &week_start).len();
        let snapshot = self.timer.snapshot().await;

        MemberSummary {
            user_name: self
                .settings
                .user_name()
                .unwrap_or_else(|| "me".to_string()),
            total_hours: aggregate::week_hours(&sessions, &week_start),
            completion_rate: aggregate::roster_completion_rate(&reports, week_log_count),
            status: snapshot.status_label().to_string(),
            last_update: Utc::now().to_rfc3339(),
        }
    }

    /// One publish-then-fetch reconciliation pass; returns the new roster.
    pub async fn sync_group(&self) -> Vec<MemberSummary> {
        let me = self.self_summary().await;
        self.reconciler.sync(me).await
    }

    /// The roster snapshot from the most recent sync.
    pub async fn roster(&self) -> Vec<MemberSummary> {
        self.reconciler.roster().await
    }

    pub async fn submit_report(&self, draft: ReportDraft) -> Result<WeeklyReport> {
        self.pipeline.submit(draft).await
    }

    /// Spawns a background task that re-syncs the roster after every
    /// completed session, so displayed stats never go stale on completion.
    pub fn spawn_auto_sync(&self) -> tokio::task::JoinHandle<()> {
        let app = self.clone();
        let mut events = self.events.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(TimerEvent::SessionCompleted(_)) => {
                        let _ = app.sync_group().await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
