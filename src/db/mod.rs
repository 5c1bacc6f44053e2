use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection};
use tokio::sync::oneshot;

mod migrations;

use crate::models::{DailyLog, Session, WeeklyReport};
use migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

fn to_u32(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("value {value} out of range"))
}

/// All local persistence runs on one dedicated worker thread that owns the
/// SQLite connection; callers submit closures over an mpsc channel and
/// await the reply on a oneshot. This keeps the async side free of
/// blocking I/O and makes every table single-writer.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("studybuddy-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    pub async fn insert_session(&self, session: &Session) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, started_at, ended_at, duration_minutes, date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.started_at.to_rfc3339(),
                    record.ended_at.to_rfc3339(),
                    i64::from(record.duration_minutes),
                    record.date,
                ],
            )
            .with_context(|| "failed to insert session")?;
            Ok(())
        })
        .await
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at, duration_minutes, date
                 FROM sessions
                 ORDER BY started_at ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(Session {
                    id: row.get(0)?,
                    started_at: parse_datetime(&row.get::<_, String>(1)?)?,
                    ended_at: parse_datetime(&row.get::<_, String>(2)?)?,
                    duration_minutes: to_u32(row.get::<_, i64>(3)?)?,
                    date: row.get(4)?,
                });
            }

            Ok(sessions)
        })
        .await
    }

    pub async fn insert_daily_log(&self, log: &DailyLog) -> Result<()> {
        let record = log.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO daily_logs (id, date, content, gap)
                 VALUES (?1, ?2, ?3, ?4)",
                params![record.id, record.date, record.content, record.gap],
            )
            .with_context(|| "failed to insert daily log")?;
            Ok(())
        })
        .await
    }

    pub async fn list_daily_logs(&self) -> Result<Vec<DailyLog>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, date, content, gap
                 FROM daily_logs
                 ORDER BY date ASC, rowid ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut logs = Vec::new();
            while let Some(row) = rows.next()? {
                logs.push(DailyLog {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    content: row.get(2)?,
                    gap: row.get(3)?,
                });
            }

            Ok(logs)
        })
        .await
    }

    /// Drops logs from before the given week start. Called once at startup
    /// so prior-week entries are never carried into a new reporting cycle.
    pub async fn delete_daily_logs_before(&self, week_start: &str) -> Result<usize> {
        let week_start = week_start.to_string();
        self.execute(move |conn| {
            let deleted = conn
                .execute("DELETE FROM daily_logs WHERE date < ?1", params![week_start])
                .with_context(|| "failed to purge stale daily logs")?;
            Ok(deleted)
        })
        .await
    }

    pub async fn clear_daily_logs(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM daily_logs", [])
                .with_context(|| "failed to clear daily logs")?;
            Ok(())
        })
        .await
    }

    pub async fn insert_report(&self, report: &WeeklyReport) -> Result<()> {
        let record = report.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO reports (
                     id, user_name, week_start, total_hours, planned_progress,
                     actual_progress, completion_rate, gap_reason,
                     unfamiliar_concepts, attempted_solutions, next_week_strategy,
                     needs_support, support_detail, ai_feedback, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    record.id,
                    record.user_name,
                    record.week_start,
                    record.total_hours,
                    record.planned_progress,
                    record.actual_progress,
                    i64::from(record.completion_rate),
                    record.gap_reason,
                    record.unfamiliar_concepts,
                    record.attempted_solutions,
                    record.next_week_strategy,
                    record.needs_support,
                    record.support_detail,
                    record.ai_feedback,
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert weekly report")?;
            Ok(())
        })
        .await
    }

    /// Reports in most-recent-first order; the first entry is the
    /// authoritative source for the current completion rate.
    pub async fn list_reports(&self) -> Result<Vec<WeeklyReport>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_name, week_start, total_hours, planned_progress,
                        actual_progress, completion_rate, gap_reason,
                        unfamiliar_concepts, attempted_solutions, next_week_strategy,
                        needs_support, support_detail, ai_feedback, created_at
                 FROM reports
                 ORDER BY created_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut reports = Vec::new();
            while let Some(row) = rows.next()? {
                reports.push(WeeklyReport {
                    id: row.get(0)?,
                    user_name: row.get(1)?,
                    week_start: row.get(2)?,
                    total_hours: row.get(3)?,
                    planned_progress: row.get(4)?,
                    actual_progress: row.get(5)?,
                    completion_rate: to_u32(row.get::<_, i64>(6)?)?.min(100) as u8,
                    gap_reason: row.get(7)?,
                    unfamiliar_concepts: row.get(8)?,
                    attempted_solutions: row.get(9)?,
                    next_week_strategy: row.get(10)?,
                    needs_support: row.get(11)?,
                    support_detail: row.get(12)?,
                    ai_feedback: row.get(13)?,
                    created_at: parse_datetime(&row.get::<_, String>(14)?)?,
                });
            }

            Ok(reports)
        })
        .await
    }
}
