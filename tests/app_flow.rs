use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use chrono::Utc;
use tokio::sync::{broadcast, Notify};
use uuid::Uuid;

use studybuddy::{
    db::Database,
    models::{DailyLog, Session, WeeklyReport},
    report::{Analyst, ReportDraft, ReportPipeline},
    settings::SettingsStore,
    timer::{Phase, TimerController, TimerEvent},
    week, App,
};

struct OkAnalyst;

impl Analyst for OkAnalyst {
    async fn analyze(&self, report: &WeeklyReport) -> Result<String> {
        Ok(format!("keep going, {}", report.user_name))
    }
}

struct FailingAnalyst;

impl Analyst for FailingAnalyst {
    async fn analyze(&self, _report: &WeeklyReport) -> Result<String> {
        bail!("analysis endpoint unreachable")
    }
}

struct BlockedAnalyst {
    release: Arc<Notify>,
}

impl Analyst for BlockedAnalyst {
    async fn analyze(&self, _report: &WeeklyReport) -> Result<String> {
        self.release.notified().await;
        Ok("slow feedback".into())
    }
}

fn this_week_session(minutes: u32) -> Session {
    let now = Utc::now();
    Session {
        id: Uuid::new_v4().to_string(),
        started_at: now - chrono::Duration::minutes(i64::from(minutes)),
        ended_at: now,
        duration_minutes: minutes,
        date: week::current_week_start(),
    }
}

fn log_for(date: &str, content: &str, gap: Option<&str>) -> DailyLog {
    DailyLog {
        id: Uuid::new_v4().to_string(),
        date: date.into(),
        content: content.into(),
        gap: gap.map(Into::into),
    }
}

async fn pipeline_fixture<A: Analyst>(
    dir: &tempfile::TempDir,
    analyst: A,
) -> (Database, Arc<SettingsStore>, ReportPipeline<A>) {
    let db = Database::new(dir.path().join("test.sqlite3")).unwrap();
    let settings = Arc::new(SettingsStore::new(dir.path().join("settings.json")).unwrap());
    settings.set_user_name("Ada").unwrap();
    let pipeline = ReportPipeline::new(db.clone(), settings.clone(), analyst);
    (db, settings, pipeline)
}

#[tokio::test]
async fn submitting_freezes_logs_and_rotates_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let (db, settings, pipeline) = pipeline_fixture(&dir, OkAnalyst).await;

    db.insert_session(&this_week_session(25)).await.unwrap();
    db.insert_session(&this_week_session(50)).await.unwrap();

    let monday = week::current_week_start();
    db.insert_daily_log(&log_for(&monday, "chapter 3", None))
        .await
        .unwrap();
    db.insert_daily_log(&log_for(&monday, "past exams", Some("slow start")))
        .await
        .unwrap();
    settings.set_weekly_plan("finish unit 4").unwrap();

    let report = pipeline
        .submit(ReportDraft {
            completion_rate: 130, // clamped
            next_week_strategy: "more mornings".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(report.user_name, "Ada");
    assert_eq!(report.week_start, monday);
    assert!((report.total_hours - 1.25).abs() < 1e-9);
    assert_eq!(report.completion_rate, 100);
    assert_eq!(
        report.actual_progress,
        format!("[{monday}] chapter 3\n[{monday}] past exams")
    );
    assert_eq!(report.gap_reason, format!("[{monday}] slow start"));
    assert_eq!(report.ai_feedback.as_deref(), Some("keep going, Ada"));

    // Exactly one report, most recent first, and the cycle rotated:
    // logs and plan cleared, session ledger untouched.
    let reports = db.list_reports().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, report.id);
    assert!(db.list_daily_logs().await.unwrap().is_empty());
    assert_eq!(settings.weekly_plan(), "");
    assert_eq!(db.list_sessions().await.unwrap().len(), 2);
}

#[tokio::test]
async fn failed_analysis_still_stores_exactly_one_report() {
    let dir = tempfile::tempdir().unwrap();
    let (db, _settings, pipeline) = pipeline_fixture(&dir, FailingAnalyst).await;

    let report = pipeline.submit(ReportDraft::default()).await.unwrap();
    assert!(report.ai_feedback.is_none());

    let stored = db.list_reports().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, report.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_submit_while_in_flight_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let release = Arc::new(Notify::new());
    let (db, _settings, pipeline) = pipeline_fixture(
        &dir,
        BlockedAnalyst {
            release: release.clone(),
        },
    )
    .await;
    let pipeline = Arc::new(pipeline);

    let first = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.submit(ReportDraft::default()).await })
    };

    // Let the first submission reach the blocked analysis call.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = pipeline
        .submit(ReportDraft::default())
        .await
        .expect_err("concurrent submit must be rejected");
    assert!(err.to_string().contains("in flight"));

    release.notify_one();
    first.await.unwrap().unwrap();

    assert_eq!(db.list_reports().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn timer_completion_credits_one_fixed_length_session() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("test.sqlite3")).unwrap();
    let (events, mut rx) = broadcast::channel(256);
    let timer = TimerController::new(db.clone(), events, 60, 5);

    timer.toggle().await.unwrap();

    let session = loop {
        match rx.recv().await.unwrap() {
            TimerEvent::SessionCompleted(session) => break session,
            TimerEvent::StateChanged(_) => {}
        }
    };

    assert_eq!(session.duration_minutes, 1);
    assert_eq!(session.date, week::today());

    let snapshot = timer.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Break);
    assert_eq!(snapshot.remaining_secs, 5);
    assert!(!snapshot.active);

    let stored = db.list_sessions().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, session.id);
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_ticks_and_credits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("test.sqlite3")).unwrap();
    let (events, mut rx) = broadcast::channel(256);
    let timer = TimerController::new(db.clone(), events, 60, 5);

    timer.toggle().await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    timer.reset().await.unwrap();

    let after_reset = timer.snapshot().await;
    assert_eq!(after_reset.phase, Phase::Work);
    assert_eq!(after_reset.remaining_secs, 60);
    assert!(!after_reset.active);

    // Long enough that the old ticker would have expired the phase.
    tokio::time::sleep(Duration::from_secs(120)).await;

    let later = timer.snapshot().await;
    assert_eq!(later.remaining_secs, 60);
    assert!(db.list_sessions().await.unwrap().is_empty());

    while let Ok(event) = rx.try_recv() {
        assert!(!matches!(event, TimerEvent::SessionCompleted(_)));
    }
}

#[tokio::test]
async fn app_round_trip_without_remote_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::init(dir.path()).await.unwrap();

    assert!(app.add_daily_log("   ", None).await.is_err());
    app.add_daily_log("reviewed hydraulics", Some("skipped drills"))
        .await
        .unwrap();

    // No name yet: submission is rejected at the edit boundary.
    assert!(app.submit_report(ReportDraft::default()).await.is_err());
    app.settings().set_user_name("Ada").unwrap();

    // No analysis endpoint configured: report stores without feedback.
    let report = app.submit_report(ReportDraft::default()).await.unwrap();
    assert!(report.ai_feedback.is_none());
    assert_eq!(report.actual_progress, format!("[{}] reviewed hydraulics", week::today()));
    assert!(app.daily_logs().await.unwrap().is_empty());

    // No ledger endpoint configured: roster degrades to self only.
    let roster = app.sync_group().await;
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].user_name, "Ada");
    assert_eq!(roster[0].status, "idle");
    assert_eq!(roster[0].completion_rate, report.completion_rate);
    assert_eq!(app.roster().await.len(), 1);
}

#[tokio::test]
async fn prior_week_logs_are_dropped_on_startup() {
    let dir = tempfile::tempdir().unwrap();

    {
        let app = App::init(dir.path()).await.unwrap();
        let db = Database::new(dir.path().join("studybuddy.sqlite3")).unwrap();
        db.insert_daily_log(&log_for("2000-01-03", "ancient history", None))
            .await
            .unwrap();
        db.insert_daily_log(&log_for(&week::today(), "fresh", None))
            .await
            .unwrap();
        drop(app);
    }

    let app = App::init(dir.path()).await.unwrap();
    let logs = app.daily_logs().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].content, "fresh");
}
