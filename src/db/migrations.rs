use anyhow::{bail, Context, Result};
use rusqlite::{Connection, Transaction};

const CURRENT_SCHEMA_VERSION: i32 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id               TEXT PRIMARY KEY,
    started_at       TEXT NOT NULL,
    ended_at         TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL CHECK (duration_minutes >= 1),
    date             TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);

CREATE TABLE IF NOT EXISTS daily_logs (
    id      TEXT PRIMARY KEY,
    date    TEXT NOT NULL,
    content TEXT NOT NULL,
    gap     TEXT
);

CREATE INDEX IF NOT EXISTS idx_daily_logs_date ON daily_logs(date);

CREATE TABLE IF NOT EXISTS reports (
    id                  TEXT PRIMARY KEY,
    user_name           TEXT NOT NULL,
    week_start          TEXT NOT NULL,
    total_hours         REAL NOT NULL,
    planned_progress    TEXT NOT NULL,
    actual_progress     TEXT NOT NULL,
    completion_rate     INTEGER NOT NULL CHECK (completion_rate BETWEEN 0 AND 100),
    gap_reason          TEXT NOT NULL,
    unfamiliar_concepts TEXT NOT NULL,
    attempted_solutions TEXT NOT NULL,
    next_week_strategy  TEXT NOT NULL,
    needs_support       INTEGER NOT NULL,
    support_detail      TEXT NOT NULL,
    ai_feedback         TEXT,
    created_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at);
";

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    while version < CURRENT_SCHEMA_VERSION {
        let next_version = version + 1;
        apply_migration(&tx, next_version)
            .with_context(|| format!("migration to version {next_version} failed"))?;
        version = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> Result<()> {
    match version {
        1 => {
            tx.execute_batch(SCHEMA_V1)
                .context("failed to execute schema v1")?;
            Ok(())
        }
        _ => bail!("unknown migration target version: {version}"),
    }
}
