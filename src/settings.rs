use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::timer::{DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    /// Display name shown on the group roster. Empty until the one-time
    /// name gate has been passed.
    user_name: String,
    /// Remote ledger endpoint (publish/fetch). Sync is a no-op while unset.
    ledger_url: String,
    /// Analysis collaborator endpoint. Feedback is skipped while unset.
    analysis_url: String,
    work_secs: u32,
    break_secs: u32,
    /// The active weekly plan text; cleared when a report is submitted.
    weekly_plan: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            ledger_url: String::new(),
            analysis_url: String::new(),
            work_secs: DEFAULT_WORK_SECS,
            break_secs: DEFAULT_BREAK_SECS,
            weekly_plan: String::new(),
        }
    }
}

/// JSON-backed settings, written through on every update. A corrupt or
/// missing file falls back to defaults instead of failing startup.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn user_name(&self) -> Option<String> {
        let name = self.read().user_name;
        if name.trim().is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Rejects blank names at the edit boundary; they never reach the
    /// data model or the remote ledger.
    pub fn set_user_name(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            bail!("display name must not be empty");
        }
        self.update(|data| data.user_name = name.to_string())
    }

    pub fn ledger_url(&self) -> Option<String> {
        non_empty(self.read().ledger_url)
    }

    pub fn set_ledger_url(&self, url: &str) -> Result<()> {
        self.update(|data| data.ledger_url = url.trim().to_string())
    }

    pub fn analysis_url(&self) -> Option<String> {
        non_empty(self.read().analysis_url)
    }

    pub fn set_analysis_url(&self, url: &str) -> Result<()> {
        self.update(|data| data.analysis_url = url.trim().to_string())
    }

    pub fn work_secs(&self) -> u32 {
        self.read().work_secs
    }

    pub fn break_secs(&self) -> u32 {
        self.read().break_secs
    }

    pub fn weekly_plan(&self) -> String {
        self.read().weekly_plan
    }

    pub fn set_weekly_plan(&self, plan: &str) -> Result<()> {
        self.update(|data| data.weekly_plan = plan.to_string())
    }

    pub fn clear_weekly_plan(&self) -> Result<()> {
        self.update(|data| data.weekly_plan.clear())
    }

    fn read(&self) -> UserSettings {
        self.data.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update(&self, apply: impl FnOnce(&mut UserSettings)) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(|e| e.into_inner());
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert!(store.set_user_name("   ").is_err());
        assert_eq!(store.user_name(), None);
        store.set_user_name("  Ada ").unwrap();
        assert_eq!(store.user_name().as_deref(), Some("Ada"));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.work_secs(), DEFAULT_WORK_SECS);
        assert_eq!(store.break_secs(), DEFAULT_BREAK_SECS);
        assert_eq!(store.ledger_url(), None);
    }

    #[test]
    fn weekly_plan_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        {
            let store = SettingsStore::new(path.clone()).unwrap();
            store.set_weekly_plan("finish unit 4").unwrap();
        }
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.weekly_plan(), "finish unit 4");
        store.clear_weekly_plan().unwrap();
        assert_eq!(store.weekly_plan(), "");
    }
}
