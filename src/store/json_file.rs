//! JSON snapshot file with atomic replace
//!
//! Document shape:
//!
//! ```json
//! {
//!   "queue": [
//!     { "id": "…", "label": "Tea", "durationSeconds": 180, "remainingSeconds": 180,
//!       "alarmEnabled": true, "status": "queued" }
//!   ],
//!   "globalRunState": "idle",
//!   "settings": { "default_alarm_enabled": true, "alarm_duration_seconds": 5,
//!                 "flash_on_alarm": true }
//! }
//! ```

use std::{
    collections::HashSet,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{LoadIssue, LoadOutcome, QueueStore};
use crate::{
    error::QueueError,
    state::{GlobalRunState, QueueState, Settings, StatusKind, TimerEntry, TimerId, TimerStatus},
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSnapshot {
    #[serde(default)]
    queue: Vec<PersistedEntry>,
    #[serde(default)]
    global_run_state: GlobalRunState,
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedEntry {
    #[serde(default)]
    id: Option<TimerId>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    duration_seconds: Option<u64>,
    #[serde(default)]
    remaining_seconds: Option<u64>,
    #[serde(default = "default_alarm_enabled")]
    alarm_enabled: bool,
    #[serde(default)]
    status: StatusKind,
}

fn default_alarm_enabled() -> bool {
    true
}

impl From<&TimerEntry> for PersistedEntry {
    fn from(entry: &TimerEntry) -> Self {
        Self {
            id: Some(entry.id().clone()),
            label: entry.label().to_string(),
            duration_seconds: Some(entry.duration_seconds()),
            remaining_seconds: Some(entry.remaining_seconds()),
            alarm_enabled: entry.alarm_enabled(),
            status: entry.status().kind(),
        }
    }
}

impl From<&QueueState> for PersistedSnapshot {
    fn from(state: &QueueState) -> Self {
        Self {
            queue: state.entries.iter().map(PersistedEntry::from).collect(),
            global_run_state: state.global_run_state,
            settings: state.settings,
        }
    }
}

impl PersistedSnapshot {
    /// Validate and rebuild the queue, demoting anything that was counting down.
    /// The first entry that was counting down stays Paused; other Paused entries are requeued.
    fn into_outcome(self) -> LoadOutcome {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.queue.len());
        let mut demoted = 0;
        let mut skipped = 0;
        let mut was_active = None;

        for persisted in self.queue {
            let duration = match persisted.duration_seconds {
                Some(d) if d > 0 => d,
                _ => {
                    warn!(
                        "Dropping stored timer {:?} without a positive duration",
                        persisted.label
                    );
                    skipped += 1;
                    continue;
                }
            };

            let id = match persisted.id {
                Some(id) if seen.insert(id.clone()) => id,
                _ => {
                    let id = TimerId::generate();
                    seen.insert(id.clone());
                    id
                }
            };

            let status = match persisted.status {
                StatusKind::Queued => TimerStatus::Queued,
                StatusKind::Paused => TimerStatus::Paused,
                StatusKind::Running | StatusKind::AlarmActive => {
                    was_active.get_or_insert(entries.len());
                    demoted += 1;
                    TimerStatus::Paused
                }
            };
            let remaining = match persisted.status {
                StatusKind::AlarmActive => 0,
                _ => persisted.remaining_seconds.unwrap_or(duration),
            };

            entries.push(TimerEntry::restore(
                id,
                persisted.label,
                duration,
                remaining,
                persisted.alarm_enabled,
                status,
            ));
        }

        let mut state = QueueState {
            entries,
            global_run_state: self.global_run_state,
            settings: self.settings,
        };
        let demotion = state.settle_demotion(was_active, demoted);
        LoadOutcome::loaded(state, demotion, skipped)
    }
}

/// Snapshot stored as pretty-printed JSON at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn companion_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Move an unparseable snapshot aside so the next save cannot overwrite it
    fn quarantine(&self) {
        let corrupt = self.companion_path(".corrupt");
        match fs::rename(&self.path, &corrupt) {
            Ok(()) => warn!("Moved unreadable snapshot to {}", corrupt.display()),
            Err(e) => warn!(
                "Failed to move unreadable snapshot {} aside: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl QueueStore for JsonFileStore {
    fn load(&self) -> LoadOutcome {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return LoadOutcome::empty(LoadIssue::Missing);
            }
            Err(e) => {
                return LoadOutcome::empty(LoadIssue::Unreadable(QueueError::Persistence(
                    format!("failed to read {}: {}", self.path.display(), e),
                )));
            }
        };

        match serde_json::from_str::<PersistedSnapshot>(&content) {
            Ok(snapshot) => {
                let outcome = snapshot.into_outcome();
                debug!(
                    "Loaded {} timers from {}",
                    outcome.state.len(),
                    self.path.display()
                );
                outcome
            }
            Err(e) => {
                self.quarantine();
                LoadOutcome::empty(LoadIssue::Malformed(QueueError::Persistence(format!(
                    "failed to parse {}: {}",
                    self.path.display(),
                    e
                ))))
            }
        }
    }

    fn save(&self, state: &QueueState) -> Result<(), QueueError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let serialized = serde_json::to_vec_pretty(&PersistedSnapshot::from(state))?;
        let temp_path = self.companion_path(".tmp");

        let write_temp = || -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(&serialized)?;
            file.sync_all()
        };
        if let Err(e) = write_temp() {
            let _ = fs::remove_file(&temp_path);
            return Err(QueueError::Persistence(format!(
                "failed to write {}: {}",
                temp_path.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(QueueError::Persistence(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            )));
        }

        debug!("Saved {} timers to {}", state.len(), self.path.display());
        Ok(())
    }
}
