//! Timer queue engine
//!
//! Owns the live queue and is the only code that mutates timer entries.
//! Every command and every tick that changes state ends by saving the full
//! snapshot through the store. Save failures are logged and remembered for
//! the next snapshot, never rolled back.
//!
//! All countdown math is done against wall-clock instants taken from the
//! engine's [`Clock`]; late or skipped ticks therefore never cause drift.

mod commands;
mod tick;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::{
    error::QueueError,
    services::AlarmNotifier,
    state::{QueueSnapshot, QueueState},
    store::{LoadIssue, QueueStore},
    utils::Clock,
};

pub use commands::{StartOutcome, StopOutcome};
pub use tick::TickReport;

/// How long an entry stays in AlarmActive before it is removed
pub const ALARM_WINDOW_SECONDS: i64 = 5;

/// Longest accepted timer, roughly a century
pub const MAX_DURATION_SECONDS: u64 = 100 * 365 * 24 * 3600;

pub struct QueueEngine {
    state: QueueState,
    clock: Arc<dyn Clock>,
    store: Arc<dyn QueueStore>,
    notifier: Arc<dyn AlarmNotifier>,
    last_persistence_error: Option<String>,
}

impl QueueEngine {
    /// Restore the queue from `store` and take ownership of it.
    ///
    /// Load problems are logged and leave the engine with an empty queue.
    pub fn load(
        store: Arc<dyn QueueStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn AlarmNotifier>,
    ) -> Self {
        let outcome = store.load();
        let mut last_persistence_error = None;

        match outcome.issue {
            None => info!(
                "Restored {} timers ({} paused after restart, {} dropped)",
                outcome.state.len(),
                outcome.demoted,
                outcome.skipped
            ),
            Some(LoadIssue::Missing) => info!("No saved queue found, starting empty"),
            Some(LoadIssue::Unreadable(e)) | Some(LoadIssue::Malformed(e)) => {
                warn!("Starting with an empty queue: {}", e);
                last_persistence_error = Some(e.to_string());
            }
        }

        if outcome.requeued > 0 {
            warn!(
                "Snapshot held more than one paused timer; {} moved back to queued",
                outcome.requeued
            );
        }
        let window = outcome.state.settings.alarm_duration_seconds;
        if window != ALARM_WINDOW_SECONDS as u64 {
            warn!(
                "Ignoring alarm_duration_seconds = {}; alarms always last {}s",
                window, ALARM_WINDOW_SECONDS
            );
        }

        Self {
            state: outcome.state,
            clock,
            store,
            notifier,
            last_persistence_error,
        }
    }

    /// Read-only view with live remaining time and progress
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot::capture(
            &self.state,
            self.clock.now(),
            self.last_persistence_error.clone(),
        )
    }

    pub fn state(&self) -> &QueueState {
        &self.state
    }

    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    /// Save the current queue, e.g. on shutdown
    pub fn persist(&mut self) -> Result<(), QueueError> {
        let now = self.clock.now();
        self.state.refresh_remaining(now);
        let result = self.store.save(&self.state);
        match &result {
            Ok(()) => self.last_persistence_error = None,
            Err(e) => {
                warn!("Failed to save queue: {}", e);
                self.last_persistence_error = Some(e.to_string());
            }
        }
        result
    }

    /// Persist after a committed mutation; failures are already logged
    fn commit(&mut self) {
        let _ = self.persist();
    }
}

/// `now + remaining`, saturating at the far end of chrono's range
fn due_at(now: DateTime<Utc>, remaining: Duration) -> DateTime<Utc> {
    now.checked_add_signed(remaining).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
