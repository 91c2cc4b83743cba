//! Main application state management

use std::{
    sync::{Mutex, MutexGuard},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{QueueSnapshot, TimerEntry, TimerId};
use crate::{
    duration::format_hms,
    engine::{QueueEngine, StartOutcome, StopOutcome, TickReport},
    error::QueueError,
};

/// Shared application state: the one place the engine is reached through.
///
/// Commands, ticks, snapshot reads and store writes all take the same lock,
/// so a reader never sees a half-applied transition.
pub struct AppState {
    engine: Mutex<QueueEngine>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(engine: QueueEngine, port: u16, host: String) -> Self {
        Self {
            engine: Mutex::new(engine),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// The engine never panics mid-transition, so a poisoned lock still guards a consistent queue
    fn engine(&self) -> MutexGuard<'_, QueueEngine> {
        self.engine.lock().unwrap_or_else(|poisoned| {
            warn!("Queue lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Run a command under the lock and record it as the last action when it succeeds
    fn command<T>(
        &self,
        action: &str,
        f: impl FnOnce(&mut QueueEngine) -> Result<T, QueueError>,
    ) -> Result<(T, QueueSnapshot), QueueError> {
        let mut engine = self.engine();
        let value = f(&mut *engine)?;
        let snapshot = engine.snapshot();
        drop(engine);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
        Ok((value, snapshot))
    }

    /// Queue a timer; without an explicit alarm flag the stored default applies
    pub fn add_timer(
        &self,
        label: &str,
        duration_text: &str,
        alarm_enabled: Option<bool>,
    ) -> Result<(TimerEntry, QueueSnapshot), QueueError> {
        self.command("add", |engine| {
            let alarm_enabled =
                alarm_enabled.unwrap_or(engine.state().settings.default_alarm_enabled);
            engine.add_timer_text(label, duration_text, alarm_enabled)
        })
    }

    pub fn remove_timer(&self, id: &TimerId) -> Result<(TimerEntry, QueueSnapshot), QueueError> {
        self.command("remove", |engine| engine.remove_timer(id))
    }

    pub fn start(&self) -> Result<(StartOutcome, QueueSnapshot), QueueError> {
        self.command("start", |engine| engine.start())
    }

    pub fn pause(&self) -> Result<(TimerEntry, QueueSnapshot), QueueError> {
        self.command("pause", |engine| engine.pause())
    }

    pub fn stop(&self) -> Result<(StopOutcome, QueueSnapshot), QueueError> {
        self.command("stop", |engine| engine.stop())
    }

    pub fn clear_all(&self) -> Result<(usize, QueueSnapshot), QueueError> {
        self.command("clear", |engine| Ok(engine.clear_all()))
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.engine().snapshot()
    }

    pub fn tick(&self) -> TickReport {
        self.engine().tick()
    }

    /// Final save on shutdown
    pub fn persist(&self) -> Result<(), QueueError> {
        self.engine().persist()
    }

    /// Server uptime in the same `HH:MM:SS` form as the timer cards
    pub fn get_uptime(&self) -> String {
        format_hms(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }
}
