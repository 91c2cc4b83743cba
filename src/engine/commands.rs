//! Commands issued by the presentation layer

use tracing::{debug, info};

use super::{due_at, QueueEngine, MAX_DURATION_SECONDS};
use crate::{
    duration,
    error::QueueError,
    state::{GlobalRunState, TimerEntry, TimerId, TimerStatus},
};

/// What `start` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A paused entry continues with its remaining time
    Resumed(TimerId),
    /// The first queued entry began counting down
    Started(TimerId),
    /// An alarm is already sounding; the queue will advance once it expires
    Rearmed(TimerId),
}

/// What `stop` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The active entry went back to Queued with its full duration
    Reset(TimerId),
    /// Nothing to reset, but auto-advance was switched off
    Halted,
}

impl QueueEngine {
    /// Append a new queued timer
    pub fn add_timer(
        &mut self,
        label: impl Into<String>,
        duration_seconds: u64,
        alarm_enabled: bool,
    ) -> Result<TimerEntry, QueueError> {
        if duration_seconds == 0 || duration_seconds > MAX_DURATION_SECONDS {
            return Err(QueueError::InvalidDuration);
        }

        let entry = TimerEntry::new(label, duration_seconds, alarm_enabled);
        info!(
            "Added timer {:?} ({})",
            entry.label(),
            duration::format_hms(duration_seconds)
        );
        self.state.entries.push(entry.clone());
        self.commit();
        Ok(entry)
    }

    /// Parse `duration_text` and append a new queued timer
    pub fn add_timer_text(
        &mut self,
        label: impl Into<String>,
        duration_text: &str,
        alarm_enabled: bool,
    ) -> Result<TimerEntry, QueueError> {
        let seconds = duration::parse(duration_text)?;
        self.add_timer(label, seconds, alarm_enabled)
    }

    /// Remove an entry that is not Running or AlarmActive
    pub fn remove_timer(&mut self, id: &TimerId) -> Result<TimerEntry, QueueError> {
        let index = self
            .state
            .position(id)
            .ok_or_else(|| QueueError::NotFound(id.clone()))?;

        match self.state.entries[index].status() {
            TimerStatus::Running { .. } => {
                return Err(QueueError::invalid_op(
                    "cannot remove the running timer; stop it first",
                ))
            }
            TimerStatus::AlarmActive { .. } => {
                return Err(QueueError::invalid_op(
                    "cannot remove a timer while its alarm is active",
                ))
            }
            TimerStatus::Queued | TimerStatus::Paused => {}
        }

        let removed = self.state.entries.remove(index);
        info!("Removed timer {:?}", removed.label());
        self.commit();
        Ok(removed)
    }

    /// Empty the queue without sounding any alarm; returns how many entries went
    pub fn clear_all(&mut self) -> usize {
        let cleared = self.state.entries.len();
        self.state.entries.clear();
        self.state.global_run_state = GlobalRunState::Idle;
        info!("Cleared {} timers", cleared);
        self.commit();
        cleared
    }

    /// Resume the paused entry, or start the first queued one
    pub fn start(&mut self) -> Result<StartOutcome, QueueError> {
        let now = self.clock.now();

        if let Some(index) = self.state.active_index() {
            let entry = &self.state.entries[index];
            return match (entry.status(), self.state.global_run_state) {
                (TimerStatus::AlarmActive { .. }, GlobalRunState::Idle) => {
                    let id = entry.id().clone();
                    self.state.global_run_state = GlobalRunState::Running;
                    info!("Queue will continue after the current alarm");
                    self.commit();
                    Ok(StartOutcome::Rearmed(id))
                }
                (TimerStatus::AlarmActive { .. }, GlobalRunState::Running) => {
                    Err(QueueError::invalid_op("queue is already running"))
                }
                _ => Err(QueueError::invalid_op("a timer is already running")),
            };
        }

        let outcome = if let Some(index) = self.state.paused_index() {
            let entry = &mut self.state.entries[index];
            entry.status = TimerStatus::Running {
                completes_at: due_at(now, entry.remaining()),
            };
            info!(
                "Resumed timer {:?} with {}s left",
                entry.label(),
                entry.remaining_seconds()
            );
            StartOutcome::Resumed(entry.id().clone())
        } else if let Some(index) = self.state.first_queued_index() {
            let entry = &mut self.state.entries[index];
            entry.set_remaining(entry.duration_seconds());
            entry.status = TimerStatus::Running {
                completes_at: due_at(now, entry.remaining()),
            };
            info!("Started timer {:?}", entry.label());
            StartOutcome::Started(entry.id().clone())
        } else if self.state.is_empty() {
            return Err(QueueError::invalid_op("no timers in queue"));
        } else {
            return Err(QueueError::invalid_op("no queued timer to start"));
        };

        self.state.global_run_state = GlobalRunState::Running;
        self.commit();
        Ok(outcome)
    }

    /// Freeze the running entry at its current remaining time
    pub fn pause(&mut self) -> Result<TimerEntry, QueueError> {
        let now = self.clock.now();
        let index = self
            .state
            .active_index()
            .ok_or_else(|| QueueError::invalid_op("no timer is running"))?;

        let entry = &mut self.state.entries[index];
        match entry.status() {
            TimerStatus::Running { .. } => {
                let remaining = entry.remaining_span_at(now);
                entry.set_remaining_span(remaining);
                entry.status = TimerStatus::Paused;
            }
            TimerStatus::AlarmActive { .. } => {
                return Err(QueueError::invalid_op("cannot pause a timer whose alarm is active"))
            }
            TimerStatus::Queued | TimerStatus::Paused => {
                return Err(QueueError::invalid_op("no timer is running"))
            }
        }

        info!(
            "Paused timer {:?} with {}s left",
            entry.label(),
            entry.remaining_seconds()
        );
        let paused = entry.clone();
        self.commit();
        Ok(paused)
    }

    /// Reset the running entry (or, with none running, the paused one) and stop auto-advance
    pub fn stop(&mut self) -> Result<StopOutcome, QueueError> {
        let target = match self.state.active_index() {
            Some(index) => match self.state.entries[index].status() {
                TimerStatus::Running { .. } => Some(index),
                // An alarm has nothing left to reset
                TimerStatus::AlarmActive { .. } | TimerStatus::Queued | TimerStatus::Paused => None,
            },
            None => self.state.paused_index(),
        };

        let outcome = match (target, self.state.global_run_state) {
            (Some(index), _) => {
                let entry = &mut self.state.entries[index];
                entry.reset();
                info!("Stopped timer {:?}", entry.label());
                StopOutcome::Reset(entry.id().clone())
            }
            (None, GlobalRunState::Running) => {
                debug!("Stop with no countdown in progress; disabling auto-advance");
                StopOutcome::Halted
            }
            (None, GlobalRunState::Idle) => {
                return Err(QueueError::invalid_op("nothing to stop"));
            }
        };

        self.state.global_run_state = GlobalRunState::Idle;
        self.commit();
        Ok(outcome)
    }
}
