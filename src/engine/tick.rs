//! Time advance: completion, alarm expiry and queue auto-advance

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::{due_at, QueueEngine, ALARM_WINDOW_SECONDS};
use crate::state::{GlobalRunState, TimerId, TimerStatus};

/// Transitions performed by one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Entry that reached zero and entered its alarm window
    pub completed: Option<TimerId>,
    /// Whether the notifier was called for `completed`
    pub alarm_fired: bool,
    /// Entry removed after its alarm window ran out
    pub expired: Option<TimerId>,
    /// Entry auto-started after `expired`
    pub started: Option<TimerId>,
    /// The last entry expired and the queue went idle
    pub queue_finished: bool,
}

impl TickReport {
    pub fn changed(&self) -> bool {
        self.completed.is_some() || self.expired.is_some()
    }
}

impl QueueEngine {
    /// Advance the active entry to the current wall-clock time
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let mut report = TickReport::default();

        // Countdown reaching zero
        if let Some(index) = self.state.active_index() {
            let entry = &mut self.state.entries[index];
            match entry.status() {
                TimerStatus::Running { completes_at } => {
                    let remaining = entry.remaining_span_at(now);
                    entry.set_remaining_span(remaining);
                    if completes_at <= now {
                        entry.status = TimerStatus::AlarmActive { started_at: now };
                        info!("Timer complete: {:?}", entry.label());
                        if entry.alarm_enabled() {
                            self.notifier.notify(entry);
                            report.alarm_fired = true;
                        }
                        report.completed = Some(entry.id().clone());
                    }
                }
                TimerStatus::AlarmActive { .. } | TimerStatus::Queued | TimerStatus::Paused => {}
            }
        }

        // Alarm window running out
        if let Some(index) = self.state.active_index() {
            if let TimerStatus::AlarmActive { started_at } = self.state.entries[index].status() {
                if now - started_at >= Duration::seconds(ALARM_WINDOW_SECONDS) {
                    let removed = self.state.entries.remove(index);
                    debug!("Removed completed timer {:?}", removed.label());
                    report.expired = Some(removed.id().clone());
                    self.advance(now, &mut report);
                }
            }
        }

        if report.changed() {
            self.commit();
        }
        report
    }

    /// Start the next queued entry if the queue is running
    fn advance(&mut self, now: DateTime<Utc>, report: &mut TickReport) {
        match self.state.global_run_state {
            GlobalRunState::Idle => {}
            GlobalRunState::Running => match self.state.first_queued_index() {
                Some(next) => {
                    let entry = &mut self.state.entries[next];
                    entry.set_remaining(entry.duration_seconds());
                    entry.status = TimerStatus::Running {
                        completes_at: due_at(now, entry.remaining()),
                    };
                    info!("Started next timer {:?}", entry.label());
                    report.started = Some(entry.id().clone());
                }
                None => {
                    self.state.global_run_state = GlobalRunState::Idle;
                    info!("Timer queue complete");
                    report.queue_finished = true;
                }
            },
        }
    }
}
