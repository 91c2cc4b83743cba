//! Ordered queue of timer entries plus the global run flag

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Settings, TimerEntry, TimerId, TimerStatus};

/// Whether the queue auto-advances after an alarm expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlobalRunState {
    #[default]
    Idle,
    Running,
}

/// The full queue: execution order is insertion order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueState {
    pub entries: Vec<TimerEntry>,
    pub global_run_state: GlobalRunState,
    pub settings: Settings,
}

/// What the restart policy changed while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Demotion {
    /// Running or AlarmActive entries that came back Paused
    pub paused: usize,
    /// Surplus Paused entries sent back to Queued with their full duration
    pub requeued: usize,
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn position(&self, id: &TimerId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn get(&self, id: &TimerId) -> Option<&TimerEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Index of the Running or AlarmActive entry
    pub fn active_index(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.status().is_active())
    }

    pub fn paused_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e.status(), TimerStatus::Paused))
    }

    pub fn first_queued_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e.status(), TimerStatus::Queued))
    }

    /// Number of Running or AlarmActive entries; never more than one
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status().is_active()).count()
    }

    /// Write the live remaining time of a Running entry into its stored field
    pub(crate) fn refresh_remaining(&mut self, now: DateTime<Utc>) {
        for entry in &mut self.entries {
            if let TimerStatus::Running { .. } = entry.status() {
                let remaining = entry.remaining_span_at(now);
                entry.set_remaining_span(remaining);
            }
        }
    }

    /// Restart policy: nothing keeps counting across a process gap.
    /// Running and AlarmActive entries become Paused with their stored remaining time.
    pub fn demote_active(&mut self) -> Demotion {
        let preferred = self.active_index();
        let mut paused = 0;
        for entry in &mut self.entries {
            match entry.status() {
                TimerStatus::Running { .. } => {
                    entry.status = TimerStatus::Paused;
                    paused += 1;
                }
                TimerStatus::AlarmActive { .. } => {
                    entry.set_remaining(0);
                    entry.status = TimerStatus::Paused;
                    paused += 1;
                }
                TimerStatus::Queued | TimerStatus::Paused => {}
            }
        }
        self.settle_demotion(preferred, paused)
    }

    /// Keep one Paused entry, `preferred` if given, else the first one.
    /// Every other Paused entry goes back to Queued. After `paused` demotions
    /// the queue is Idle until the next Start.
    pub(crate) fn settle_demotion(&mut self, preferred: Option<usize>, paused: usize) -> Demotion {
        let keep = preferred.or_else(|| self.paused_index());
        let mut requeued = 0;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.status() == TimerStatus::Paused && Some(index) != keep {
                entry.reset();
                requeued += 1;
            }
        }
        if paused > 0 {
            self.global_run_state = GlobalRunState::Idle;
        }
        Demotion { paused, requeued }
    }
}
