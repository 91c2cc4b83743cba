//! Timer entry structure and per-entry status

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::MAX_DURATION_SECONDS;

/// Stable identifier assigned when a timer is created
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an entry. Timestamps only exist in the status they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Queued,
    /// Counting down; due to reach zero at `completes_at`
    Running { completes_at: DateTime<Utc> },
    Paused,
    /// Reached zero at `started_at`; removed once the alarm window has passed
    AlarmActive { started_at: DateTime<Utc> },
}

impl TimerStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Queued => StatusKind::Queued,
            Self::Running { .. } => StatusKind::Running,
            Self::Paused => StatusKind::Paused,
            Self::AlarmActive { .. } => StatusKind::AlarmActive,
        }
    }

    /// Running or AlarmActive; at most one entry in a queue may be active
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running { .. } | Self::AlarmActive { .. })
    }
}

/// Timestamp-free status tag, as persisted and reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
    #[default]
    Queued,
    Running,
    Paused,
    AlarmActive,
}

/// A single labeled countdown in the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEntry {
    id: TimerId,
    label: String,
    duration_seconds: u64,
    alarm_enabled: bool,
    pub(crate) status: TimerStatus,
    /// Exact remaining span; only rounded when reported in whole seconds
    remaining: Duration,
}

impl TimerEntry {
    /// Create a queued entry with the full duration remaining
    pub fn new(label: impl Into<String>, duration_seconds: u64, alarm_enabled: bool) -> Self {
        Self {
            id: TimerId::generate(),
            label: label.into(),
            duration_seconds,
            alarm_enabled,
            status: TimerStatus::Queued,
            remaining: span_of(duration_seconds),
        }
    }

    /// Rebuild an entry from stored fields; remaining time is clamped to the duration
    pub fn restore(
        id: TimerId,
        label: String,
        duration_seconds: u64,
        remaining_seconds: u64,
        alarm_enabled: bool,
        status: TimerStatus,
    ) -> Self {
        Self {
            id,
            label,
            duration_seconds,
            alarm_enabled,
            status,
            remaining: span_of(remaining_seconds.min(duration_seconds)),
        }
    }

    pub fn id(&self) -> &TimerId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn alarm_enabled(&self) -> bool {
        self.alarm_enabled
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    /// Remaining seconds as of the last committed transition or tick, rounded up
    pub fn remaining_seconds(&self) -> u64 {
        whole_seconds_up(self.remaining)
    }

    /// Remaining span as of the last committed transition or tick
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub(crate) fn set_remaining(&mut self, seconds: u64) {
        self.remaining = span_of(seconds.min(self.duration_seconds));
    }

    pub(crate) fn set_remaining_span(&mut self, span: Duration) {
        self.remaining = span.clamp(Duration::zero(), span_of(self.duration_seconds));
    }

    /// Exact remaining span at `now`, without mutating the entry
    pub fn remaining_span_at(&self, now: DateTime<Utc>) -> Duration {
        match self.status {
            TimerStatus::Running { completes_at } => (completes_at - now)
                .clamp(Duration::zero(), span_of(self.duration_seconds)),
            TimerStatus::AlarmActive { .. } => Duration::zero(),
            TimerStatus::Queued | TimerStatus::Paused => self.remaining,
        }
    }

    /// Remaining whole seconds at `now`, rounded up
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        whole_seconds_up(self.remaining_span_at(now))
    }

    /// Back to Queued with the full duration
    pub(crate) fn reset(&mut self) {
        self.status = TimerStatus::Queued;
        self.remaining = span_of(self.duration_seconds);
    }

    /// Completion percentage for a given remaining value, clamped to `0..=100`
    pub fn progress_percent(&self, remaining_seconds: u64) -> f64 {
        if self.duration_seconds == 0 {
            return 100.0;
        }
        let done = self.duration_seconds.saturating_sub(remaining_seconds) as f64;
        (100.0 * done / self.duration_seconds as f64).clamp(0.0, 100.0)
    }
}

/// `seconds` as a span, capped at the longest accepted timer
pub(crate) fn span_of(seconds: u64) -> Duration {
    Duration::seconds(seconds.min(MAX_DURATION_SECONDS) as i64)
}

/// Whole seconds in `span`, rounded up and floored at zero
pub fn whole_seconds_up(span: Duration) -> u64 {
    if span <= Duration::zero() {
        return 0;
    }
    let seconds = span.num_seconds();
    if span > Duration::seconds(seconds) {
        seconds as u64 + 1
    } else {
        seconds as u64
    }
}
