//! Read-only projection of the queue handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GlobalRunState, QueueState, Settings, StatusKind, TimerId};
use crate::duration::format_hms;

/// One entry as rendered by a timer card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: TimerId,
    pub label: String,
    pub duration_seconds: u64,
    pub remaining_seconds: u64,
    pub alarm_enabled: bool,
    pub status: StatusKind,
    pub progress_percent: f64,
    /// `HH:MM:SS` of the remaining time
    pub remaining_display: String,
    /// `HH:MM:SS` of the full duration
    pub duration_display: String,
}

/// Whole-queue view at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub entries: Vec<EntryView>,
    pub global_run_state: GlobalRunState,
    pub active_id: Option<TimerId>,
    pub settings: Settings,
    pub last_persistence_error: Option<String>,
    pub taken_at: DateTime<Utc>,
}

impl QueueSnapshot {
    /// Project `state` as of `now`; a Running entry reports its live remaining time
    pub fn capture(
        state: &QueueState,
        now: DateTime<Utc>,
        last_persistence_error: Option<String>,
    ) -> Self {
        let entries = state
            .entries
            .iter()
            .map(|entry| {
                let remaining = entry.remaining_at(now);
                EntryView {
                    id: entry.id().clone(),
                    label: entry.label().to_string(),
                    duration_seconds: entry.duration_seconds(),
                    remaining_seconds: remaining,
                    alarm_enabled: entry.alarm_enabled(),
                    status: entry.status().kind(),
                    progress_percent: entry.progress_percent(remaining),
                    remaining_display: format_hms(remaining),
                    duration_display: format_hms(entry.duration_seconds()),
                }
            })
            .collect();

        Self {
            entries,
            global_run_state: state.global_run_state,
            active_id: state
                .active_index()
                .map(|i| state.entries[i].id().clone()),
            settings: state.settings,
            last_persistence_error,
            taken_at: now,
        }
    }

    pub fn entry(&self, id: &TimerId) -> Option<&EntryView> {
        self.entries.iter().find(|e| &e.id == id)
    }
}
