//! Queue persistence
//!
//! A store loads and saves complete queue snapshots. Loading never fails
//! outright: problems are reported alongside an empty queue.

pub mod json_file;

use std::sync::Mutex;

use crate::{
    error::QueueError,
    state::{Demotion, QueueState},
};

pub use json_file::JsonFileStore;

/// Why a load fell back to an empty queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadIssue {
    /// Nothing persisted yet
    Missing,
    /// The snapshot exists but could not be read
    Unreadable(QueueError),
    /// The snapshot was read but is not a valid queue document
    Malformed(QueueError),
}

/// Result of loading a snapshot
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub state: QueueState,
    pub issue: Option<LoadIssue>,
    /// Entries that were Running or AlarmActive when saved and came back Paused
    pub demoted: usize,
    /// Extra Paused entries that came back Queued
    pub requeued: usize,
    /// Entries dropped because they had no usable duration
    pub skipped: usize,
}

impl LoadOutcome {
    pub fn loaded(state: QueueState, demotion: Demotion, skipped: usize) -> Self {
        Self {
            state,
            issue: None,
            demoted: demotion.paused,
            requeued: demotion.requeued,
            skipped,
        }
    }

    pub fn empty(issue: LoadIssue) -> Self {
        Self {
            state: QueueState::default(),
            issue: Some(issue),
            demoted: 0,
            requeued: 0,
            skipped: 0,
        }
    }
}

/// Durable home of the queue snapshot
pub trait QueueStore: Send + Sync {
    fn load(&self) -> LoadOutcome;

    /// Replace the stored snapshot with `state`
    fn save(&self, state: &QueueState) -> Result<(), QueueError>;
}

/// Keeps the last saved snapshot in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<QueueState>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store as if `state` had been saved earlier
    pub fn with_state(state: QueueState) -> Self {
        Self {
            saved: Mutex::new(Some(state)),
            saves: Mutex::new(0),
        }
    }

    pub fn last_saved(&self) -> Option<QueueState> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl QueueStore for MemoryStore {
    fn load(&self) -> LoadOutcome {
        match self.last_saved() {
            Some(mut state) => {
                let demotion = state.demote_active();
                LoadOutcome::loaded(state, demotion, 0)
            }
            None => LoadOutcome::empty(LoadIssue::Missing),
        }
    }

    fn save(&self, state: &QueueState) -> Result<(), QueueError> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}
