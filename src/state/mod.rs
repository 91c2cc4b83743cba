//! State management module
//!
//! This module contains the queue data model, the stored user settings, the
//! snapshot projection and the shared application state that serializes access
//! to the engine.

pub mod app_state;
pub mod queue_state;
pub mod settings;
pub mod snapshot;
pub mod timer_entry;

// Re-export main types
pub use app_state::AppState;
pub use queue_state::{Demotion, GlobalRunState, QueueState};
pub use settings::Settings;
pub use snapshot::{EntryView, QueueSnapshot};
pub use timer_entry::{StatusKind, TimerEntry, TimerId, TimerStatus};
