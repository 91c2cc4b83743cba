//! External service integration module
//!
//! This module contains the alarm backends the engine signals when a timer
//! completes.

pub mod alarm;

// Re-export main types
pub use alarm::{AlarmNotifier, BellNotifier, CommandNotifier, RecordingNotifier};
