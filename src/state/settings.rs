//! User settings stored next to the queue

use serde::{Deserialize, Serialize};

/// Settings kept in the `settings` object of the snapshot file.
///
/// Keys are snake_case in the document. Missing keys take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Alarm flag for new timers when a request does not set one
    #[serde(default = "default_true")]
    pub default_alarm_enabled: bool,
    /// Kept for the file's sake; the alarm window is always five seconds
    #[serde(default = "default_alarm_duration")]
    pub alarm_duration_seconds: u64,
    /// Presentation hint: flash the timer card while its alarm sounds
    #[serde(default = "default_true")]
    pub flash_on_alarm: bool,
}

fn default_true() -> bool {
    true
}

fn default_alarm_duration() -> u64 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_alarm_enabled: true,
            alarm_duration_seconds: default_alarm_duration(),
            flash_on_alarm: true,
        }
    }
}
