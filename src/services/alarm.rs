//! Alarm notification backends
//!
//! The engine calls [`AlarmNotifier::notify`] while holding the queue lock, so
//! implementations must return immediately and do any slow work elsewhere.

use std::{
    io::Write,
    sync::Mutex,
};

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use crate::state::{TimerEntry, TimerId};

/// Receives one call per completed timer that has its alarm enabled
pub trait AlarmNotifier: Send + Sync {
    fn notify(&self, entry: &TimerEntry);
}

/// Runs a shell command for every alarm, e.g. `paplay data/alarm-bleep.wav`.
///
/// The command is spawned on the tokio runtime; its exit status is only logged.
/// `TIMEBARS_LABEL` and `TIMEBARS_ID` are set for the child.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    command: String,
    runtime: Handle,
}

impl CommandNotifier {
    /// Must be created from inside a tokio runtime
    pub fn new(command: impl Into<String>, runtime: Handle) -> Self {
        Self {
            command: command.into(),
            runtime,
        }
    }
}

impl AlarmNotifier for CommandNotifier {
    fn notify(&self, entry: &TimerEntry) {
        let command = self.command.clone();
        let label = entry.label().to_string();
        let id = entry.id().to_string();

        self.runtime.spawn(async move {
            debug!("Running alarm command for {}: {}", id, command);
            let output = Command::new("sh")
                .args(["-c", command.as_str()])
                .env("TIMEBARS_LABEL", &label)
                .env("TIMEBARS_ID", &id)
                .output()
                .await;

            match output {
                Ok(output) if output.status.success() => {
                    debug!("Alarm command finished for {}", id);
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("Alarm command failed for {}: {}", id, stderr.trim());
                }
                Err(e) => warn!("Failed to execute alarm command: {}", e),
            }
        });
    }
}

/// Fallback when no sound command is configured: log and ring the terminal bell
#[derive(Debug, Clone, Copy, Default)]
pub struct BellNotifier;

impl AlarmNotifier for BellNotifier {
    fn notify(&self, entry: &TimerEntry) {
        info!("Alarm: {:?} finished", entry.label());
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            debug!("Could not ring terminal bell: {}", e);
        }
    }
}

/// Remembers which entries alarmed, in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<TimerId>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TimerId> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AlarmNotifier for RecordingNotifier {
    fn notify(&self, entry: &TimerEntry) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.id().clone());
    }
}
