//! Periodic tick background task

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::AppState;

/// Background task that advances the queue on a fixed cadence.
///
/// Missed ticks are skipped rather than replayed; the engine computes
/// remaining time from wall-clock instants, so a late tick loses nothing.
pub async fn tick_driver_task(state: Arc<AppState>, period: Duration) {
    info!("Starting tick driver every {:?}", period);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let report = state.tick();
        if report.changed() {
            debug!(
                "Tick transitions: completed={:?} alarm={} expired={:?} started={:?}",
                report.completed, report.alarm_fired, report.expired, report.started
            );
        }
        if report.queue_finished {
            info!("All timers finished, queue is idle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::{
        engine::QueueEngine,
        services::RecordingNotifier,
        state::StatusKind,
        store::MemoryStore,
        utils::ManualClock,
    };

    #[tokio::test]
    async fn driver_advances_the_queue() {
        let clock = ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = QueueEngine::load(
            Arc::new(MemoryStore::new()),
            Arc::new(clock.clone()),
            notifier.clone(),
        );
        let state = Arc::new(AppState::new(engine, 0, "127.0.0.1".to_string()));
        let (entry, _) = state.add_timer("egg", "3", Some(true)).unwrap();
        state.start().unwrap();

        let task = tokio::spawn(tick_driver_task(Arc::clone(&state), Duration::from_millis(10)));

        clock.advance_secs(180);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            state.snapshot().entry(entry.id()).map(|e| e.status),
            Some(StatusKind::AlarmActive)
        );
        assert_eq!(notifier.calls(), vec![entry.id().clone()]);

        clock.advance_secs(5);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(state.snapshot().entries.is_empty());

        task.abort();
    }
}
