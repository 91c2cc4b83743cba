use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use super::*;
use crate::{
    error::QueueError,
    services::RecordingNotifier,
    state::{GlobalRunState, QueueState, StatusKind, TimerEntry, TimerId, TimerStatus},
    store::{LoadOutcome, MemoryStore, QueueStore},
    utils::ManualClock,
};

struct Harness {
    engine: QueueEngine,
    clock: ManualClock,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    fn with_store(store: Arc<MemoryStore>) -> Self {
        let clock = ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = QueueEngine::load(store.clone(), Arc::new(clock.clone()), notifier.clone());
        Self {
            engine,
            clock,
            store,
            notifier,
        }
    }

    /// Tick once per second for `seconds` seconds
    fn run_for(&mut self, seconds: i64) {
        for _ in 0..seconds {
            self.clock.advance_secs(1);
            self.engine.tick();
        }
    }

    fn remaining(&self, id: &TimerId) -> u64 {
        self.engine
            .snapshot()
            .entry(id)
            .map(|e| e.remaining_seconds)
            .expect("entry present")
    }
}

struct FailingStore;

impl QueueStore for FailingStore {
    fn load(&self) -> LoadOutcome {
        LoadOutcome::default()
    }

    fn save(&self, _state: &QueueState) -> Result<(), QueueError> {
        Err(QueueError::Persistence("disk full".to_string()))
    }
}

#[test]
fn add_rejects_zero_duration_and_keeps_queue() {
    let mut h = Harness::new();
    h.engine.add_timer("ok", 60, true).unwrap();

    assert_eq!(h.engine.add_timer("zero", 0, true), Err(QueueError::InvalidDuration));
    assert_eq!(h.engine.state().len(), 1);
}

#[test]
fn add_from_text_parses_and_persists() {
    let mut h = Harness::new();
    let entry = h.engine.add_timer_text("Bread", "1:30", false).unwrap();

    assert_eq!(entry.duration_seconds(), 5400);
    assert_eq!(entry.status(), TimerStatus::Queued);
    assert_eq!(h.store.save_count(), 1);
    assert_eq!(h.store.last_saved().unwrap().len(), 1);

    assert!(matches!(
        h.engine.add_timer_text("Bad", "1:75", true),
        Err(QueueError::InvalidFormat(_))
    ));
    assert_eq!(h.store.save_count(), 1);
}

#[test]
fn remove_unknown_id_is_not_found() {
    let mut h = Harness::new();
    let id = TimerId::new("nope");
    assert_eq!(h.engine.remove_timer(&id), Err(QueueError::NotFound(id)));
}

#[test]
fn remove_running_entry_is_rejected_and_queue_unchanged() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("a", 60, true).unwrap();
    h.engine.add_timer("b", 60, true).unwrap();
    h.engine.start().unwrap();
    let before = h.engine.state().clone();

    assert!(matches!(
        h.engine.remove_timer(a.id()),
        Err(QueueError::InvalidOperation(_))
    ));
    assert_eq!(h.engine.state(), &before);
}

#[test]
fn remove_queued_and_paused_entries() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("a", 60, true).unwrap();
    let b = h.engine.add_timer("b", 60, true).unwrap();
    h.engine.start().unwrap();
    h.engine.remove_timer(b.id()).unwrap();
    h.engine.pause().unwrap();
    h.engine.remove_timer(a.id()).unwrap();

    assert!(h.engine.state().is_empty());
}

#[test]
fn start_on_empty_queue_is_invalid() {
    let mut h = Harness::new();
    assert!(matches!(h.engine.start(), Err(QueueError::InvalidOperation(_))));
}

#[test]
fn start_twice_is_invalid() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("a", 60, true).unwrap();

    assert_eq!(h.engine.start(), Ok(StartOutcome::Started(a.id().clone())));
    assert!(matches!(h.engine.start(), Err(QueueError::InvalidOperation(_))));
    assert_eq!(h.engine.state().global_run_state, GlobalRunState::Running);
}

#[test]
fn pause_requires_a_running_entry() {
    let mut h = Harness::new();
    assert!(matches!(h.engine.pause(), Err(QueueError::InvalidOperation(_))));

    h.engine.add_timer("a", 60, true).unwrap();
    h.engine.start().unwrap();
    h.engine.pause().unwrap();
    assert!(matches!(h.engine.pause(), Err(QueueError::InvalidOperation(_))));
}

#[test]
fn pause_and_resume_do_not_drift() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("ten", 10, false).unwrap();
    h.engine.start().unwrap();

    while h.remaining(a.id()) > 6 {
        h.clock.advance_secs(1);
        h.engine.tick();
    }
    assert_eq!(h.remaining(a.id()), 6);

    let paused = h.engine.pause().unwrap();
    assert_eq!(paused.remaining_seconds(), 6);

    h.clock.advance_secs(100);
    assert_eq!(h.engine.start(), Ok(StartOutcome::Resumed(a.id().clone())));
    assert_eq!(h.remaining(a.id()), 6);
    assert_eq!(
        h.engine.snapshot().entry(a.id()).unwrap().status,
        StatusKind::Running
    );
}

#[test]
fn frequent_pause_and_resume_still_reaches_zero() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("ten", 10, false).unwrap();
    h.engine.start().unwrap();

    for _ in 0..19 {
        h.clock.advance(Duration::milliseconds(500));
        h.engine.tick();
        h.engine.pause().unwrap();
        h.engine.start().unwrap();
    }

    let entry = h.engine.state().get(a.id()).unwrap();
    assert_eq!(entry.remaining(), Duration::milliseconds(500));
    assert_eq!(h.remaining(a.id()), 1);

    h.clock.advance(Duration::milliseconds(500));
    assert_eq!(h.engine.tick().completed, Some(a.id().clone()));
}

#[test]
fn queue_runs_sequentially_and_goes_idle() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("A", 2, false).unwrap();
    let b = h.engine.add_timer("B", 2, false).unwrap();
    h.engine.add_timer("C", 2, false).unwrap();
    h.engine.start().unwrap();

    h.run_for(2);
    assert_eq!(
        h.engine.state().get(a.id()).unwrap().status().kind(),
        StatusKind::AlarmActive
    );
    assert_eq!(
        h.engine.state().get(b.id()).unwrap().status(),
        TimerStatus::Queued
    );

    h.run_for(5);
    assert!(h.engine.state().get(a.id()).is_none());
    assert_eq!(
        h.engine.state().get(b.id()).unwrap().status().kind(),
        StatusKind::Running
    );

    h.run_for(14);
    assert!(h.engine.state().is_empty());
    assert_eq!(h.engine.state().global_run_state, GlobalRunState::Idle);
    assert!(h.notifier.calls().is_empty());
    assert!(h.store.last_saved().unwrap().is_empty());
}

#[test]
fn alarm_fires_once_for_enabled_entries_only() {
    let mut h = Harness::new();
    let loud = h.engine.add_timer("loud", 1, true).unwrap();
    h.engine.add_timer("quiet", 1, false).unwrap();
    h.engine.start().unwrap();

    h.run_for(20);

    assert_eq!(h.notifier.calls(), vec![loud.id().clone()]);
}

#[test]
fn late_tick_computes_completion_from_wall_clock() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("a", 10, true).unwrap();
    h.engine.add_timer("b", 10, true).unwrap();
    h.engine.start().unwrap();

    h.clock.advance_secs(500);
    let report = h.engine.tick();
    assert_eq!(report.completed, Some(a.id().clone()));
    assert!(report.alarm_fired);
    assert_eq!(report.expired, None);

    h.clock.advance_secs(ALARM_WINDOW_SECONDS);
    let report = h.engine.tick();
    assert_eq!(report.expired, Some(a.id().clone()));
    assert!(report.started.is_some());
    assert_eq!(h.engine.state().active_count(), 1);
}

#[test]
fn clear_all_while_running_does_not_notify() {
    let mut h = Harness::new();
    h.engine.add_timer("a", 3, true).unwrap();
    h.engine.add_timer("b", 3, true).unwrap();
    h.engine.start().unwrap();
    h.run_for(1);

    assert_eq!(h.engine.clear_all(), 2);
    h.run_for(30);

    assert!(h.engine.state().is_empty());
    assert_eq!(h.engine.state().global_run_state, GlobalRunState::Idle);
    assert!(h.notifier.calls().is_empty());
}

#[test]
fn stop_resets_active_entry_and_keeps_order() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("a", 60, true).unwrap();
    let b = h.engine.add_timer("b", 60, true).unwrap();
    h.engine.start().unwrap();
    h.run_for(20);

    assert_eq!(h.engine.stop(), Ok(StopOutcome::Reset(a.id().clone())));

    let state = h.engine.state();
    assert_eq!(state.global_run_state, GlobalRunState::Idle);
    assert_eq!(state.entries[0].id(), a.id());
    assert_eq!(state.entries[1].id(), b.id());
    assert_eq!(state.entries[0].status(), TimerStatus::Queued);
    assert_eq!(state.entries[0].remaining_seconds(), 60);
    assert!(matches!(h.engine.stop(), Err(QueueError::InvalidOperation(_))));
}

#[test]
fn stop_during_alarm_halts_auto_advance_until_restarted() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("a", 1, true).unwrap();
    let b = h.engine.add_timer("b", 5, true).unwrap();
    h.engine.start().unwrap();
    h.run_for(1);

    assert_eq!(h.engine.stop(), Ok(StopOutcome::Halted));
    h.run_for(ALARM_WINDOW_SECONDS);
    assert!(h.engine.state().get(a.id()).is_none());
    assert_eq!(
        h.engine.state().get(b.id()).unwrap().status(),
        TimerStatus::Queued
    );

    let c = h.engine.add_timer("c", 1, false).unwrap();
    assert_eq!(h.engine.start(), Ok(StartOutcome::Started(b.id().clone())));
    h.run_for(10);
    assert!(h.engine.state().get(b.id()).is_none());
    assert_eq!(
        h.engine.state().get(c.id()).unwrap().status().kind(),
        StatusKind::Running
    );

    // Restarting while an alarm sounds re-enables auto-advance
    h.engine.stop().unwrap();
    h.engine.start().unwrap();
    h.run_for(1);
    assert_eq!(h.engine.stop(), Ok(StopOutcome::Halted));
    assert_eq!(h.engine.start(), Ok(StartOutcome::Rearmed(c.id().clone())));
    assert!(matches!(h.engine.start(), Err(QueueError::InvalidOperation(_))));
}

#[test]
fn snapshot_is_side_effect_free_and_reports_progress() {
    let mut h = Harness::new();
    let a = h.engine.add_timer("a", 200, true).unwrap();
    h.engine.start().unwrap();
    let saves = h.store.save_count();
    let before = h.engine.state().clone();

    h.clock.advance_secs(50);
    let snapshot = h.engine.snapshot();
    let view = snapshot.entry(a.id()).unwrap();

    assert_eq!(view.remaining_seconds, 150);
    assert_eq!(view.progress_percent, 25.0);
    assert_eq!(view.remaining_display, "00:02:30");
    assert_eq!(snapshot.active_id.as_ref(), Some(a.id()));
    assert_eq!(h.store.save_count(), saves);
    assert_eq!(h.engine.state(), &before);
}

#[test]
fn persistence_failure_keeps_in_memory_transition() {
    let clock = ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    let mut engine = QueueEngine::load(
        Arc::new(FailingStore),
        Arc::new(clock.clone()),
        Arc::new(RecordingNotifier::new()),
    );

    let entry = engine.add_timer("a", 30, true).unwrap();
    engine.start().unwrap();

    assert_eq!(engine.state().len(), 1);
    assert_eq!(engine.state().active_index(), Some(0));
    assert_eq!(engine.state().get(entry.id()).unwrap().status().kind(), StatusKind::Running);
    assert!(engine.last_persistence_error().is_some());
    assert!(engine
        .snapshot()
        .last_persistence_error
        .unwrap()
        .contains("disk full"));
}

#[test]
fn reload_demotes_running_entry_to_paused() {
    let store = Arc::new(MemoryStore::new());
    let mut first = Harness::with_store(store.clone());
    let a = first.engine.add_timer("a", 60, true).unwrap();
    first.engine.start().unwrap();
    first.run_for(15);
    first.engine.persist().unwrap();

    let mut second = Harness::with_store(store);
    let entry = second.engine.state().get(a.id()).unwrap();

    assert_eq!(entry.status(), TimerStatus::Paused);
    assert_eq!(entry.remaining_seconds(), 45);
    assert_eq!(second.remaining(a.id()), 45);
    assert_eq!(second.engine.state().global_run_state, GlobalRunState::Idle);
    assert_eq!(second.engine.start(), Ok(StartOutcome::Resumed(a.id().clone())));
}

#[test]
fn stop_resets_the_running_entry_after_reloading_two_paused() {
    let x = TimerId::new("x");
    let y = TimerId::new("y");
    let z = TimerId::new("z");
    let saved = QueueState {
        entries: vec![
            TimerEntry::restore(x.clone(), "x".into(), 2, 2, true, TimerStatus::Paused),
            TimerEntry::restore(y.clone(), "y".into(), 60, 30, true, TimerStatus::Paused),
            TimerEntry::restore(z.clone(), "z".into(), 60, 60, true, TimerStatus::Queued),
        ],
        ..QueueState::default()
    };
    let mut h = Harness::with_store(Arc::new(MemoryStore::with_state(saved)));

    let reloaded = h.engine.state().get(&y).unwrap();
    assert_eq!(reloaded.status(), TimerStatus::Queued);
    assert_eq!(reloaded.remaining_seconds(), 60);

    assert_eq!(h.engine.start(), Ok(StartOutcome::Resumed(x.clone())));
    h.run_for(8);
    assert!(h.engine.state().get(&x).is_none());
    assert_eq!(
        h.engine.state().get(&y).unwrap().status().kind(),
        StatusKind::Running
    );

    assert_eq!(h.engine.stop(), Ok(StopOutcome::Reset(y.clone())));
    let state = h.engine.state();
    assert_eq!(state.active_count(), 0);
    assert!(state.entries.iter().all(|e| e.status() == TimerStatus::Queued));
}

#[derive(Debug, Clone)]
enum Command {
    Add(u64, bool),
    Remove(usize),
    Start,
    Pause,
    Stop,
    ClearAll,
    Tick(i64),
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        3 => (1u64..8, any::<bool>()).prop_map(|(d, alarm)| Command::Add(d, alarm)),
        1 => (0usize..6).prop_map(Command::Remove),
        2 => Just(Command::Start),
        1 => Just(Command::Pause),
        1 => Just(Command::Stop),
        1 => Just(Command::ClearAll),
        4 => (0i64..9).prop_map(Command::Tick),
    ]
}

proptest! {
    #[test]
    fn at_most_one_entry_is_ever_active(commands in prop::collection::vec(command(), 1..80)) {
        let mut h = Harness::new();

        for command in commands {
            match command {
                Command::Add(d, alarm) => { let _ = h.engine.add_timer("", d, alarm); }
                Command::Remove(i) => {
                    let id = h.engine.state().entries.get(i).map(|e| e.id().clone());
                    if let Some(id) = id {
                        let _ = h.engine.remove_timer(&id);
                    }
                }
                Command::Start => { let _ = h.engine.start(); }
                Command::Pause => { let _ = h.engine.pause(); }
                Command::Stop => { let _ = h.engine.stop(); }
                Command::ClearAll => { h.engine.clear_all(); }
                Command::Tick(secs) => {
                    h.clock.advance_secs(secs);
                    h.engine.tick();
                }
            }

            let state = h.engine.state();
            prop_assert!(state.active_count() <= 1);
            for entry in &state.entries {
                prop_assert!(entry.remaining_seconds() <= entry.duration_seconds());
            }
        }
    }
}
