/*!
 * Monitor Tests
 * Threshold triggering, manual requests and applying clean events
 */

use crate::common::*;
use memtrim::monitoring::{
    ActivityLog, AutoCleanConfig, CardKind, DisplayState, DisplaySurface, MemoryLogSink, Monitor,
    Status,
};
use memtrim::reclaim::{
    CleanDispatcher, CleanEvent, CleanLauncher, CleanOptions, CleanResult, CleanStep,
    ReclaimError, ReclaimResult, StepRecord, Trigger,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Launcher that records every launch and can pretend to be busy
#[derive(Default)]
struct CountingLauncher {
    launches: Mutex<Vec<(CleanOptions, Trigger)>>,
    busy: AtomicBool,
}

impl CountingLauncher {
    fn launches(&self) -> Vec<(CleanOptions, Trigger)> {
        self.launches.lock().clone()
    }
}

impl CleanLauncher for CountingLauncher {
    fn launch(&self, options: CleanOptions, trigger: Trigger) -> ReclaimResult<()> {
        if options.is_empty() {
            return Err(ReclaimError::NoOptionsSelected);
        }
        if self.busy.load(Ordering::SeqCst) {
            return Err(ReclaimError::AlreadyRunning);
        }
        self.launches.lock().push((options, trigger));
        Ok(())
    }
}

/// Surface keeping the last rendered state
#[derive(Clone, Default)]
struct CapturingDisplay {
    renders: Arc<Mutex<Vec<DisplayState>>>,
}

impl DisplaySurface for CapturingDisplay {
    fn render(&mut self, state: &DisplayState) {
        self.renders.lock().push(state.clone());
    }
}

struct Fixture {
    monitor: Monitor,
    launcher: Arc<CountingLauncher>,
    display: CapturingDisplay,
    sink: MemoryLogSink,
}

fn fixture(stats: FakeStats, auto: AutoCleanConfig) -> Fixture {
    let launcher = Arc::new(CountingLauncher::default());
    let display = CapturingDisplay::default();
    let sink = MemoryLogSink::new();
    let monitor = Monitor::new(
        Arc::new(stats),
        launcher.clone(),
        Box::new(display.clone()),
        ActivityLog::new(Arc::new(sink.clone())),
        true,
    )
    .with_auto_clean(auto);
    Fixture {
        monitor,
        launcher,
        display,
        sink,
    }
}

fn finished_result() -> CleanResult {
    CleanResult {
        run_id: Uuid::new_v4(),
        before: sample(80.0, 3 * GB),
        after: sample(70.0, 4 * GB + GB / 2),
        freed_bytes: (GB + GB / 2) as i64,
        steps: vec![
            StepRecord::new(CleanStep::WorkingSet, Ok(true)),
            StepRecord::new(CleanStep::StandbyList, Ok(true)),
        ],
    }
}

#[test]
fn test_tick_above_threshold_launches_one_auto_clean() {
    let auto = AutoCleanConfig::new(true, 80).expect("valid");
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(85.0)),
        auto,
    );

    let outcome = f.monitor.tick();

    assert!(outcome.triggered);
    assert_eq!(
        f.launcher.launches(),
        vec![(CleanOptions::default(), Trigger::Auto)]
    );
    let sample = outcome.sample.expect("sample read");
    assert!((sample.used_percent - 85.0).abs() < 0.01);
}

#[test]
fn test_tick_at_or_below_threshold_does_nothing() {
    let auto = AutoCleanConfig::new(true, 80).expect("valid");
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(75.0)),
        auto,
    );

    let outcome = f.monitor.tick();

    assert!(!outcome.triggered);
    assert!(f.launcher.launches().is_empty());
}

#[test]
fn test_disabled_auto_clean_never_launches() {
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(99.0)),
        AutoCleanConfig::default(),
    );

    for _ in 0..3 {
        f.monitor.tick();
    }

    assert!(f.launcher.launches().is_empty());
}

#[test]
fn test_busy_launcher_skips_auto_clean_quietly() {
    let auto = AutoCleanConfig::new(true, 80).expect("valid");
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(90.0)),
        auto,
    );
    f.launcher.busy.store(true, Ordering::SeqCst);

    let outcome = f.monitor.tick();

    assert!(!outcome.triggered);
    assert!(f.sink.is_empty(), "skip is not user-facing: {:?}", f.sink.lines());
}

#[test]
fn test_tick_updates_cards_and_renders() {
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_with_available(4 * GB)),
        AutoCleanConfig::default(),
    );

    f.monitor.tick();

    let physical = f
        .monitor
        .state()
        .card(CardKind::Physical)
        .expect("cards populated");
    assert_eq!(physical.percent, 75.0);
    assert_eq!(f.display.renders.lock().len(), 1);
}

#[test]
fn test_sampling_failure_is_logged_and_state_kept() {
    let mut f = fixture(
        FakeStats::new(Trace::new(), vec![Err(unavailable())]),
        AutoCleanConfig::new(true, 50).expect("valid"),
    );

    let outcome = f.monitor.tick();

    assert_eq!(outcome.sample, None);
    assert!(!outcome.triggered);
    assert!(f.monitor.state().cards.is_none());
    let lines = f.sink.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Error updating memory info: "));
}

#[test]
fn test_manual_clean_with_no_options_warns() {
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(50.0)),
        AutoCleanConfig::default(),
    );
    f.monitor.handle().set_options(CleanOptions::none());

    assert!(!f.monitor.request_clean());
    assert!(f.launcher.launches().is_empty());
    assert!(f.sink.lines()[0].ends_with("⚠ Select at least one clean option!"));
}

#[test]
fn test_manual_clean_uses_current_options() {
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(50.0)),
        AutoCleanConfig::default(),
    );
    f.monitor
        .handle()
        .set_options(CleanOptions::only(CleanStep::VirtualMemory));

    assert!(f.monitor.request_clean());
    assert_eq!(
        f.launcher.launches(),
        vec![(CleanOptions::only(CleanStep::VirtualMemory), Trigger::Manual)]
    );
}

#[test]
fn test_handle_rejects_invalid_threshold() {
    let f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(50.0)),
        AutoCleanConfig::default(),
    );
    let handle = f.monitor.handle();
    let invalid = AutoCleanConfig {
        enabled: true,
        threshold_percent: 99,
        interval_seconds: 30,
    };

    assert!(handle.set_auto_clean(invalid).is_err());
    assert_eq!(handle.auto_clean(), AutoCleanConfig::default());
}

#[test]
fn test_apply_events_drive_status_and_summary() {
    let mut f = fixture(
        FakeStats::constant(Trace::new(), snapshot_at_percent(50.0)),
        AutoCleanConfig::default(),
    );

    f.monitor.apply(CleanEvent::Started {
        trigger: Trigger::Manual,
        options: CleanOptions::default(),
    });
    assert_eq!(f.monitor.state().status, Status::Cleaning);

    f.monitor.apply(CleanEvent::Finished {
        trigger: Trigger::Manual,
        result: finished_result(),
    });
    assert_eq!(f.monitor.state().status, Status::Monitoring);

    let lines = f.sink.lines();
    assert!(lines.iter().any(|l| l.contains("Memory clean finished")));
    assert!(lines.iter().any(|l| l.contains("Succeeded: 2/2")));

    f.monitor.apply(CleanEvent::Failed {
        trigger: Trigger::Auto,
        error: ReclaimError::Measurement(unavailable()),
    });
    assert_eq!(f.monitor.state().status, Status::Error);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_ticks_and_applies_dispatched_clean() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::constant(trace.clone(), snapshot_at_percent(90.0)));
    let controller = controller(&trace, stats.clone(), FakePlatform::healthy(trace.clone()));
    let (dispatcher, events) = CleanDispatcher::new(Arc::new(controller));
    let sink = MemoryLogSink::new();

    let monitor = Monitor::new(
        stats,
        Arc::new(dispatcher),
        Box::new(CapturingDisplay::default()),
        ActivityLog::new(Arc::new(sink.clone())),
        true,
    )
    .with_options(CleanOptions::only(CleanStep::WorkingSet))
    .with_auto_clean(AutoCleanConfig::new(true, 80).expect("valid"));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(monitor.run(events, async {
        let _ = stop_rx.await;
    }));

    // The worker thread runs in real time; poll until its summary lands
    let mut finished = false;
    for _ in 0..200 {
        tokio::time::advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        if sink
            .lines()
            .iter()
            .any(|l| l.contains("Memory clean finished"))
        {
            finished = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    let _ = stop_tx.send(());
    task.await.expect("monitor loop exits");
    assert!(finished, "no summary in {:?}", sink.lines());
    assert!(!trace.matching("trim:self").is_empty());
}
