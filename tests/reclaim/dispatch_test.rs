/*!
 * Clean Dispatcher Tests
 * Single-flight launching and completion events
 */

use crate::common::*;
use memtrim::monitoring::ActivityLog;
use memtrim::reclaim::{
    CleanDispatcher, CleanEvent, CleanLauncher, CleanOptions, CleanStep, Pacing,
    ReclaimController, ReclaimError, Sleeper, Trigger,
};
use std::sync::Arc;
use std::time::Duration;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Blocks every sleep until the test opens the gate
struct GateSleeper {
    entered: flume::Sender<()>,
    gate: flume::Receiver<()>,
}

impl Sleeper for GateSleeper {
    fn sleep(&self, _duration: Duration) {
        let _ = self.entered.send(());
        let _ = self.gate.recv();
    }
}

fn dispatcher(trace: &Trace) -> (CleanDispatcher, flume::Receiver<CleanEvent>) {
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = controller(trace, stats, FakePlatform::healthy(trace.clone()));
    CleanDispatcher::new(Arc::new(controller))
}

#[test]
fn test_launch_reports_started_then_finished() {
    let trace = Trace::new();
    let (dispatcher, events) = dispatcher(&trace);

    dispatcher
        .launch(CleanOptions::only(CleanStep::WorkingSet), Trigger::Manual)
        .expect("launch accepted");

    match events.recv_timeout(EVENT_TIMEOUT).expect("started event") {
        CleanEvent::Started { trigger, options } => {
            assert_eq!(trigger, Trigger::Manual);
            assert_eq!(options, CleanOptions::only(CleanStep::WorkingSet));
        }
        other => panic!("unexpected event {:?}", other),
    }
    match events.recv_timeout(EVENT_TIMEOUT).expect("finished event") {
        CleanEvent::Finished { trigger, result } => {
            assert_eq!(trigger, Trigger::Manual);
            assert_eq!(result.steps_succeeded(), 1);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(!dispatcher.is_busy());
}

#[test]
fn test_empty_selection_rejected_without_events() {
    let trace = Trace::new();
    let (dispatcher, events) = dispatcher(&trace);

    let err = dispatcher
        .launch(CleanOptions::none(), Trigger::Manual)
        .unwrap_err();

    assert_eq!(err, ReclaimError::NoOptionsSelected);
    assert!(events.try_recv().is_err());
    assert!(trace.events().is_empty());
}

#[test]
fn test_second_launch_while_running_is_rejected() {
    let trace = Trace::new();
    let (entered_tx, entered_rx) = flume::unbounded();
    let (gate_tx, gate_rx) = flume::unbounded();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = ReclaimController::new(
        stats,
        Arc::new(FakePlatform::healthy(trace.clone())),
        ActivityLog::discard(),
    )
    .with_pacing(Pacing::new())
    .with_sleeper(Arc::new(GateSleeper {
        entered: entered_tx,
        gate: gate_rx,
    }));
    let (dispatcher, events) = CleanDispatcher::new(Arc::new(controller));

    dispatcher
        .launch(CleanOptions::only(CleanStep::WorkingSet), Trigger::Manual)
        .expect("first launch");
    entered_rx
        .recv_timeout(EVENT_TIMEOUT)
        .expect("worker reached the first pause");

    assert!(dispatcher.is_busy());
    assert_eq!(
        dispatcher.launch(CleanOptions::all(), Trigger::Auto),
        Err(ReclaimError::AlreadyRunning)
    );

    // One pause per step, one settle, two gaps between after-samples
    for _ in 0..4 {
        gate_tx.send(()).expect("worker alive");
    }

    let mut finished = 0;
    while let Ok(event) = events.recv_timeout(EVENT_TIMEOUT) {
        if let CleanEvent::Finished { trigger, .. } = event {
            assert_eq!(trigger, Trigger::Manual);
            finished += 1;
            break;
        }
    }
    assert_eq!(finished, 1);
    assert!(!dispatcher.is_busy());

    drop(gate_tx);
    dispatcher
        .launch(CleanOptions::only(CleanStep::WorkingSet), Trigger::Auto)
        .expect("slot free again");
}

#[test]
fn test_measurement_failure_reported_as_failed_event() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::new(trace.clone(), vec![Err(unavailable())]));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));
    let (dispatcher, events) = CleanDispatcher::new(Arc::new(controller));

    dispatcher
        .launch(CleanOptions::default(), Trigger::Auto)
        .expect("launch accepted");

    let failed = events
        .iter()
        .find(|event| matches!(event, CleanEvent::Failed { .. }));
    match failed {
        Some(CleanEvent::Failed { trigger, error }) => {
            assert_eq!(trigger, Trigger::Auto);
            assert_eq!(error, ReclaimError::Measurement(unavailable()));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
}
