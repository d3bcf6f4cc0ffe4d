/*!
 * Reclamation Controller Tests
 * Ordering, measurement and failure isolation of a clean
 */

use crate::common::*;
use memtrim::platform::ErrorCode;
use memtrim::reclaim::{CleanOptions, CleanStep, FallbackPolicy, ReclaimError};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_empty_selection_rejected_before_any_call() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = controller(&trace, stats.clone(), FakePlatform::healthy(trace.clone()));

    let err = controller.clean(CleanOptions::none()).unwrap_err();

    assert_eq!(err, ReclaimError::NoOptionsSelected);
    assert!(trace.events().is_empty(), "no OS call may happen: {:?}", trace.events());
    assert_eq!(stats.calls(), 0);
}

#[test]
fn test_working_set_only() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));

    let result = controller
        .clean(CleanOptions::only(CleanStep::WorkingSet))
        .expect("clean succeeds");

    assert_eq!(result.steps_succeeded(), 1);
    assert_eq!(result.steps_attempted(), CleanOptions::only(CleanStep::WorkingSet));
    assert_eq!(result.step_succeeded(CleanStep::WorkingSet), Some(true));
    assert_eq!(result.step_succeeded(CleanStep::StandbyList), None);
}

#[test]
fn test_full_sequence_order() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));

    controller.clean(CleanOptions::all()).expect("clean succeeds");

    assert_eq!(
        trace.events(),
        vec![
            "sample",
            "trim:self",
            "sleep:500",
            "trim:system",
            "sleep:500",
            "trim:self",
            "enumerate",
            "sleep:1000",
            "compact",
            "compact",
            "compact",
            "sleep:500",
            "sleep:2000",
            "sample",
            "sleep:500",
            "sample",
            "sleep:500",
            "sample",
        ]
    );
}

#[test]
fn test_before_sample_precedes_steps_and_after_samples_follow_settle() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = controller(&trace, stats.clone(), FakePlatform::healthy(trace.clone()));

    controller
        .clean(CleanOptions::only(CleanStep::StandbyList))
        .expect("clean succeeds");

    let events = trace.events();
    assert_eq!(events[0], "sample");
    let settle = trace.position("sleep:2000").expect("post-clean settle");
    let last_step = events.iter().rposition(|e| e.starts_with("trim:") || e == "enumerate");
    assert!(last_step.expect("a step ran") < settle);

    let after: Vec<_> = events[settle..].iter().filter(|e| *e == "sample").collect();
    assert_eq!(after.len(), 3);
    assert_eq!(stats.calls(), 4);
}

#[test]
fn test_freed_bytes_is_available_delta_of_average() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(
        trace.clone(),
        &[4 * GB, 5 * GB, 6 * GB, 7 * GB],
    ));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));

    let result = controller
        .clean(CleanOptions::only(CleanStep::WorkingSet))
        .expect("clean succeeds");

    assert_eq!(result.before.available_bytes, 4 * GB);
    assert_eq!(result.after.available_bytes, 6 * GB);
    assert_eq!(result.freed_bytes, (2 * GB) as i64);
    assert_eq!(result.before_percent(), 75.0);
    assert_eq!(result.after_percent(), 62.5);
}

#[test]
fn test_negative_freed_bytes_not_clamped() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(
        trace.clone(),
        &[6 * GB, 5 * GB, 5 * GB, 5 * GB],
    ));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));

    let result = controller
        .clean(CleanOptions::only(CleanStep::VirtualMemory))
        .expect("clean succeeds");

    assert_eq!(result.freed_bytes, -(GB as i64));
}

#[test]
fn test_failing_steps_do_not_abort_sequence() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = controller(&trace, stats, FakePlatform::broken(trace.clone()))
        .with_fallback(FallbackPolicy::Strict);

    let result = controller.clean(CleanOptions::all()).expect("measurement works");

    assert_eq!(result.steps.len(), 4);
    assert_eq!(result.steps_succeeded(), 0);
    assert_eq!(
        result.record(CleanStep::WorkingSet).and_then(|r| r.error_code()),
        Some(ErrorCode(5))
    );
    assert_eq!(
        result.record(CleanStep::SystemWorkingSet).and_then(|r| r.error_code()),
        Some(ErrorCode(1314))
    );
    assert_eq!(trace.matching("compact").len(), 1, "compaction stops at the first failure");
    assert_eq!(trace.matching("sample").len(), 4);
}

#[test]
fn test_lenient_fallback_counts_success_and_keeps_code() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let mut platform = FakePlatform::healthy(trace.clone());
    platform.system_trim = Err(ErrorCode(1314));
    let controller = controller(&trace, stats, platform);

    let result = controller
        .clean(CleanOptions::only(CleanStep::SystemWorkingSet))
        .expect("clean succeeds");

    let record = result.record(CleanStep::SystemWorkingSet).expect("step ran");
    assert!(record.succeeded());
    assert_eq!(record.fallback_from, Some(ErrorCode(1314)));
}

#[test]
fn test_before_sample_failure_is_measurement_error() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::new(trace.clone(), vec![Err(unavailable())]));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));

    let err = controller
        .clean(CleanOptions::only(CleanStep::WorkingSet))
        .unwrap_err();

    assert!(matches!(err, ReclaimError::Measurement(_)));
    assert!(trace.matching("trim:").is_empty());
}

#[test]
fn test_after_sample_failure_is_measurement_error() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::new(
        trace.clone(),
        vec![
            Ok(snapshot_with_available(8 * GB)),
            Ok(snapshot_with_available(8 * GB)),
            Err(unavailable()),
        ],
    ));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));

    let err = controller
        .clean(CleanOptions::only(CleanStep::WorkingSet))
        .unwrap_err();

    assert_eq!(err, ReclaimError::Measurement(unavailable()));
    assert_eq!(trace.matching("trim:self").len(), 1, "steps still ran");
}

#[test]
fn test_each_clean_gets_fresh_run_id() {
    let trace = Trace::new();
    let stats = Arc::new(FakeStats::available(trace.clone(), &[8 * GB]));
    let controller = controller(&trace, stats, FakePlatform::healthy(trace.clone()));

    let first = controller.clean(CleanOptions::default()).expect("first");
    let second = controller.clean(CleanOptions::default()).expect("second");
    assert_ne!(first.run_id, second.run_id);
}
