/*!
 * Reclamation Steps
 * One function per step, each built on the platform trim primitives
 */

use super::types::{CleanStep, FallbackPolicy, StepRecord};
use crate::core::limits::{HEAP_COMPACT_PASSES, PROTECTED_PIDS};
use crate::monitoring::ActivityLog;
use crate::platform::{TrimAttempt, TrimPlatform};
use tracing::{debug, warn};

/// Empty the calling process's working set
pub fn working_set(platform: &dyn TrimPlatform, log: &ActivityLog) -> StepRecord {
    let status = match platform.empty_current_working_set() {
        Ok(()) => {
            log.log("✓ Working set trimmed");
            Ok(true)
        }
        Err(code) => {
            warn!(step = %CleanStep::WorkingSet, %code, "EmptyWorkingSet failed");
            log.log(format!("✗ EmptyWorkingSet failed, {}", code));
            Err(code)
        }
    };
    StepRecord::new(CleanStep::WorkingSet, status)
}

/// System-wide working-set trim with an explicit fallback policy
pub fn system_working_set(
    platform: &dyn TrimPlatform,
    policy: FallbackPolicy,
    log: &ActivityLog,
) -> StepRecord {
    let code = match platform.trim_system_working_set() {
        Ok(()) => {
            log.log("✓ System working set trimmed");
            return StepRecord::new(CleanStep::SystemWorkingSet, Ok(true));
        }
        Err(code) => code,
    };

    warn!(step = %CleanStep::SystemWorkingSet, %code, ?policy, "SetProcessWorkingSetSize failed");
    match policy {
        FallbackPolicy::Lenient => {
            log.log(format!(
                "⚠ System working set call failed ({}), fallback counted as done",
                code
            ));
            let mut record = StepRecord::new(CleanStep::SystemWorkingSet, Ok(true));
            record.fallback_from = Some(code);
            record
        }
        FallbackPolicy::Strict => {
            log.log(format!("✗ System working set trim failed, {}", code));
            StepRecord::new(CleanStep::SystemWorkingSet, Err(code))
        }
    }
}

/// Trim self, then every other process that can be opened
///
/// Succeeds when at least one trim went through. Processes that cannot be
/// opened are skipped without counting as failures.
pub fn standby_list(platform: &dyn TrimPlatform, log: &ActivityLog) -> StepRecord {
    let mut trimmed = 0usize;

    match platform.empty_current_working_set() {
        Ok(()) => trimmed += 1,
        Err(code) => debug!(%code, "self trim failed during standby sweep"),
    }

    let self_pid = platform.current_pid();
    match platform.processes() {
        Ok(processes) => {
            for process in processes {
                if process.pid == self_pid || PROTECTED_PIDS.contains(&process.pid) {
                    continue;
                }
                match platform.trim_process(process.pid) {
                    TrimAttempt::Trimmed => trimmed += 1,
                    TrimAttempt::Skipped(_) => {}
                    TrimAttempt::Failed(code) => {
                        debug!(pid = process.pid, name = %process.name, %code, "trim failed");
                    }
                }
            }
        }
        Err(code) => warn!(%code, "process enumeration failed, sweep limited to self"),
    }

    log.log(format!("✓ Standby list sweep done, {} processes trimmed", trimmed));
    let mut record = StepRecord::new(CleanStep::StandbyList, Ok(trimmed > 0));
    record.trimmed = Some(trimmed);
    record
}

/// Return free allocator memory to the OS, several passes in a row
pub fn virtual_memory(platform: &dyn TrimPlatform, log: &ActivityLog) -> StepRecord {
    for pass in 0..HEAP_COMPACT_PASSES {
        if let Err(code) = platform.compact_heap() {
            warn!(step = %CleanStep::VirtualMemory, pass, %code, "heap compaction failed");
            log.log(format!("✗ Virtual memory optimization failed, {}", code));
            return StepRecord::new(CleanStep::VirtualMemory, Err(code));
        }
    }
    log.log("✓ Virtual memory optimization done");
    StepRecord::new(CleanStep::VirtualMemory, Ok(true))
}
