/*!
 * System Limits and Constants
 *
 * Centralized location for the delays, thresholds and ratios used by the
 * reclamation controller and the monitor loop.
 */

use std::time::Duration;

// =============================================================================
// STEP PACING
// =============================================================================

/// Settle delay after the process working-set trim
pub const WORKING_SET_SETTLE: Duration = Duration::from_millis(500);

/// Settle delay after the system working-set trim
pub const SYSTEM_WORKING_SET_SETTLE: Duration = Duration::from_millis(500);

/// Settle delay after the standby-list sweep
/// Longer than the others: the sweep touches every openable process
pub const STANDBY_LIST_SETTLE: Duration = Duration::from_secs(1);

/// Settle delay after the allocator compaction passes
pub const VIRTUAL_MEMORY_SETTLE: Duration = Duration::from_millis(500);

/// Wait for OS memory counters to stabilize once all steps ran
pub const POST_CLEAN_SETTLE: Duration = Duration::from_secs(2);

/// Number of readings averaged into the "after" figure
pub const AFTER_SAMPLE_COUNT: usize = 3;

/// Gap between consecutive "after" readings
pub const AFTER_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Allocator compaction passes run by the virtual-memory step
pub const HEAP_COMPACT_PASSES: usize = 3;

// =============================================================================
// MONITOR LOOP
// =============================================================================

/// Sampling period of the monitor loop
/// Fixed: `AutoCleanConfig::interval_seconds` does not change it
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Lowest accepted auto-clean threshold (percent used)
pub const MIN_THRESHOLD_PERCENT: u8 = 50;

/// Highest accepted auto-clean threshold (percent used)
pub const MAX_THRESHOLD_PERCENT: u8 = 95;

/// Default auto-clean threshold
pub const DEFAULT_THRESHOLD_PERCENT: u8 = 80;

/// Default auto-clean interval (seconds)
pub const DEFAULT_INTERVAL_SECONDS: u32 = 30;

// =============================================================================
// PROCESS SWEEP
// =============================================================================

/// PIDs never opened by the standby sweep: idle (0) and system (4)
/// The calling process is skipped separately
pub const PROTECTED_PIDS: [u32; 2] = [0, 4];

// =============================================================================
// DISPLAY & REPORTING
// =============================================================================

/// Bytes per gigabyte as shown on cards and in summaries
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// System card share of physical usage
pub const SYSTEM_CARD_RATIO: f64 = 0.4;

/// Working-set card share of physical usage
pub const WORKING_SET_CARD_RATIO: f64 = 0.6;

/// Virtual card total as a multiple of physical total when no swap is configured
pub const VIRTUAL_FALLBACK_MULTIPLIER: u64 = 2;

/// Card fraction at which the level turns to warning
pub const CARD_WARNING_FRACTION: f64 = 0.7;

/// Card fraction at which the level turns to critical
pub const CARD_CRITICAL_FRACTION: f64 = 0.9;

/// Freed amount above which a clean is rated excellent (0.5 GB)
pub const EXCELLENT_FREED_BYTES: i64 = 512 * 1024 * 1024;

/// Freed amount above which a clean is rated good (~0.1 GB)
pub const GOOD_FREED_BYTES: i64 = 107_374_182;

/// Fewer successful steps than this points at unsupported methods
pub const ADVICE_MIN_SUCCESSES: usize = 2;
