/*!
 * Reclamation Types
 * Step selection, pacing and the result of one clean
 */

use crate::core::limits;
use crate::memory::{MemoryError, MemorySample};
use crate::platform::ErrorCode;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Reclamation operation result
pub type ReclaimResult<T> = Result<T, ReclaimError>;

/// Operation-level failures of a clean
///
/// Individual step failures never show up here; they are recorded in the
/// [`CleanResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ReclaimError {
    #[error("Select at least one clean option")]
    #[diagnostic(
        code(reclaim::no_options_selected),
        help("Enable working_set, system_working_set, standby_list or virtual_memory.")
    )]
    NoOptionsSelected,

    #[error("A clean is already running")]
    #[diagnostic(
        code(reclaim::already_running),
        help("Wait for the running clean to finish before starting another.")
    )]
    AlreadyRunning,

    #[error("Measurement error: {0}")]
    #[diagnostic(
        code(reclaim::measurement),
        help("Memory statistics could not be read before or after the clean.")
    )]
    Measurement(#[from] MemoryError),

    #[error("Clean worker failed: {0}")]
    #[diagnostic(code(reclaim::worker), help("The background clean thread could not run."))]
    Worker(String),
}

/// One reclamation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanStep {
    WorkingSet,
    SystemWorkingSet,
    StandbyList,
    VirtualMemory,
}

impl CleanStep {
    /// Execution order, independent of how a selection was built
    pub const ORDER: [CleanStep; 4] = [
        CleanStep::WorkingSet,
        CleanStep::SystemWorkingSet,
        CleanStep::StandbyList,
        CleanStep::VirtualMemory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CleanStep::WorkingSet => "working_set",
            CleanStep::SystemWorkingSet => "system_working_set",
            CleanStep::StandbyList => "standby_list",
            CleanStep::VirtualMemory => "virtual_memory",
        }
    }

    /// Human label used in the activity log
    pub fn label(&self) -> &'static str {
        match self {
            CleanStep::WorkingSet => "Working set",
            CleanStep::SystemWorkingSet => "System working set",
            CleanStep::StandbyList => "Standby list",
            CleanStep::VirtualMemory => "Virtual memory",
        }
    }
}

impl fmt::Display for CleanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which steps a clean runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    pub working_set: bool,
    pub system_working_set: bool,
    pub standby_list: bool,
    pub virtual_memory: bool,
}

impl CleanOptions {
    /// No step selected
    pub const fn none() -> Self {
        Self {
            working_set: false,
            system_working_set: false,
            standby_list: false,
            virtual_memory: false,
        }
    }

    /// Every step selected
    pub const fn all() -> Self {
        Self {
            working_set: true,
            system_working_set: true,
            standby_list: true,
            virtual_memory: true,
        }
    }

    pub fn only(step: CleanStep) -> Self {
        Self::none().with(step, true)
    }

    /// Set one flag
    pub fn with(mut self, step: CleanStep, enabled: bool) -> Self {
        self.set(step, enabled);
        self
    }

    pub fn set(&mut self, step: CleanStep, enabled: bool) {
        match step {
            CleanStep::WorkingSet => self.working_set = enabled,
            CleanStep::SystemWorkingSet => self.system_working_set = enabled,
            CleanStep::StandbyList => self.standby_list = enabled,
            CleanStep::VirtualMemory => self.virtual_memory = enabled,
        }
    }

    pub fn contains(&self, step: CleanStep) -> bool {
        match step {
            CleanStep::WorkingSet => self.working_set,
            CleanStep::SystemWorkingSet => self.system_working_set,
            CleanStep::StandbyList => self.standby_list,
            CleanStep::VirtualMemory => self.virtual_memory,
        }
    }

    /// Selected steps in execution order
    pub fn steps(&self) -> Vec<CleanStep> {
        CleanStep::ORDER
            .into_iter()
            .filter(|step| self.contains(*step))
            .collect()
    }

    pub fn count(&self) -> usize {
        CleanStep::ORDER
            .iter()
            .filter(|step| self.contains(**step))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl Default for CleanOptions {
    /// Everything except the allocator compaction
    fn default() -> Self {
        Self {
            working_set: true,
            system_working_set: true,
            standby_list: true,
            virtual_memory: false,
        }
    }
}

impl FromIterator<CleanStep> for CleanOptions {
    fn from_iter<I: IntoIterator<Item = CleanStep>>(iter: I) -> Self {
        iter.into_iter()
            .fold(CleanOptions::none(), |options, step| options.with(step, true))
    }
}

/// How a failed system working-set call is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Run the no-op fallback and count the step as succeeded
    #[default]
    Lenient,
    /// Count the step as failed and keep the platform error code
    Strict,
}

/// Delays between steps and around the "after" sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub working_set: Duration,
    pub system_working_set: Duration,
    pub standby_list: Duration,
    pub virtual_memory: Duration,
    /// Wait after the last step before sampling
    pub settle: Duration,
    /// Readings averaged into the "after" sample
    pub samples: usize,
    /// Gap between readings
    pub sample_interval: Duration,
}

impl Pacing {
    pub fn new() -> Self {
        Self {
            working_set: limits::WORKING_SET_SETTLE,
            system_working_set: limits::SYSTEM_WORKING_SET_SETTLE,
            standby_list: limits::STANDBY_LIST_SETTLE,
            virtual_memory: limits::VIRTUAL_MEMORY_SETTLE,
            settle: limits::POST_CLEAN_SETTLE,
            samples: limits::AFTER_SAMPLE_COUNT,
            sample_interval: limits::AFTER_SAMPLE_INTERVAL,
        }
    }

    /// No delays at all (testing only)
    pub fn immediate() -> Self {
        Self {
            working_set: Duration::ZERO,
            system_working_set: Duration::ZERO,
            standby_list: Duration::ZERO,
            virtual_memory: Duration::ZERO,
            settle: Duration::ZERO,
            samples: limits::AFTER_SAMPLE_COUNT,
            sample_interval: Duration::ZERO,
        }
    }

    /// Settle delay after `step`
    pub fn after(&self, step: CleanStep) -> Duration {
        match step {
            CleanStep::WorkingSet => self.working_set,
            CleanStep::SystemWorkingSet => self.system_working_set,
            CleanStep::StandbyList => self.standby_list,
            CleanStep::VirtualMemory => self.virtual_memory,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new()
    }
}

/// What started a clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Manual,
    Auto,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Manual => write!(f, "manual"),
            Trigger::Auto => write!(f, "auto"),
        }
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: CleanStep,
    /// `Ok(true)` succeeded, `Ok(false)` ran without effect, `Err` platform failure
    pub status: Result<bool, ErrorCode>,
    /// Processes trimmed by the standby sweep, self included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trimmed: Option<usize>,
    /// Platform error absorbed by a lenient fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<ErrorCode>,
}

impl StepRecord {
    pub fn new(step: CleanStep, status: Result<bool, ErrorCode>) -> Self {
        Self {
            step,
            status,
            trimmed: None,
            fallback_from: None,
        }
    }

    #[inline]
    pub fn succeeded(&self) -> bool {
        matches!(self.status, Ok(true))
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.status.err()
    }
}

/// Measured effect of one clean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanResult {
    pub run_id: Uuid,
    pub before: MemorySample,
    /// Average of the post-clean readings
    pub after: MemorySample,
    /// `after.available_bytes - before.available_bytes`, may be negative
    pub freed_bytes: i64,
    /// Executed steps in execution order
    pub steps: Vec<StepRecord>,
}

impl CleanResult {
    pub fn before_percent(&self) -> f64 {
        self.before.used_percent
    }

    pub fn after_percent(&self) -> f64 {
        self.after.used_percent
    }

    pub fn steps_attempted(&self) -> CleanOptions {
        self.steps.iter().map(|record| record.step).collect()
    }

    pub fn steps_succeeded(&self) -> usize {
        self.steps.iter().filter(|record| record.succeeded()).count()
    }

    /// Success of `step`; `None` when it was not selected
    pub fn step_succeeded(&self, step: CleanStep) -> Option<bool> {
        self.record(step).map(StepRecord::succeeded)
    }

    pub fn record(&self, step: CleanStep) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.step == step)
    }
}

/// Signed difference of available bytes, saturating at the i64 range
pub fn available_delta(before: &MemorySample, after: &MemorySample) -> i64 {
    let delta = after.available_bytes as i128 - before.available_bytes as i128;
    delta.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
