/*!
 * Memory Types
 * Snapshots and samples produced by the stats provider
 */

use crate::core::types::Bytes;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory statistics errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Memory statistics unavailable: {0}")]
    #[diagnostic(
        code(memory::unavailable),
        help("The operating system did not report memory counters.")
    )]
    Unavailable(String),

    #[error("Physical memory total reported as zero")]
    #[diagnostic(
        code(memory::no_physical_memory),
        help("The platform may not expose memory totals to this process.")
    )]
    NoPhysicalMemory,
}

/// Used/total/available triple for one memory pool
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total: Bytes,
    pub used: Bytes,
    pub available: Bytes,
    /// Percent in use (0-100)
    pub percent: f64,
}

impl MemoryUsage {
    /// Build from total and available; `used` is what is not available
    pub fn from_available(total: Bytes, available: Bytes) -> Self {
        let available = available.min(total);
        let used = total - available;
        Self {
            total,
            used,
            available,
            percent: percent_of(used, total),
        }
    }

    /// Build from total and used; for pools where nothing else is reported
    pub fn from_used(total: Bytes, used: Bytes) -> Self {
        let used = used.min(total);
        Self {
            total,
            used,
            available: total - used,
            percent: percent_of(used, total),
        }
    }
}

#[inline]
fn percent_of(part: Bytes, total: Bytes) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Physical and swap usage at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub physical: MemoryUsage,
    pub swap: MemoryUsage,
}

impl MemorySnapshot {
    /// Reduce to the two figures the controller measures
    pub fn sample(&self) -> MemorySample {
        MemorySample {
            used_percent: self.physical.percent,
            available_bytes: self.physical.available,
        }
    }

    pub fn pressure(&self) -> MemoryPressure {
        MemoryPressure::from_percent(self.physical.percent)
    }
}

/// Physical usage figures the controller compares before and after a clean
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemorySample {
    pub used_percent: f64,
    pub available_bytes: Bytes,
}

impl MemorySample {
    /// Mean of `samples`; `None` when empty
    pub fn average(samples: &[MemorySample]) -> Option<MemorySample> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let percent_sum: f64 = samples.iter().map(|s| s.used_percent).sum();
        let available_sum: u128 = samples.iter().map(|s| s.available_bytes as u128).sum();

        Some(MemorySample {
            used_percent: percent_sum / count as f64,
            available_bytes: (available_sum / count as u128) as Bytes,
        })
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 95.0 {
            MemoryPressure::Critical
        } else if percent >= 80.0 {
            MemoryPressure::High
        } else if percent >= 60.0 {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
