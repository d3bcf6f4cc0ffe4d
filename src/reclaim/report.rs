/*!
 * Clean Reporting
 * Verdicts, advice and the summary lines appended to the activity log
 */

use super::types::CleanResult;
use crate::core::limits::{ADVICE_MIN_SUCCESSES, EXCELLENT_FREED_BYTES, GOOD_FREED_BYTES};
use crate::core::types::to_gb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative rating of the freed amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Excellent,
    Good,
    Limited,
    NoEffect,
}

impl Effect {
    pub fn from_freed(freed_bytes: i64) -> Self {
        if freed_bytes > EXCELLENT_FREED_BYTES {
            Effect::Excellent
        } else if freed_bytes > GOOD_FREED_BYTES {
            Effect::Good
        } else if freed_bytes > 0 {
            Effect::Limited
        } else {
            Effect::NoEffect
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Excellent => write!(f, "✅ Excellent result"),
            Effect::Good => write!(f, "✅ Good result"),
            Effect::Limited => write!(f, "⚠ Limited result"),
            Effect::NoEffect => write!(f, "❌ No effect"),
        }
    }
}

/// Hint shown when a clean had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advice {
    RunElevated,
    MethodsUnsupported,
    AlreadyOptimized,
}

impl Advice {
    /// Advice for `result`, `None` when the clean freed something
    pub fn for_result(result: &CleanResult, elevated: bool) -> Option<Self> {
        if Effect::from_freed(result.freed_bytes) != Effect::NoEffect {
            return None;
        }
        Some(if !elevated {
            Advice::RunElevated
        } else if result.steps_succeeded() < ADVICE_MIN_SUCCESSES {
            Advice::MethodsUnsupported
        } else {
            Advice::AlreadyOptimized
        })
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::RunElevated => write!(f, "💡 Hint: run with administrator privileges"),
            Advice::MethodsUnsupported => {
                write!(f, "💡 Hint: some clean methods may not apply to this system")
            }
            Advice::AlreadyOptimized => {
                write!(f, "💡 Hint: memory already looks optimized, nothing left to clean")
            }
        }
    }
}

/// Lines appended to the activity log once a clean finished
pub fn summary_lines(result: &CleanResult, elevated: bool) -> Vec<String> {
    let mut lines = vec![
        "Memory clean finished".to_string(),
        format!(
            "    Physical memory: {:.1}% → {:.1}%",
            result.before_percent(),
            result.after_percent()
        ),
        format!("    Freed: {:.2} GB", to_gb(result.freed_bytes as f64)),
        format!(
            "    Succeeded: {}/{}",
            result.steps_succeeded(),
            result.steps.len()
        ),
        Effect::from_freed(result.freed_bytes).to_string(),
    ];
    if let Some(advice) = Advice::for_result(result, elevated) {
        lines.push(advice.to_string());
    }
    lines
}
