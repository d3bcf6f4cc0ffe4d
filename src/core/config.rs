/*!
 * Cleaner Configuration
 *
 * Defaults come from `core::limits`; `from_env()` overlays:
 * - MEMTRIM_AUTO: arm the threshold-triggered clean (1/true/0/false)
 * - MEMTRIM_THRESHOLD: auto-clean threshold in percent (50-95)
 * - MEMTRIM_INTERVAL: auto-clean interval in seconds
 * - MEMTRIM_STRICT_FALLBACK: count a failed system working-set call as failed
 */

use crate::monitoring::AutoCleanConfig;
use crate::reclaim::{CleanOptions, FallbackPolicy, Pacing};
use miette::Diagnostic;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Threshold {value}% outside {min}-{max}%")]
    #[diagnostic(
        code(config::threshold_out_of_range),
        help("Pick an auto-clean threshold between 50 and 95 percent.")
    )]
    ThresholdOutOfRange { value: u8, min: u8, max: u8 },

    #[error("Invalid value {value:?} for {var}")]
    #[diagnostic(code(config::invalid_env), help("Check the environment variable's format."))]
    InvalidEnv { var: &'static str, value: String },
}

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CleanerConfig {
    pub options: CleanOptions,
    pub auto_clean: AutoCleanConfig,
    pub pacing: Pacing,
    pub fallback: FallbackPolicy,
}

impl CleanerConfig {
    pub fn new() -> Self {
        Self {
            options: CleanOptions::default(),
            auto_clean: AutoCleanConfig::default(),
            pacing: Pacing::new(),
            fallback: FallbackPolicy::default(),
        }
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new().with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides looked up through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(enabled) = parse_var::<Flag>(&lookup, "MEMTRIM_AUTO")? {
            self.auto_clean.enabled = enabled.0;
        }
        if let Some(threshold) = parse_var::<u8>(&lookup, "MEMTRIM_THRESHOLD")? {
            self.auto_clean.threshold_percent = threshold;
        }
        if let Some(interval) = parse_var::<u32>(&lookup, "MEMTRIM_INTERVAL")? {
            self.auto_clean.interval_seconds = interval;
        }
        if let Some(strict) = parse_var::<Flag>(&lookup, "MEMTRIM_STRICT_FALLBACK")? {
            self.fallback = if strict.0 {
                FallbackPolicy::Strict
            } else {
                FallbackPolicy::Lenient
            };
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auto_clean.validate()
    }
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Boolean accepting 1/0/true/false/yes/no
struct Flag(bool);

impl FromStr for Flag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Flag(true)),
            "0" | "false" | "no" | "off" => Ok(Flag(false)),
            _ => Err(()),
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
