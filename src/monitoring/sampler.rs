/*!
 * Periodic Sampler
 *
 * Reads memory once per period, refreshes the display and arms the
 * threshold-triggered clean. Completion of a clean is applied here too, so
 * the display state has a single owner.
 */

use super::display::{DisplayState, DisplaySurface, Status};
use super::log_sink::ActivityLog;
use crate::core::config::ConfigError;
use crate::core::limits::{
    DEFAULT_INTERVAL_SECONDS, DEFAULT_THRESHOLD_PERCENT, MAX_THRESHOLD_PERCENT,
    MIN_THRESHOLD_PERCENT, SAMPLE_PERIOD,
};
use crate::memory::{MemorySample, StatsProvider};
use crate::reclaim::{summary_lines, CleanEvent, CleanLauncher, CleanOptions, ReclaimError, Trigger};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Threshold-triggered clean settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCleanConfig {
    pub enabled: bool,
    /// Used-percent above which a clean starts (50-95)
    pub threshold_percent: u8,
    /// Kept for configuration compatibility; the sampler period is fixed
    pub interval_seconds: u32,
}

impl AutoCleanConfig {
    pub fn new(enabled: bool, threshold_percent: u8) -> Result<Self, ConfigError> {
        let config = Self {
            enabled,
            threshold_percent,
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_THRESHOLD_PERCENT..=MAX_THRESHOLD_PERCENT).contains(&self.threshold_percent) {
            return Err(ConfigError::ThresholdOutOfRange {
                value: self.threshold_percent,
                min: MIN_THRESHOLD_PERCENT,
                max: MAX_THRESHOLD_PERCENT,
            });
        }
        Ok(())
    }

    /// Whether `sample` should start a clean
    #[inline]
    pub fn should_trigger(&self, sample: &MemorySample) -> bool {
        self.enabled && sample.used_percent > f64::from(self.threshold_percent)
    }
}

impl Default for AutoCleanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
        }
    }
}

/// Result of one sampler tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// `None` when the stats read failed
    pub sample: Option<MemorySample>,
    /// A clean was launched during this tick
    pub triggered: bool,
}

/// Cloneable control surface of a running [`Monitor`]
#[derive(Clone)]
pub struct MonitorHandle {
    options: Arc<RwLock<CleanOptions>>,
    auto: Arc<RwLock<AutoCleanConfig>>,
    requests: flume::Sender<()>,
}

impl MonitorHandle {
    /// Ask the monitor loop for a manual clean
    pub fn request_clean(&self) {
        let _ = self.requests.send(());
    }

    pub fn options(&self) -> CleanOptions {
        *self.options.read()
    }

    pub fn set_options(&self, options: CleanOptions) {
        *self.options.write() = options;
    }

    pub fn auto_clean(&self) -> AutoCleanConfig {
        *self.auto.read()
    }

    pub fn set_auto_clean(&self, config: AutoCleanConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.auto.write() = config;
        Ok(())
    }
}

/// Owner of the display state and driver of the sampling period
pub struct Monitor {
    stats: Arc<dyn StatsProvider>,
    launcher: Arc<dyn CleanLauncher>,
    display: Box<dyn DisplaySurface>,
    log: ActivityLog,
    state: DisplayState,
    options: Arc<RwLock<CleanOptions>>,
    auto: Arc<RwLock<AutoCleanConfig>>,
    requests_tx: flume::Sender<()>,
    requests: flume::Receiver<()>,
    period: Duration,
}

impl Monitor {
    pub fn new(
        stats: Arc<dyn StatsProvider>,
        launcher: Arc<dyn CleanLauncher>,
        display: Box<dyn DisplaySurface>,
        log: ActivityLog,
        elevated: bool,
    ) -> Self {
        let (requests_tx, requests) = flume::unbounded();
        Self {
            stats,
            launcher,
            display,
            log,
            state: DisplayState::new(elevated),
            options: Arc::new(RwLock::new(CleanOptions::default())),
            auto: Arc::new(RwLock::new(AutoCleanConfig::default())),
            requests_tx,
            requests,
            period: SAMPLE_PERIOD,
        }
    }

    pub fn with_options(self, options: CleanOptions) -> Self {
        *self.options.write() = options;
        self
    }

    pub fn with_auto_clean(self, config: AutoCleanConfig) -> Self {
        *self.auto.write() = config;
        self
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            options: Arc::clone(&self.options),
            auto: Arc::clone(&self.auto),
            requests: self.requests_tx.clone(),
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Sample once, refresh the display and launch at most one auto clean
    pub fn tick(&mut self) -> TickOutcome {
        let snapshot = match self.stats.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "memory sampling failed");
                self.log.log(format!("Error updating memory info: {}", e));
                return TickOutcome {
                    sample: None,
                    triggered: false,
                };
            }
        };

        self.state.update_cards(&snapshot);
        self.display.render(&self.state);

        let sample = snapshot.sample();
        let auto = *self.auto.read();
        let triggered = auto.should_trigger(&sample) && self.launch(Trigger::Auto);

        TickOutcome {
            sample: Some(sample),
            triggered,
        }
    }

    /// Manual clean with the configured options
    pub fn request_clean(&mut self) -> bool {
        self.launch(Trigger::Manual)
    }

    fn launch(&mut self, trigger: Trigger) -> bool {
        let options = *self.options.read();
        match self.launcher.launch(options, trigger) {
            Ok(()) => {
                info!(%trigger, "clean launched");
                true
            }
            Err(ReclaimError::NoOptionsSelected) => {
                self.log.log("⚠ Select at least one clean option!");
                false
            }
            Err(ReclaimError::AlreadyRunning) if trigger == Trigger::Auto => {
                debug!("auto clean skipped, previous clean still running");
                false
            }
            Err(e) => {
                self.log.log(format!("Clean not started: {}", e));
                false
            }
        }
    }

    /// Apply progress reported by the clean worker
    pub fn apply(&mut self, event: CleanEvent) {
        match event {
            CleanEvent::Started { trigger, options } => {
                self.state.status = Status::Cleaning;
                self.log.log(format!(
                    "Starting {} clean: {}",
                    trigger,
                    options
                        .steps()
                        .iter()
                        .map(|step| step.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            CleanEvent::Finished { result, .. } => {
                self.state.status = Status::Monitoring;
                self.log.log_all(summary_lines(&result, self.state.elevated));
            }
            CleanEvent::Failed { error, .. } => {
                self.state.status = Status::Error;
                self.log.log(format!("Clean failed: {}", error));
            }
        }
        self.display.render(&self.state);
    }

    /// Drive ticks, clean events and manual requests until `shutdown` resolves
    pub async fn run<F>(mut self, events: flume::Receiver<CleanEvent>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let requests = self.requests.clone();
        info!(period_ms = self.period.as_millis() as u64, "monitor loop started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    self.tick();
                }
                Ok(event) = events.recv_async() => self.apply(event),
                Ok(()) = requests.recv_async() => {
                    self.request_clean();
                }
            }
        }

        info!("monitor loop stopped");
    }
}
