/*!
 * Reclamation Controller
 *
 * Runs the selected steps in fixed order and measures their effect:
 * 1. "before" sample
 * 2. each selected step, followed by its settle delay
 * 3. post-clean settle
 * 4. averaged "after" samples
 * 5. signed available-memory delta
 */

use super::steps;
use super::traits::{Sleeper, ThreadSleeper};
use super::types::*;
use crate::memory::{MemorySample, StatsProvider};
use crate::monitoring::ActivityLog;
use crate::platform::TrimPlatform;
use std::sync::Arc;
use tracing::{info, info_span};
use uuid::Uuid;

/// Orchestrates trim steps and before/after measurement
pub struct ReclaimController {
    stats: Arc<dyn StatsProvider>,
    platform: Arc<dyn TrimPlatform>,
    sleeper: Arc<dyn Sleeper>,
    pacing: Pacing,
    fallback: FallbackPolicy,
    log: ActivityLog,
}

impl ReclaimController {
    pub fn new(
        stats: Arc<dyn StatsProvider>,
        platform: Arc<dyn TrimPlatform>,
        log: ActivityLog,
    ) -> Self {
        Self {
            stats,
            platform,
            sleeper: Arc::new(ThreadSleeper),
            pacing: Pacing::new(),
            fallback: FallbackPolicy::default(),
            log,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    pub fn platform(&self) -> &Arc<dyn TrimPlatform> {
        &self.platform
    }

    /// Run one clean of `options`
    ///
    /// Step failures are recorded in the result. Only an empty selection or a
    /// failed measurement is returned as an error.
    pub fn clean(&self, options: CleanOptions) -> ReclaimResult<CleanResult> {
        if options.is_empty() {
            return Err(ReclaimError::NoOptionsSelected);
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("clean", run_id = %run_id);
        let _entered = span.enter();

        let before = self.stats.sample()?;
        info!(
            used_percent = before.used_percent,
            available = before.available_bytes,
            "clean started"
        );
        self.log.log(format!(
            "Before clean - used: {:.1}%, available: {:.2} GB",
            before.used_percent,
            crate::core::types::to_gb(before.available_bytes as f64)
        ));

        let mut records = Vec::with_capacity(options.count());
        for step in options.steps() {
            records.push(self.run_step(step));
            self.sleeper.sleep(self.pacing.after(step));
        }

        self.sleeper.sleep(self.pacing.settle);
        let after = self.measure_after()?;
        let freed_bytes = available_delta(&before, &after);

        let result = CleanResult {
            run_id,
            before,
            after,
            freed_bytes,
            steps: records,
        };
        info!(
            after_percent = after.used_percent,
            freed_bytes,
            succeeded = result.steps_succeeded(),
            attempted = result.steps.len(),
            "clean finished"
        );
        Ok(result)
    }

    fn run_step(&self, step: CleanStep) -> StepRecord {
        let platform = self.platform.as_ref();
        match step {
            CleanStep::WorkingSet => steps::working_set(platform, &self.log),
            CleanStep::SystemWorkingSet => {
                steps::system_working_set(platform, self.fallback, &self.log)
            }
            CleanStep::StandbyList => steps::standby_list(platform, &self.log),
            CleanStep::VirtualMemory => steps::virtual_memory(platform, &self.log),
        }
    }

    /// Average of `pacing.samples` readings, `sample_interval` apart
    fn measure_after(&self) -> ReclaimResult<MemorySample> {
        let count = self.pacing.samples.max(1);
        let mut samples = Vec::with_capacity(count);
        for i in 0..count {
            if i > 0 {
                self.sleeper.sleep(self.pacing.sample_interval);
            }
            samples.push(self.stats.sample()?);
        }
        // count >= 1, so the average always exists
        Ok(MemorySample::average(&samples).unwrap_or_default())
    }
}
