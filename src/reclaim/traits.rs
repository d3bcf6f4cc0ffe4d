/*!
 * Reclamation Traits
 */

use super::types::{CleanOptions, ReclaimResult, Trigger};
use std::time::Duration;

/// Blocking pause between steps
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    #[inline]
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Starts a clean without waiting for it
pub trait CleanLauncher: Send + Sync {
    /// Start a clean of `options`
    ///
    /// Fails immediately on an empty selection or while another clean runs.
    fn launch(&self, options: CleanOptions, trigger: Trigger) -> ReclaimResult<()>;
}
