/*!
 * Single-Flight Guard
 *
 * At most one holder at a time; the slot is released when the guard drops
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared slot that admits one holder at a time
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the slot without blocking
    ///
    /// Returns `None` while another guard is alive.
    pub fn try_acquire(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether a guard is currently held
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// RAII holder of a [`SingleFlight`] slot
#[derive(Debug)]
#[must_use = "the slot is released as soon as the guard is dropped"]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
