/*!
 * Clean Dispatcher
 *
 * Runs cleans on a background worker thread, one at a time, and reports
 * their completion over a channel so the monitor loop can apply it.
 */

use super::controller::ReclaimController;
use super::traits::CleanLauncher;
use super::types::*;
use crate::core::guard::SingleFlight;
use std::sync::Arc;
use tracing::{debug, error};

/// Worker thread name
const WORKER_NAME: &str = "memtrim-clean";

/// Progress of a dispatched clean
#[derive(Debug, Clone)]
pub enum CleanEvent {
    Started {
        trigger: Trigger,
        options: CleanOptions,
    },
    Finished {
        trigger: Trigger,
        result: CleanResult,
    },
    Failed {
        trigger: Trigger,
        error: ReclaimError,
    },
}

/// Single-flight launcher for [`ReclaimController::clean`]
#[derive(Clone)]
pub struct CleanDispatcher {
    controller: Arc<ReclaimController>,
    flight: SingleFlight,
    events: flume::Sender<CleanEvent>,
}

impl CleanDispatcher {
    /// Create a dispatcher and the receiving end of its events
    pub fn new(controller: Arc<ReclaimController>) -> (Self, flume::Receiver<CleanEvent>) {
        let (events, receiver) = flume::unbounded();
        let dispatcher = Self {
            controller,
            flight: SingleFlight::new(),
            events,
        };
        (dispatcher, receiver)
    }

    /// Whether a clean is running right now
    pub fn is_busy(&self) -> bool {
        self.flight.is_busy()
    }

    pub fn controller(&self) -> &Arc<ReclaimController> {
        &self.controller
    }
}

impl CleanLauncher for CleanDispatcher {
    fn launch(&self, options: CleanOptions, trigger: Trigger) -> ReclaimResult<()> {
        if options.is_empty() {
            return Err(ReclaimError::NoOptionsSelected);
        }
        let Some(guard) = self.flight.try_acquire() else {
            debug!(%trigger, "clean already running");
            return Err(ReclaimError::AlreadyRunning);
        };

        // A closed receiver only means nobody listens any more
        let _ = self.events.send(CleanEvent::Started { trigger, options });

        let controller = Arc::clone(&self.controller);
        let events = self.events.clone();
        std::thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let outcome = controller.clean(options);
                // Free the slot before reporting so a listener may relaunch at once
                drop(guard);
                let event = match outcome {
                    Ok(result) => CleanEvent::Finished { trigger, result },
                    Err(error) => {
                        error!(%trigger, %error, "clean failed");
                        CleanEvent::Failed { trigger, error }
                    }
                };
                let _ = events.send(event);
            })
            .map_err(|e| {
                let error = ReclaimError::Worker(e.to_string());
                let _ = self.events.send(CleanEvent::Failed {
                    trigger,
                    error: error.clone(),
                });
                error
            })?;

        Ok(())
    }
}
