/*!
 * Monitoring
 * Periodic sampling, display state, activity log and tracing setup
 */

mod display;
mod log_sink;
mod sampler;
mod tracer;

pub use display::{
    cards_from, CardKind, CardLevel, ConsoleDisplay, DisplayState, DisplaySurface, MemoryCard,
    Status,
};
pub use log_sink::{ActivityLog, ConsoleLogSink, LogSink, MemoryLogSink};
pub use sampler::{AutoCleanConfig, Monitor, MonitorHandle, TickOutcome};
pub use tracer::init_tracing;
