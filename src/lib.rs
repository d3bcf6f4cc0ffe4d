/*!
 * memtrim Library
 * Live memory statistics and working-set reclamation exposed as a library
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod platform;
pub mod reclaim;

// Re-exports
pub use crate::core::errors::{CleanerError, CleanerResult};
pub use crate::core::CleanerConfig;
pub use memory::{MemorySample, MemorySnapshot, StatsProvider, SystemStats};
pub use monitoring::{init_tracing, ActivityLog, AutoCleanConfig, Monitor};
pub use platform::TrimPlatform;
pub use reclaim::{
    CleanDispatcher, CleanOptions, CleanResult, CleanStep, ReclaimController, ReclaimError,
};
