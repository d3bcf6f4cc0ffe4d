/*!
 * Memory Module
 * System memory statistics
 */

pub mod provider;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use provider::SystemStats;
pub use traits::*;
pub use types::*;
