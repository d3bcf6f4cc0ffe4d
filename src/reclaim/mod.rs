/*!
 * Reclamation Module
 * Working-set trimming and its measured effect
 */

pub mod controller;
pub mod dispatch;
pub mod report;
pub mod steps;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use controller::ReclaimController;
pub use dispatch::{CleanDispatcher, CleanEvent};
pub use report::{summary_lines, Advice, Effect};
pub use traits::*;
pub use types::*;
