/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

pub use super::config::ConfigError;
pub use crate::memory::MemoryError;
pub use crate::reclaim::ReclaimError;

/// Unified error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum CleanerError {
    #[error("Memory error: {0}")]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error("Clean error: {0}")]
    #[diagnostic(transparent)]
    Reclaim(#[from] ReclaimError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    #[diagnostic(code(cleaner::io))]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(cleaner::json))]
    Json(#[from] serde_json::Error),
}

/// Common result type
pub type CleanerResult<T> = Result<T, CleanerError>;
