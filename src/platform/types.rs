/*!
 * Platform Types
 * Error codes and process records shared by the trim backends
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform call result
pub type PlatformResult<T> = Result<T, ErrorCode>;

/// Raw error number reported by a failed platform call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    /// The backend has no such primitive (ERROR_NOT_SUPPORTED)
    pub const UNSUPPORTED: ErrorCode = ErrorCode(50);

    /// Access to the target was refused (ERROR_ACCESS_DENIED)
    pub const ACCESS_DENIED: ErrorCode = ErrorCode(5);

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error code {}", self.0)
    }
}

/// One running process as seen by the enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: Pid,
    pub name: String,
}

impl ProcessEntry {
    pub fn new(pid: Pid, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Outcome of trimming another process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimAttempt {
    /// Working set emptied
    Trimmed,
    /// Process could not be opened (access denied, already exited)
    Skipped(ErrorCode),
    /// Opened but the trim call failed
    Failed(ErrorCode),
}

impl TrimAttempt {
    #[inline]
    pub fn is_trimmed(&self) -> bool {
        matches!(self, TrimAttempt::Trimmed)
    }
}
