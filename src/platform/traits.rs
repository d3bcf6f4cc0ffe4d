/*!
 * Platform Traits
 * Operating-system memory reclamation primitives
 */

use super::types::*;
use crate::core::types::Pid;

/// Trim primitives the reclamation steps are built from
///
/// Every call is independently fallible; none of them panics on failure.
pub trait TrimPlatform: Send + Sync {
    /// PID of the calling process
    fn current_pid(&self) -> Pid;

    /// Empty the working set of the calling process
    fn empty_current_working_set(&self) -> PlatformResult<()>;

    /// Set-working-set-size on the sentinel handle with minimum and maximum
    /// of -1, meaning "trim to minimum"
    fn trim_system_working_set(&self) -> PlatformResult<()>;

    /// Running processes, system-wide
    fn processes(&self) -> PlatformResult<Vec<ProcessEntry>>;

    /// Open `pid` with quota and query rights, empty its working set and close
    /// the handle again
    fn trim_process(&self, pid: Pid) -> TrimAttempt;

    /// Return free allocator memory of the calling process to the OS
    fn compact_heap(&self) -> PlatformResult<()>;

    /// Whether the calling process runs elevated
    fn is_elevated(&self) -> bool;
}
