/*!
 * Unix Trim Backend
 *
 * Unix has no working-set API. The calling process can hand free heap pages
 * back through glibc's `malloc_trim`; other processes cannot be trimmed, so
 * the sweep skips every one of them.
 */

use super::traits::TrimPlatform;
use super::types::*;
use crate::core::types::Pid;
use nix::unistd::geteuid;

/// Trim backend for Linux and other Unix systems
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn release_free_heap() -> PlatformResult<()> {
    // SAFETY: malloc_trim only walks glibc's own arenas
    unsafe {
        libc::malloc_trim(0);
    }
    Ok(())
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn release_free_heap() -> PlatformResult<()> {
    Err(ErrorCode::UNSUPPORTED)
}

impl TrimPlatform for UnixPlatform {
    fn current_pid(&self) -> Pid {
        std::process::id()
    }

    fn empty_current_working_set(&self) -> PlatformResult<()> {
        release_free_heap()
    }

    fn trim_system_working_set(&self) -> PlatformResult<()> {
        Err(ErrorCode::UNSUPPORTED)
    }

    fn processes(&self) -> PlatformResult<Vec<ProcessEntry>> {
        Ok(super::enumerate_processes())
    }

    fn trim_process(&self, _pid: Pid) -> TrimAttempt {
        TrimAttempt::Skipped(ErrorCode::UNSUPPORTED)
    }

    fn compact_heap(&self) -> PlatformResult<()> {
        // Nothing to compact outside glibc counts as done
        match release_free_heap() {
            Err(code) if code == ErrorCode::UNSUPPORTED => Ok(()),
            other => other,
        }
    }

    fn is_elevated(&self) -> bool {
        geteuid().is_root()
    }
}
