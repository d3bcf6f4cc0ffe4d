/*!
 * Windows Trim Backend
 * psapi/kernel32 working-set calls through windows-sys
 */

use super::traits::TrimPlatform;
use super::types::*;
use crate::core::types::Pid;
use tracing::debug;
use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, HANDLE};
use windows_sys::Win32::System::Memory::{GetProcessHeap, HeapCompact};
use windows_sys::Win32::System::ProcessStatus::EmptyWorkingSet;
use windows_sys::Win32::System::Threading::{
    GetCurrentProcess, OpenProcess, SetProcessWorkingSetSize, PROCESS_QUERY_INFORMATION,
    PROCESS_SET_QUOTA,
};
use windows_sys::Win32::UI::Shell::IsUserAnAdmin;

/// Pseudo-handle passed to set-working-set-size for the system-wide trim
const SENTINEL_HANDLE: isize = -1;

/// Minimum/maximum size meaning "trim to minimum"
const TRIM_TO_MINIMUM: usize = usize::MAX;

#[inline]
fn last_error() -> ErrorCode {
    // SAFETY: reads the calling thread's last-error value
    ErrorCode(unsafe { GetLastError() })
}

/// Process handle closed on drop
struct OwnedProcess {
    handle: HANDLE,
}

impl OwnedProcess {
    /// Open `pid` with the rights needed to change its working set
    fn open(pid: Pid) -> PlatformResult<Self> {
        // SAFETY: plain FFI call; a null return is handled below
        let handle = unsafe { OpenProcess(PROCESS_SET_QUOTA | PROCESS_QUERY_INFORMATION, 0, pid) };
        if handle.is_null() {
            Err(last_error())
        } else {
            Ok(Self { handle })
        }
    }

    fn empty_working_set(&self) -> PlatformResult<()> {
        // SAFETY: handle is open for the lifetime of self
        if unsafe { EmptyWorkingSet(self.handle) } != 0 {
            Ok(())
        } else {
            Err(last_error())
        }
    }
}

impl Drop for OwnedProcess {
    fn drop(&mut self) {
        // SAFETY: handle came from OpenProcess and is closed exactly once
        if unsafe { CloseHandle(self.handle) } == 0 {
            debug!(code = %last_error(), "CloseHandle failed");
        }
    }
}

/// Trim backend for Windows
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl TrimPlatform for WindowsPlatform {
    fn current_pid(&self) -> Pid {
        std::process::id()
    }

    fn empty_current_working_set(&self) -> PlatformResult<()> {
        // SAFETY: the current-process pseudo-handle needs no closing
        let ok = unsafe { EmptyWorkingSet(GetCurrentProcess()) };
        if ok != 0 {
            Ok(())
        } else {
            Err(last_error())
        }
    }

    fn trim_system_working_set(&self) -> PlatformResult<()> {
        // SAFETY: sentinel pseudo-handle with "trim to minimum" sizes
        let ok = unsafe {
            SetProcessWorkingSetSize(SENTINEL_HANDLE as HANDLE, TRIM_TO_MINIMUM, TRIM_TO_MINIMUM)
        };
        if ok != 0 {
            Ok(())
        } else {
            Err(last_error())
        }
    }

    fn processes(&self) -> PlatformResult<Vec<ProcessEntry>> {
        Ok(super::enumerate_processes())
    }

    fn trim_process(&self, pid: Pid) -> TrimAttempt {
        let process = match OwnedProcess::open(pid) {
            Ok(process) => process,
            Err(code) => return TrimAttempt::Skipped(code),
        };
        match process.empty_working_set() {
            Ok(()) => TrimAttempt::Trimmed,
            Err(code) => TrimAttempt::Failed(code),
        }
    }

    fn compact_heap(&self) -> PlatformResult<()> {
        // SAFETY: the process heap handle is owned by the OS and never closed
        unsafe {
            let heap = GetProcessHeap();
            if heap.is_null() {
                return Err(last_error());
            }
            if HeapCompact(heap, 0) == 0 {
                let code = last_error();
                // Zero with no error set means no free block was left
                if code.raw() != 0 {
                    return Err(code);
                }
            }
        }
        Ok(())
    }

    fn is_elevated(&self) -> bool {
        // SAFETY: no arguments, returns a BOOL
        unsafe { IsUserAnAdmin() != 0 }
    }
}
