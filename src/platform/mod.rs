/*!
 * Platform Module
 * Memory reclamation primitives of the host operating system
 */

pub mod traits;
pub mod types;

#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

pub use traits::TrimPlatform;
pub use types::*;

use std::sync::Arc;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Trim backend for the host operating system
pub fn native() -> Arc<dyn TrimPlatform> {
    #[cfg(windows)]
    {
        Arc::new(windows::WindowsPlatform::new())
    }
    #[cfg(unix)]
    {
        Arc::new(unix::UnixPlatform::new())
    }
}

/// Running processes as (pid, name) pairs
pub(crate) fn enumerate_processes() -> Vec<ProcessEntry> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing(),
    );

    let mut entries: Vec<ProcessEntry> = system
        .processes()
        .iter()
        .map(|(pid, process)| {
            ProcessEntry::new(pid.as_u32(), process.name().to_string_lossy())
        })
        .collect();
    entries.sort_by_key(|entry| entry.pid);
    entries
}
