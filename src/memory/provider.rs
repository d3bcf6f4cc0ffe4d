/*!
 * System Stats Provider
 * Physical and swap figures read through sysinfo
 */

use super::traits::StatsProvider;
use super::types::*;
use parking_lot::Mutex;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// Stats provider backed by the operating system
pub struct SystemStats {
    system: Mutex<System>,
}

impl SystemStats {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for SystemStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsProvider for SystemStats {
    fn snapshot(&self) -> MemoryResult<MemorySnapshot> {
        let mut system = self.system.lock();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(MemoryError::NoPhysicalMemory);
        }

        Ok(MemorySnapshot {
            physical: MemoryUsage::from_available(total, system.available_memory()),
            swap: MemoryUsage::from_used(system.total_swap(), system.used_swap()),
        })
    }
}
