/*!
 * Memory Traits
 * Statistics provider abstraction
 */

use super::types::*;

/// Source of system memory figures
pub trait StatsProvider: Send + Sync {
    /// Current physical and swap usage
    fn snapshot(&self) -> MemoryResult<MemorySnapshot>;

    /// Current physical usage reduced to a sample
    fn sample(&self) -> MemoryResult<MemorySample> {
        self.snapshot().map(|snapshot| snapshot.sample())
    }
}
