/*!
 * Core Types
 * Common types used across the crate
 */

/// Process ID type
pub type Pid = u32;

/// Byte count reported by the stats provider
pub type Bytes = u64;

/// Convert a byte count to gigabytes for display
#[inline]
pub fn to_gb(bytes: f64) -> f64 {
    bytes / super::limits::BYTES_PER_GB
}
