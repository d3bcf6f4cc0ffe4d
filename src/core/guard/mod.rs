/*!
 * RAII Resource Guards
 *
 * ## Guard Types
 *
 * - **FlightGuard**: exclusive slot for a running clean
 *
 * ## Example
 *
 * ```rust
 * use memtrim::core::guard::SingleFlight;
 *
 * let flight = SingleFlight::new();
 * let guard = flight.try_acquire().expect("slot is free");
 * assert!(flight.try_acquire().is_none());
 * drop(guard);
 * assert!(!flight.is_busy());
 * ```
 */

mod flight;

pub use flight::{FlightGuard, SingleFlight};
