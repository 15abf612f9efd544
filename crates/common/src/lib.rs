//! Shared types for the laundry order tracker.
//!
//! Everything time-related flows through [`EpochMillis`] and the injected
//! [`Clock`], so license and order-code logic can be tested with a
//! [`ManualClock`].

pub mod clock;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use types::{EpochMillis, MILLIS_PER_DAY};
