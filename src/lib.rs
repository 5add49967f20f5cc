//! fifomap: a bounded key-value map with FIFO eviction.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod error;
pub mod map;
pub mod order;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;

pub use crate::error::CapacityError;
pub use crate::map::FifoMap;
