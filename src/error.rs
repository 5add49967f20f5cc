//! Error types for the fifomap library.
//!
//! ## Key Components
//!
//! - [`CapacityError`]: Returned when a requested map capacity is invalid
//!   (zero).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use fifomap::error::CapacityError;
//! use fifomap::FifoMap;
//!
//! // Fallible constructor for user-supplied capacities
//! let map: Result<FifoMap<String, i32>, CapacityError> = FifoMap::try_new(100);
//! assert!(map.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad = FifoMap::<String, i32>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// CapacityError
// ---------------------------------------------------------------------------

/// Error returned when a requested map capacity is invalid.
///
/// Produced by fallible constructors such as
/// [`FifoMap::try_new`](crate::FifoMap::try_new) and
/// [`FifoMap::try_with_entries`](crate::FifoMap::try_with_entries). Carries a
/// human-readable description of the rejected parameter.
///
/// # Example
///
/// ```
/// use fifomap::FifoMap;
///
/// let err = FifoMap::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityError(String);

impl CapacityError {
    /// Creates a new `CapacityError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CapacityError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal map invariants are violated.
///
/// Produced by the debug-only
/// [`FifoMap::check_invariants`](crate::FifoMap::check_invariants) method.
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
