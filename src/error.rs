//! Error types for the fifokit library.
//!
//! The engine is a pure data structure, so the taxonomy is narrow:
//!
//! - [`ConfigError`]: invalid construction parameters (zero capacity).
//! - [`InvariantError`]: internal-consistency report from the debug-only
//!   `check_invariants` method.
//!
//! Popping an empty queue is deliberately *not* an error type: the engine
//! checks queue sizes on every eviction path, so an empty pop indicates a
//! size-bookkeeping bug and is treated as fatal (`expect`), never as a
//! recoverable condition.
//!
//! ## Example Usage
//!
//! ```
//! use fifokit::error::ConfigError;
//! use fifokit::policy::s3_fifo::S3FifoCache;
//!
//! let cache: Result<S3FifoCache<String, i32>, ConfigError> = S3FifoCache::try_new(100);
//! assert!(cache.is_ok());
//!
//! let err = S3FifoCache::<String, i32>::try_new(0).unwrap_err();
//! assert!(err.to_string().contains("capacity"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache construction parameters are invalid.
///
/// Produced by [`S3FifoCache::try_new`](crate::policy::s3_fifo::S3FifoCache::try_new).
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
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

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by the debug-only
/// [`S3FifoCache::check_invariants`](crate::policy::s3_fifo::S3FifoCache::check_invariants).
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
