//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Only [`Arena::try_with_config`](crate::Arena::try_with_config) returns
/// these as values. Everywhere else they are handed to the process-wide
/// [fatal handler](crate::fatal::fatal) and never come back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The system allocator refused to provide a chunk.
    OutOfMemory {
        /// Number of bytes requested from the system.
        requested: usize,
    },
    /// A fixed-capacity arena has no room left for the request.
    CapacityExceeded {
        /// Number of bytes requested (including alignment padding).
        requested: usize,
        /// Bytes still free in the arena at the time of the request.
        remaining: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
    /// Growing would exceed the configured maximum chunk count.
    ChunkLimitReached {
        /// The configured limit.
        limit: usize,
        /// Number of bytes that triggered the growth.
        requested: usize,
    },
    /// A size/alignment pair that no allocation can satisfy
    /// (alignment not a power of two, or size overflows `isize`).
    InvalidLayout {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        align: usize,
    },
    /// An [`ArenaConfig`](crate::ArenaConfig) failed validation.
    InvalidConfig {
        /// Which constraint was violated.
        reason: &'static str,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: system allocator refused {requested} bytes")
            }
            Self::CapacityExceeded {
                requested,
                remaining,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, {remaining} of {capacity} bytes remaining"
                )
            }
            Self::ChunkLimitReached { limit, requested } => {
                write!(
                    f,
                    "arena chunk limit reached: {limit} chunks in use, cannot grow for {requested} bytes"
                )
            }
            Self::InvalidLayout { size, align } => {
                write!(f, "invalid layout: size {size}, align {align}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_all_figures() {
        let err = ArenaError::CapacityExceeded {
            requested: 64,
            remaining: 8,
            capacity: 128,
        };
        assert_eq!(
            err.to_string(),
            "arena capacity exceeded: requested 64 bytes, 8 of 128 bytes remaining"
        );
    }

    #[test]
    fn invalid_config_carries_reason() {
        let err = ArenaError::InvalidConfig {
            reason: "chunk_size must be non-zero",
        };
        assert!(err.to_string().ends_with("chunk_size must be non-zero"));
    }
}
