//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the chunked [`Arena`](crate::Arena).
///
/// Controls chunk sizing, the growth limit, and whether fresh allocations
/// are zeroed. Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each regular chunk in bytes.
    ///
    /// Default: 65_536 (64KB). Requests larger than this get a dedicated
    /// chunk sized to fit.
    pub chunk_size: usize,

    /// Maximum number of chunks the arena may hold at once.
    ///
    /// Default: 4096. Reaching the limit is a fatal allocation failure.
    pub max_chunks: usize,

    /// Whether `allocate` zero-fills the bytes it hands out.
    ///
    /// Default: `true`. Typed helpers that return initialised slices
    /// always write their contents regardless of this flag.
    pub zero_fill: bool,
}

impl ArenaConfig {
    /// Default chunk size: 64KB.
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// Default maximum chunk count.
    pub const DEFAULT_MAX_CHUNKS: usize = 4096;

    /// Create a config with the given chunk size and defaults elsewhere.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            max_chunks: Self::DEFAULT_MAX_CHUNKS,
            zero_fill: true,
        }
    }

    /// Set the maximum chunk count.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Enable or disable zero-filling of raw allocations.
    pub fn with_zero_fill(mut self, zero_fill: bool) -> Self {
        self.zero_fill = zero_fill;
        self
    }

    /// Check that the configuration describes a usable arena.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.chunk_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "chunk_size must be non-zero",
            });
        }
        if self.chunk_size > isize::MAX as usize {
            return Err(ArenaError::InvalidConfig {
                reason: "chunk_size must not exceed isize::MAX",
            });
        }
        if self.max_chunks == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_chunks must be at least 1",
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_SIZE)
    }
}
