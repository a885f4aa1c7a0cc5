//! The chunked, growable arena.
//!
//! [`Arena`] is the program-wide allocator: every other structure takes its
//! memory from one. Allocation bumps a cursor through a list of chunks and
//! links a new chunk when the current one is full. Memory comes back only in
//! bulk, through [`clear`](Arena::clear), [`clear_and_reinit`](Arena::clear_and_reinit),
//! [`free`](Arena::free), or the rewind at the end of a [`scope`](Arena::scope).

use std::alloc::Layout;
use std::cell::RefCell;
use std::fmt;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::chunk::{Checkpoint, ChunkList};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::fatal::fatal;
use crate::raw;
use crate::traits::Bump;

/// Point-in-time usage figures for an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of chunks owned.
    pub chunk_count: usize,
    /// Bytes handed out, including alignment padding.
    pub allocated_bytes: usize,
    /// Total bytes owned across all chunks.
    pub capacity_bytes: usize,
    /// Index of the chunk currently being filled.
    pub current_chunk: usize,
}

/// Chunked bump allocator.
///
/// Allocation takes `&self`, so many allocations can be alive at once; each
/// borrows the arena. Bulk release takes `&mut self` (or `self`), which the
/// borrow checker only allows once every allocation is gone.
///
/// The arena is single-threaded: it is neither `Send` nor `Sync`. Use one
/// per logical unit of work (a frame, a request).
///
/// ```
/// use kiln_arena::{Arena, Bump};
///
/// let mut arena = Arena::with_chunk_size(256);
/// let numbers = arena.alloc_slice_copy(&[1u32, 2, 3]);
/// numbers[0] = 10;
/// assert_eq!(numbers, &[10, 2, 3]);
///
/// arena.clear();
/// assert_eq!(arena.allocated_bytes(), 0);
/// arena.free();
/// ```
pub struct Arena {
    chunks: RefCell<ChunkList>,
    config: ArenaConfig,
}

impl Arena {
    /// Create an arena with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Create an arena whose regular chunks hold `chunk_size` bytes.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self::with_config(ArenaConfig::new(chunk_size))
    }

    /// Create an arena from `config`.
    ///
    /// An invalid config or a refused first chunk is fatal; use
    /// [`try_with_config`](Arena::try_with_config) to handle them.
    pub fn with_config(config: ArenaConfig) -> Self {
        Self::try_with_config(config).unwrap_or_else(|err| fatal(err))
    }

    /// Create an arena from `config`, reporting failure as a value.
    ///
    /// This is the only recoverable failure surface of the arena.
    pub fn try_with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let chunks = ChunkList::new(config.chunk_size, config.max_chunks)?;
        debug!(chunk_size = config.chunk_size, "arena created");
        Ok(Self {
            chunks: RefCell::new(chunks),
            config,
        })
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Reset every chunk's cursor, keeping all chunks.
    ///
    /// No system calls; the next allocation starts at the first chunk's base.
    pub fn clear(&mut self) {
        let chunks = self.chunks.get_mut();
        chunks.reset();
        trace!(chunks = chunks.chunk_count(), "arena cleared");
    }

    /// Reset the arena and return every chunk but the first to the system.
    pub fn clear_and_reinit(&mut self) {
        let released = self.chunks.get_mut().truncate_to_first();
        debug!(released, "arena cleared and reinitialised");
    }

    /// Return every chunk to the system.
    pub fn free(self) {
        let stats = self.stats();
        debug!(
            chunks = stats.chunk_count,
            bytes = stats.capacity_bytes,
            "arena freed"
        );
        drop(self);
    }

    /// Record the current allocation position.
    pub fn checkpoint(&self) -> Checkpoint {
        self.chunks.borrow().checkpoint()
    }

    /// Release everything allocated since `checkpoint`.
    ///
    /// Chunks filled after the checkpoint are kept for reuse. A checkpoint
    /// invalidated by [`clear_and_reinit`](Arena::clear_and_reinit) rewinds
    /// the whole arena.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.chunks.get_mut().rewind(checkpoint);
        trace!(?checkpoint, "arena rewound");
    }

    /// Run `f` against this arena and release whatever it allocated.
    ///
    /// The rewind happens on every return path out of `f`, including early
    /// `?` returns inside it. The result type cannot borrow from the scoped
    /// allocations, so nothing allocated inside can escape.
    ///
    /// ```
    /// use kiln_arena::{Arena, Bump};
    ///
    /// let mut arena = Arena::with_chunk_size(128);
    /// let len = arena.scope(|scratch| scratch.alloc_str("temporary").len());
    /// assert_eq!(len, 9);
    /// assert_eq!(arena.allocated_bytes(), 0);
    /// ```
    pub fn scope<R>(&mut self, f: impl FnOnce(&Arena) -> R) -> R {
        let checkpoint = self.checkpoint();
        let result = f(self);
        self.rewind(checkpoint);
        result
    }

    /// Whether `ptr` points into memory this arena has handed out.
    pub fn owns(&self, ptr: NonNull<u8>) -> bool {
        self.chunks
            .borrow()
            .chunks()
            .iter()
            .any(|chunk| chunk.contains(ptr))
    }

    /// Capacity of the chunk at `index` in fill order.
    pub fn chunk_capacity(&self, index: usize) -> Option<usize> {
        self.chunks
            .borrow()
            .chunks()
            .get(index)
            .map(|chunk| chunk.capacity())
    }

    /// Number of chunks owned.
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().chunk_count()
    }

    /// Bytes handed out since the last reset, including padding.
    pub fn allocated_bytes(&self) -> usize {
        self.chunks.borrow().total_used()
    }

    /// Total bytes owned across all chunks.
    pub fn capacity_bytes(&self) -> usize {
        self.chunks.borrow().total_capacity()
    }

    /// Usage snapshot.
    pub fn stats(&self) -> ArenaStats {
        let chunks = self.chunks.borrow();
        ArenaStats {
            chunk_count: chunks.chunk_count(),
            allocated_bytes: chunks.total_used(),
            capacity_bytes: chunks.total_capacity(),
            current_chunk: chunks.current(),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

// SAFETY: every pointer comes from `ChunkList::alloc` (a fresh, aligned,
// disjoint range below a chunk cursor) or from an in-place extension of
// the most recent such range. Chunks are released or reset only through
// `&mut self` / `self`, and chunk memory never moves when the list grows.
#[allow(unsafe_code)]
unsafe impl Bump for Arena {
    fn alloc_layout(&self, layout: Layout) -> NonNull<u8> {
        let result = self.chunks.borrow_mut().alloc(layout);
        let ptr = result.unwrap_or_else(|err| fatal(err));
        if self.config.zero_fill {
            // SAFETY: fresh region of `layout.size()` bytes.
            unsafe { raw::fill_zero(ptr, layout.size()) };
        }
        ptr
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
        align: usize,
    ) -> NonNull<u8> {
        if new_size <= old_size {
            return ptr;
        }
        let in_place = self
            .chunks
            .borrow_mut()
            .grow_in_place(ptr, old_size, new_size);
        if in_place {
            if self.config.zero_fill {
                // SAFETY: the chunk just extended `ptr` to `new_size` bytes.
                unsafe { raw::fill_zero(raw::offset_ptr(ptr, old_size), new_size - old_size) };
            }
            return ptr;
        }
        let fresh = self.allocate(new_size, align);
        // SAFETY: the caller guarantees `ptr` is valid for `old_size` reads;
        // `fresh` is disjoint from it.
        unsafe { raw::copy_bytes(ptr.as_ptr(), fresh, old_size) };
        fresh
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn sequential_allocations_are_increasing_and_disjoint() {
        let arena = Arena::with_chunk_size(1024);
        let a = arena.alloc_bytes(10);
        let b = arena.alloc_bytes(20);
        let a_end = a.as_ptr() as usize + a.len();
        assert!(b.as_ptr() as usize >= a_end);
        assert_eq!(arena.chunk_count(), 1);
    }

    #[test]
    fn overflow_links_exactly_one_chunk() {
        let arena = Arena::with_chunk_size(64);
        let first = arena.alloc_slice_fill(60, 7u8);
        let big = arena.alloc_bytes(200);
        assert_eq!(arena.chunk_count(), 2);
        assert!(arena.chunk_capacity(1).unwrap() >= 200);
        assert_eq!(big.len(), 200);
        assert!(first.iter().all(|&b| b == 7));
    }

    #[test]
    fn clear_reuses_first_address() {
        let mut arena = Arena::with_chunk_size(128);
        let first = NonNull::from(&mut arena.alloc_bytes(16)[0]);
        arena.alloc_bytes(200);
        arena.clear();
        let again = arena.allocate(100, 1);
        assert_eq!(first, again);
        assert_eq!(arena.chunk_count(), 2);
    }

    #[test]
    fn clear_and_reinit_leaves_one_chunk() {
        let mut arena = Arena::with_chunk_size(32);
        for _ in 0..10 {
            arena.alloc_bytes(32);
        }
        assert_eq!(arena.chunk_count(), 10);
        arena.clear_and_reinit();
        assert_eq!(arena.chunk_count(), 1);
        assert_eq!(arena.allocated_bytes(), 0);
        assert_eq!(arena.capacity_bytes(), 32);
    }

    #[test]
    fn typed_helpers_are_aligned() {
        let arena = Arena::with_chunk_size(256);
        arena.alloc_bytes(1);
        let value = arena.alloc(0xdead_beef_u64);
        assert_eq!(&*value as *const u64 as usize % 8, 0);
        let many = arena.alloc_many::<u32>(4);
        assert_eq!(many.as_ptr() as usize % 4, 0);
        assert_eq!(many.len(), 4);
    }

    #[test]
    fn zero_fill_clears_reused_memory() {
        let mut arena = Arena::with_chunk_size(64);
        arena.alloc_slice_fill(32, 0xffu8);
        arena.clear();
        let ptr = arena.allocate(32, 1);
        assert!(unsafe { raw::bytes_mut(ptr, 32) }.iter().all(|&b| b == 0));
    }

    #[test]
    fn scope_rewinds_on_normal_exit() {
        let mut arena = Arena::with_chunk_size(64);
        arena.alloc_bytes(8);
        let n = arena.scope(|inner| {
            inner.alloc_bytes(40);
            inner.alloc_bytes(100);
            inner.chunk_count()
        });
        assert_eq!(n, 2);
        assert_eq!(arena.allocated_bytes(), 8);
        assert_eq!(arena.stats().current_chunk, 0);
    }

    fn check(ok: bool) -> Result<(), &'static str> {
        if ok {
            Ok(())
        } else {
            Err("bail")
        }
    }

    #[test]
    fn scope_rewinds_on_early_return() {
        let mut arena = Arena::with_chunk_size(64);
        let result: Result<(), &str> = arena.scope(|inner| {
            inner.alloc_bytes(16);
            check(false)?;
            inner.alloc_bytes(16);
            Ok(())
        });
        assert_eq!(result, Err("bail"));
        assert_eq!(arena.allocated_bytes(), 0);
    }

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut arena = Arena::with_chunk_size(256);
        arena.alloc_bytes(4);
        let outer_cp = arena.checkpoint();
        arena.alloc_bytes(4);
        let inner_cp = arena.checkpoint();
        arena.alloc_bytes(4);
        arena.rewind(inner_cp);
        assert_eq!(arena.allocated_bytes(), 8);
        arena.rewind(outer_cp);
        assert_eq!(arena.allocated_bytes(), 4);
    }

    #[test]
    fn grow_in_place_then_copy() {
        let arena = Arena::with_chunk_size(64);
        let ptr = arena.allocate(8, 1);
        assert_eq!(unsafe { arena.grow(ptr, 8, 32, 1) }, ptr);
        unsafe { raw::bytes_mut(ptr, 4) }.copy_from_slice(b"kiln");
        let moved = unsafe { arena.grow(ptr, 32, 128, 1) };
        assert_ne!(moved, ptr);
        assert_eq!(unsafe { raw::bytes_mut(moved, 4) }, b"kiln");
        assert_eq!(arena.chunk_count(), 2);
    }

    #[test]
    fn grow_never_shrinks_or_rewinds() {
        let arena = Arena::with_chunk_size(64);
        let ptr = arena.allocate(8, 1);
        assert_eq!(unsafe { arena.grow(ptr, 8, 0, 1) }, ptr);
        assert_eq!(unsafe { arena.grow(ptr, 8, 8, 1) }, ptr);
        assert_eq!(arena.allocated_bytes(), 8);
        let next = arena.allocate(8, 1);
        assert_eq!(next.as_ptr() as usize - ptr.as_ptr() as usize, 8);
    }

    #[test]
    fn owns_reports_handed_out_memory() {
        let arena = Arena::with_chunk_size(64);
        let ptr = arena.allocate(8, 1);
        assert!(arena.owns(ptr));
        let outside = 0u8;
        assert!(!arena.owns(NonNull::from(&outside)));
    }

    #[test]
    fn try_with_config_reports_invalid_config() {
        let err = Arena::try_with_config(ArenaConfig::new(0)).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidConfig { .. }));
    }

    #[test]
    #[should_panic(expected = "arena chunk limit reached")]
    fn chunk_limit_is_fatal() {
        let arena = Arena::with_config(ArenaConfig::new(16).with_max_chunks(2));
        arena.alloc_bytes(16);
        arena.alloc_bytes(16);
        arena.alloc_bytes(16);
    }

    #[test]
    #[should_panic(expected = "invalid layout")]
    fn bad_alignment_is_fatal() {
        let arena = Arena::with_chunk_size(16);
        arena.allocate(8, 3);
    }

    #[test]
    fn debug_includes_stats() {
        let arena = Arena::with_chunk_size(16);
        let rendered = format!("{arena:?}");
        assert!(rendered.contains("chunk_count: 1"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn small_allocations_stay_in_one_chunk_in_order(
                sizes in proptest::collection::vec(1usize..64, 1..32),
            ) {
                let total: usize = sizes.iter().sum();
                let arena = Arena::with_chunk_size(total);
                let mut last_end = 0usize;
                for &size in &sizes {
                    let ptr = arena.allocate(size, 1).as_ptr() as usize;
                    prop_assert!(ptr >= last_end);
                    last_end = ptr + size;
                }
                prop_assert_eq!(arena.chunk_count(), 1);
                prop_assert_eq!(arena.allocated_bytes(), total);
            }

            #[test]
            fn contents_survive_growth(
                sizes in proptest::collection::vec(1usize..300, 1..24),
            ) {
                let arena = Arena::with_chunk_size(128);
                let mut blocks = Vec::new();
                for (i, &size) in sizes.iter().enumerate() {
                    let block = arena.alloc_slice_fill(size, i as u8);
                    blocks.push((i as u8, &*block));
                }
                for (tag, block) in blocks {
                    prop_assert!(block.iter().all(|&b| b == tag));
                }
            }

            #[test]
            fn clear_and_reinit_always_leaves_one_chunk(
                sizes in proptest::collection::vec(1usize..500, 0..40),
            ) {
                let mut arena = Arena::with_chunk_size(64);
                for &size in &sizes {
                    arena.alloc_bytes(size);
                }
                arena.clear_and_reinit();
                prop_assert_eq!(arena.chunk_count(), 1);
                prop_assert_eq!(arena.allocated_bytes(), 0);
            }
        }
    }
}
