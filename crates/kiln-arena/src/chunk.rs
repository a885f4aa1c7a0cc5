//! Contiguous memory chunks and growable chunk lists.
//!
//! A [`Chunk`] is one block from the system allocator with a bump cursor.
//! A [`ChunkList`] is the ordered list of chunks behind an
//! [`Arena`](crate::Arena): it fills the current chunk, then moves on to
//! the next already-owned chunk, then links a fresh chunk directly after
//! the current one.

use std::alloc::Layout;
use std::ptr::NonNull;

use smallvec::SmallVec;
use tracing::debug;

use crate::error::ArenaError;
use crate::raw::{RawBlock, CHUNK_ALIGN};

/// Round `addr` up to the next multiple of `align` (a power of two).
pub(crate) fn align_up(addr: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    addr.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// A single contiguous block with bump allocation.
///
/// Chunks are the fundamental storage unit of the arena. Allocations are
/// never moved or individually released; the cursor only goes back on
/// [`reset`](Chunk::reset) or [`rewind_to`](Chunk::rewind_to).
pub struct Chunk {
    /// Backing storage, returned to the system when the chunk drops.
    block: RawBlock,
    /// Bump pointer: next free byte offset.
    cursor: usize,
}

impl Chunk {
    /// Allocate a new chunk of `capacity` bytes from the system allocator.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Ok(Self {
            block: RawBlock::allocate(capacity)?,
            cursor: 0,
        })
    }

    /// Bump-allocate a region matching `layout`.
    ///
    /// Returns `None` if the remaining space (after alignment padding)
    /// cannot hold the request.
    pub fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let base = self.base_addr();
        let aligned = align_up(base.checked_add(self.cursor)?, layout.align())?;
        let start = aligned - base;
        let end = start.checked_add(layout.size())?;
        if end > self.capacity() {
            return None;
        }
        self.cursor = end;
        Some(self.block.at(start))
    }

    /// Resize the most recent allocation in place.
    ///
    /// Succeeds only when `ptr .. ptr + old_size` ends exactly at the cursor
    /// and the chunk has room for `new_size` bytes from `ptr`.
    pub fn grow_in_place(&mut self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> bool {
        let Some(start) = self.offset_of(ptr) else {
            return false;
        };
        if start.checked_add(old_size) != Some(self.cursor) {
            return false;
        }
        match start.checked_add(new_size) {
            Some(end) if end <= self.capacity() => {
                self.cursor = end;
                true
            }
            _ => false,
        }
    }

    /// Byte offset of `ptr` within this chunk, if it points into it.
    pub fn offset_of(&self, ptr: NonNull<u8>) -> Option<usize> {
        let offset = (ptr.as_ptr() as usize).checked_sub(self.base_addr())?;
        (offset <= self.capacity()).then_some(offset)
    }

    /// Whether `ptr` lies inside the allocated part of this chunk.
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        self.offset_of(ptr).is_some_and(|off| off < self.cursor)
    }

    /// Reset the bump pointer to zero without releasing the block.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Move the bump pointer back to `cursor`. Never moves it forward.
    pub fn rewind_to(&mut self, cursor: usize) {
        self.cursor = self.cursor.min(cursor);
    }

    /// Bytes handed out so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.block.size()
    }

    /// Remaining free bytes (before alignment padding).
    pub fn remaining(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// Base address of the chunk.
    pub fn base(&self) -> NonNull<u8> {
        self.block.base()
    }

    fn base_addr(&self) -> usize {
        self.block.base().as_ptr() as usize
    }
}

/// A saved allocation position inside a [`ChunkList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    /// Index of the chunk that was current.
    pub(crate) chunk: usize,
    /// Cursor of that chunk.
    pub(crate) cursor: usize,
}

/// An ordered, growable list of [`Chunk`]s.
///
/// Invariant: every chunk after `current` is empty. Growth inserts the
/// new chunk at `current + 1`, so list order is fill order.
pub struct ChunkList {
    chunks: SmallVec<[Chunk; 4]>,
    chunk_size: usize,
    max_chunks: usize,
    /// Index of the chunk currently being filled.
    current: usize,
}

impl ChunkList {
    /// Create a chunk list with one pre-allocated chunk.
    pub fn new(chunk_size: usize, max_chunks: usize) -> Result<Self, ArenaError> {
        let mut chunks = SmallVec::new();
        chunks.push(Chunk::new(chunk_size)?);
        Ok(Self {
            chunks,
            chunk_size,
            max_chunks,
            current: 0,
        })
    }

    /// Bump-allocate `layout`, moving to or creating a later chunk if needed.
    pub fn alloc(&mut self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        if let Some(ptr) = self.chunks[self.current].alloc(layout) {
            return Ok(ptr);
        }

        // Reuse a chunk kept from before the last reset, if one fits.
        for idx in self.current + 1..self.chunks.len() {
            if let Some(ptr) = self.chunks[idx].alloc(layout) {
                let next = self.current + 1;
                // Keep fill order: the chunk in use moves right behind `current`.
                self.chunks[next..=idx].rotate_right(1);
                self.current = next;
                return Ok(ptr);
            }
        }

        if self.chunks.len() >= self.max_chunks {
            return Err(ArenaError::ChunkLimitReached {
                limit: self.max_chunks,
                requested: layout.size(),
            });
        }

        // Chunk bases are CHUNK_ALIGN-aligned; stricter alignment may need padding.
        let needed = layout
            .size()
            .checked_add(layout.align().saturating_sub(CHUNK_ALIGN))
            .ok_or(ArenaError::InvalidLayout {
                size: layout.size(),
                align: layout.align(),
            })?;
        let capacity = needed.max(self.chunk_size);
        let mut chunk = Chunk::new(capacity)?;
        let ptr = chunk.alloc(layout).ok_or(ArenaError::InvalidLayout {
            size: layout.size(),
            align: layout.align(),
        })?;
        self.chunks.insert(self.current + 1, chunk);
        self.current += 1;
        debug!(
            capacity,
            requested = layout.size(),
            chunks = self.chunks.len(),
            "arena linked a new chunk"
        );
        Ok(ptr)
    }

    /// Resize the most recent allocation in the current chunk, if possible.
    pub fn grow_in_place(&mut self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> bool {
        self.chunks[self.current].grow_in_place(ptr, old_size, new_size)
    }

    /// Reset every chunk's cursor without releasing memory.
    ///
    /// After reset, allocations start from chunk 0 again.
    pub fn reset(&mut self) {
        for chunk in &mut self.chunks {
            chunk.reset();
        }
        self.current = 0;
    }

    /// Release every chunk after the first and reset the first.
    ///
    /// Returns the number of chunks released.
    pub fn truncate_to_first(&mut self) -> usize {
        let released = self.chunks.len() - 1;
        self.chunks.truncate(1);
        self.reset();
        released
    }

    /// Record the current allocation position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            chunk: self.current,
            cursor: self.chunks[self.current].used(),
        }
    }

    /// Roll back to `checkpoint`, emptying every chunk filled after it.
    ///
    /// A checkpoint that no longer names a chunk (e.g. taken before a
    /// truncation) resets the whole list.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        if checkpoint.chunk >= self.chunks.len() {
            self.reset();
            return;
        }
        for chunk in &mut self.chunks[checkpoint.chunk + 1..] {
            chunk.reset();
        }
        self.chunks[checkpoint.chunk].rewind_to(checkpoint.cursor);
        self.current = checkpoint.chunk;
    }

    /// The chunks in fill order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Index of the chunk currently being filled.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Total number of chunks currently owned.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes handed out across all chunks.
    pub fn total_used(&self) -> usize {
        self.chunks.iter().map(Chunk::used).sum()
    }

    /// Total capacity across all chunks in bytes.
    pub fn total_capacity(&self) -> usize {
        self.chunks.iter().map(Chunk::capacity).sum()
    }
}
