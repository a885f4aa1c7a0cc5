//! Fixed-capacity arena over inline storage.
//!
//! [`StackArena`] holds its bytes inline (typically on the stack) and
//! never touches the system allocator. It follows the same [`Bump`]
//! contract as [`Arena`](crate::Arena) minus growth: running out of room
//! is fatal.

use std::alloc::Layout;
use std::cell::{Cell, UnsafeCell};
use std::fmt;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use crate::chunk::align_up;
use crate::error::ArenaError;
use crate::fatal::fatal;
use crate::raw;
use crate::traits::Bump;

/// Bump allocator over an inline `N`-byte buffer.
///
/// Use it where a call site must guarantee zero dynamic allocation, e.g.
/// formatting a short message into a fixed scratch buffer. There is no
/// explicit free; the storage goes away with the enclosing scope.
///
/// ```
/// use kiln_arena::{Bump, StackArena};
///
/// let scratch = StackArena::<64>::new();
/// let greeting = scratch.alloc_str("hello");
/// assert_eq!(greeting, "hello");
/// assert_eq!(scratch.used(), 5);
/// ```
pub struct StackArena<const N: usize> {
    buf: UnsafeCell<[MaybeUninit<u8>; N]>,
    cursor: Cell<usize>,
}

impl<const N: usize> StackArena<N> {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self {
            buf: UnsafeCell::new([MaybeUninit::uninit(); N]),
            cursor: Cell::new(0),
        }
    }

    /// Forget every allocation and start over from offset zero.
    pub fn reset(&mut self) {
        self.cursor.set(0);
    }

    /// Bytes handed out so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still free (before alignment padding).
    pub fn remaining(&self) -> usize {
        N - self.cursor.get()
    }

    /// Total capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    fn base(&self) -> NonNull<u8> {
        raw::cell_base(&self.buf)
    }

    fn overflow(&self, requested: usize) -> ! {
        fatal(ArenaError::CapacityExceeded {
            requested,
            remaining: self.remaining(),
            capacity: N,
        })
    }
}

impl<const N: usize> Default for StackArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for StackArena<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackArena")
            .field("capacity", &N)
            .field("used", &self.used())
            .finish()
    }
}

// SAFETY: allocations are disjoint sub-ranges of `buf` below the cursor,
// aligned by `align_up`; `buf` lives as long as `self` and is only reused
// after `reset(&mut self)`.
#[allow(unsafe_code)]
unsafe impl<const N: usize> Bump for StackArena<N> {
    fn alloc_layout(&self, layout: Layout) -> NonNull<u8> {
        let base = self.base();
        let addr = base.as_ptr() as usize;
        let cursor = self.cursor.get();
        let span = align_up(addr + cursor, layout.align())
            .map(|aligned| aligned - addr)
            .and_then(|start| Some((start, start.checked_add(layout.size())?)));
        match span {
            Some((start, end)) if end <= N => {
                self.cursor.set(end);
                // SAFETY: `end <= N`, so `start` lies inside `buf`.
                unsafe { raw::offset_ptr(base, start) }
            }
            _ => self.overflow(layout.size()),
        }
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
        let cursor = self.cursor.get();
        let start = (ptr.as_ptr() as usize).wrapping_sub(self.base().as_ptr() as usize);
        if start <= cursor && start.checked_add(old_size) == Some(cursor) && new_size <= N - start {
            self.cursor.set(start + new_size);
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
    fn allocations_are_sequential() {
        let arena = StackArena::<64>::new();
        let a = arena.alloc_bytes(10).as_ptr() as usize;
        let b = arena.alloc_bytes(10).as_ptr() as usize;
        assert_eq!(b - a, 10);
        assert_eq!(arena.used(), 20);
        assert_eq!(arena.remaining(), 44);
    }

    #[test]
    fn alignment_is_honoured() {
        let arena = StackArena::<64>::new();
        arena.alloc_bytes(1);
        let value = arena.alloc(7u64);
        let addr = &*value as *const u64 as usize;
        assert_eq!(addr % std::mem::align_of::<u64>(), 0);
        assert_eq!(*value, 7);
    }

    #[test]
    fn exact_capacity_fits() {
        let arena = StackArena::<16>::new();
        let bytes = arena.alloc_bytes(16);
        assert_eq!(bytes.len(), 16);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "arena capacity exceeded")]
    fn overflow_is_fatal() {
        let arena = StackArena::<16>::new();
        arena.alloc_bytes(10);
        arena.alloc_bytes(10);
    }

    #[test]
    fn reset_reuses_storage() {
        let mut arena = StackArena::<32>::new();
        let first = arena.alloc_bytes(32).as_ptr();
        arena.reset();
        let again = arena.alloc_bytes(8).as_ptr();
        assert_eq!(first, again);
    }

    #[test]
    fn grow_last_allocation_in_place() {
        let arena = StackArena::<32>::new();
        let ptr = arena.allocate(4, 1);
        let grown = unsafe { arena.grow(ptr, 4, 12, 1) };
        assert_eq!(ptr, grown);
        assert_eq!(arena.used(), 12);
    }

    #[test]
    fn grow_earlier_allocation_copies() {
        let arena = StackArena::<32>::new();
        let first = arena.alloc_slice_copy(b"abcd");
        let first_ptr = NonNull::from(&mut first[0]);
        arena.alloc_bytes(2);
        let moved = unsafe { arena.grow(first_ptr, 4, 6, 1) };
        assert_ne!(moved, first_ptr);
        assert_eq!(unsafe { raw::bytes_mut(moved, 4) }, b"abcd");
    }

    #[test]
    fn shrinking_grow_keeps_the_cursor() {
        let arena = StackArena::<32>::new();
        let first = arena.allocate(8, 1);
        assert_eq!(unsafe { arena.grow(first, 8, 2, 1) }, first);
        assert_eq!(arena.used(), 8);
        let second = arena.alloc_bytes(8).as_ptr() as usize;
        assert_eq!(second - first.as_ptr() as usize, 8);
    }

    #[test]
    fn debug_reports_usage() {
        let arena = StackArena::<8>::new();
        arena.alloc_bytes(3);
        assert_eq!(format!("{arena:?}"), "StackArena { capacity: 8, used: 3 }");
    }
}
