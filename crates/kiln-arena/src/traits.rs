//! The allocation contract shared by every arena.
//!
//! Downstream code (strings, the formatting engine) is generic over [`Bump`]
//! and never looks at chunk internals. Only
//! [`alloc_layout`](Bump::alloc_layout) is required; the typed helpers are
//! built on top of it.

use std::alloc::Layout;
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;

use crate::error::ArenaError;
use crate::fatal::fatal;
use crate::raw;

/// A bump allocator: hands out memory that is released only in bulk.
///
/// Every method either succeeds or diverts to the [fatal
/// handler](crate::fatal::fatal); there is no error return. Returned references
/// borrow the allocator, so bulk release (which takes `&mut self` or
/// `self`) cannot happen while any of them is alive.
///
/// # Safety
///
/// Implementors guarantee that a pointer returned from
/// [`alloc_layout`](Bump::alloc_layout) or [`grow`](Bump::grow):
///
/// - is valid for reads and writes of the requested size,
/// - is aligned to the requested alignment,
/// - does not overlap any other allocation made since the last bulk
///   release,
/// - stays valid until the allocator is mutably borrowed, moved or dropped.
///
/// The provided methods rely on this to hand out safe references.
#[allow(unsafe_code)]
pub unsafe trait Bump {
    /// Allocate a region matching `layout`.
    fn alloc_layout(&self, layout: Layout) -> NonNull<u8>;

    /// Extend an allocation of `old_size` bytes to at least `new_size` bytes.
    ///
    /// The first `old_size` bytes are preserved. The returned pointer may
    /// differ from `ptr`; the old region is then abandoned, not released.
    /// Implementations extend the most recent allocation in place when they
    /// can. A `new_size` no larger than `old_size` returns `ptr` untouched:
    /// allocations never shrink.
    ///
    /// # Safety
    ///
    /// `ptr` and `old_size` must describe one allocation previously returned
    /// by this allocator (through [`alloc_layout`](Bump::alloc_layout),
    /// [`allocate`](Bump::allocate) or `grow`), made since its last bulk
    /// release, and no reference into that region may be live while the
    /// call runs or after it returns a different pointer.
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
        let fresh = self.allocate(new_size, align);
        // SAFETY: `ptr` is valid for `old_size` reads by the caller's
        // contract, and `fresh` is a new region disjoint from it.
        unsafe { raw::copy_bytes(ptr.as_ptr(), fresh, old_size) };
        fresh
    }

    /// Allocate `size` bytes aligned to `align`.
    ///
    /// An impossible pair (non power-of-two alignment, size overflowing
    /// `isize`) is fatal.
    fn allocate(&self, size: usize, align: usize) -> NonNull<u8> {
        match Layout::from_size_align(size, align) {
            Ok(layout) => self.alloc_layout(layout),
            Err(_) => fatal(ArenaError::InvalidLayout { size, align }),
        }
    }

    /// Allocate `len` zeroed bytes.
    fn alloc_bytes(&self, len: usize) -> &mut [u8] {
        let ptr = self.allocate(len, 1);
        // SAFETY: `ptr` is a fresh allocation of `len` bytes that nothing
        // else references; zeroing initialises it.
        unsafe {
            raw::fill_zero(ptr, len);
            raw::bytes_mut(ptr, len)
        }
    }

    /// Move `value` into the arena.
    fn alloc<T: Copy>(&self, value: T) -> &mut T {
        let ptr = self.alloc_layout(Layout::new::<T>());
        // SAFETY: fresh, aligned for `T` and sized for one `T`.
        unsafe { raw::write_value(ptr, value) }
    }

    /// Reserve room for `count` values of `T` without constructing them.
    ///
    /// The arena never runs constructors or destructors; initialising the
    /// slots is up to the caller.
    fn alloc_many<T>(&self, count: usize) -> &mut [MaybeUninit<T>] {
        let layout = array_layout::<T>(count);
        // SAFETY: fresh region laid out for `count` values of `T`.
        unsafe { raw::uninit_slice(self.alloc_layout(layout), count) }
    }

    /// Allocate `len` copies of `value`.
    fn alloc_slice_fill<T: Copy>(&self, len: usize, value: T) -> &mut [T] {
        let layout = array_layout::<T>(len);
        // SAFETY: fresh region laid out for `len` values of `T`.
        unsafe { raw::fill_slice(self.alloc_layout(layout), len, value) }
    }

    /// Copy `src` into the arena.
    fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> &mut [T] {
        let layout = array_layout::<T>(src.len());
        // SAFETY: fresh region laid out for `src.len()` values of `T`.
        unsafe { raw::copy_slice(self.alloc_layout(layout), src) }
    }

    /// Copy `text` into the arena.
    fn alloc_str(&self, text: &str) -> &mut str {
        let ptr = self.allocate(text.len(), 1);
        // SAFETY: `ptr` is a fresh region of `text.len()` bytes; after the
        // copy it holds valid UTF-8.
        unsafe {
            raw::copy_bytes(text.as_ptr(), ptr, text.len());
            raw::str_mut_at(ptr, text.len())
        }
    }
}

fn array_layout<T>(count: usize) -> Layout {
    Layout::array::<T>(count).unwrap_or_else(|_| {
        fatal(ArenaError::InvalidLayout {
            size: count.saturating_mul(mem::size_of::<T>()),
            align: mem::align_of::<T>(),
        })
    })
}
