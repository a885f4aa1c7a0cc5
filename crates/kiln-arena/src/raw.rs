//! Low-level primitives for arena memory operations.
//!
//! The pointer operations behind every arena. The functions are
//! crate-private `unsafe fn`s; each lists the contract its callers uphold
//! under `# Safety`, and callers only ever pass pointers they carved out of
//! a live block themselves.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};

use crate::error::ArenaError;

/// Alignment of every chunk base address.
pub(crate) const CHUNK_ALIGN: usize = 16;

/// A block obtained from the system allocator, returned to it on drop.
pub(crate) struct RawBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBlock {
    /// Request `size` bytes aligned to [`CHUNK_ALIGN`] from the system.
    pub(crate) fn allocate(size: usize) -> Result<Self, ArenaError> {
        let layout = Layout::from_size_align(size.max(1), CHUNK_ALIGN).map_err(|_| {
            ArenaError::InvalidLayout {
                size,
                align: CHUNK_ALIGN,
            }
        })?;
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or(ArenaError::OutOfMemory { requested: size })?;
        Ok(Self { ptr, layout })
    }

    /// Usable size of the block in bytes.
    pub(crate) fn size(&self) -> usize {
        self.layout.size()
    }

    /// Base address of the block.
    pub(crate) fn base(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Pointer `offset` bytes into the block.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the block.
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.size(), "offset {offset} outside block");
        // SAFETY: checked against the block size above.
        unsafe { offset_ptr(self.ptr, offset) }
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `alloc::alloc` with exactly this layout and
        // is released once, here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// Base address of the storage behind an `UnsafeCell`.
pub(crate) fn cell_base<T>(cell: &UnsafeCell<T>) -> NonNull<u8> {
    // SAFETY: `UnsafeCell::get` derives from a reference and is never null.
    unsafe { NonNull::new_unchecked(cell.get().cast::<u8>()) }
}

/// Pointer arithmetic within one allocation.
///
/// # Safety
///
/// `base + offset` stays inside (or one past the end of) the
/// allocation `base` points into.
pub(crate) unsafe fn offset_ptr(base: NonNull<u8>, offset: usize) -> NonNull<u8> {
    // SAFETY: in-bounds by contract, so no overflow and non-null.
    unsafe { base.add(offset) }
}

/// Zero `len` bytes at `dst`.
///
/// # Safety
///
/// `dst` is valid for `len` writes and not aliased by a live
/// reference.
pub(crate) unsafe fn fill_zero(dst: NonNull<u8>, len: usize) {
    // SAFETY: guaranteed by the caller.
    unsafe { ptr::write_bytes(dst.as_ptr(), 0, len) }
}

/// Copy `len` bytes between two disjoint regions.
///
/// # Safety
///
/// Both regions are valid for `len` bytes and do not overlap.
pub(crate) unsafe fn copy_bytes(src: *const u8, dst: NonNull<u8>, len: usize) {
    // SAFETY: guaranteed by the caller.
    unsafe { ptr::copy_nonoverlapping(src, dst.as_ptr(), len) }
}

/// Move `len` bytes starting at `base + from` forward by `by` bytes.
///
/// # Safety
///
/// `base` is valid for `from + by + len` bytes.
pub(crate) unsafe fn shift_right(base: NonNull<u8>, from: usize, len: usize, by: usize) {
    // SAFETY: both ranges lie inside the allocation; `ptr::copy` allows overlap.
    unsafe {
        let src = offset_ptr(base, from);
        let dst = offset_ptr(base, from + by);
        ptr::copy(src.as_ptr(), dst.as_ptr(), len)
    }
}

/// View `len` initialised bytes at `ptr` as a mutable slice for `'a`.
///
/// # Safety
///
/// The bytes are initialised, exclusively owned by the caller and
/// live for `'a`.
pub(crate) unsafe fn bytes_mut<'a>(ptr: NonNull<u8>, len: usize) -> &'a mut [u8] {
    // SAFETY: guaranteed by the caller.
    unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), len) }
}

/// Move `value` into the memory at `ptr`.
///
/// # Safety
///
/// `ptr` is aligned for `T`, valid for one `T`, exclusively owned
/// and live for `'a`.
pub(crate) unsafe fn write_value<'a, T>(ptr: NonNull<u8>, value: T) -> &'a mut T {
    let typed = ptr.cast::<T>();
    // SAFETY: guaranteed by the caller.
    unsafe {
        typed.as_ptr().write(value);
        &mut *typed.as_ptr()
    }
}

/// View `len` slots of `T` at `ptr` as uninitialised storage.
///
/// # Safety
///
/// As for [`write_value`], for `len` consecutive values.
pub(crate) unsafe fn uninit_slice<'a, T>(ptr: NonNull<u8>, len: usize) -> &'a mut [MaybeUninit<T>] {
    // SAFETY: `MaybeUninit<T>` has no validity requirement; the rest is
    // upheld by contract.
    unsafe { std::slice::from_raw_parts_mut(ptr.cast::<MaybeUninit<T>>().as_ptr(), len) }
}

/// Fill `len` slots of `T` at `ptr` with `value`.
///
/// # Safety
///
/// As for [`uninit_slice`].
pub(crate) unsafe fn fill_slice<'a, T: Copy>(ptr: NonNull<u8>, len: usize, value: T) -> &'a mut [T] {
    // SAFETY: guaranteed by the caller.
    let slots = unsafe { uninit_slice::<T>(ptr, len) };
    for slot in slots.iter_mut() {
        slot.write(value);
    }
    // SAFETY: every slot was initialised above.
    unsafe { std::slice::from_raw_parts_mut(ptr.cast::<T>().as_ptr(), len) }
}

/// Copy `src` into the slots at `ptr`.
///
/// # Safety
///
/// As for [`uninit_slice`] with `len == src.len()`.
pub(crate) unsafe fn copy_slice<'a, T: Copy>(ptr: NonNull<u8>, src: &[T]) -> &'a mut [T] {
    let dst = ptr.cast::<T>();
    // SAFETY: `dst` is a fresh region disjoint from `src`, sized by contract;
    // after the copy all slots are initialised.
    unsafe {
        ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), src.len());
        std::slice::from_raw_parts_mut(dst.as_ptr(), src.len())
    }
}

/// View `len` bytes at `ptr` as UTF-8 text.
///
/// # Safety
///
/// The bytes are initialised, valid UTF-8, not mutated for `'a`.
pub(crate) unsafe fn str_at<'a>(ptr: NonNull<u8>, len: usize) -> &'a str {
    // SAFETY: guaranteed by the caller.
    unsafe {
        let bytes = std::slice::from_raw_parts(ptr.as_ptr(), len);
        std::str::from_utf8_unchecked(bytes)
    }
}

/// Mutable variant of [`str_at`].
///
/// # Safety
///
/// As for [`str_at`], plus exclusive ownership for `'a`.
pub(crate) unsafe fn str_mut_at<'a>(ptr: NonNull<u8>, len: usize) -> &'a mut str {
    // SAFETY: guaranteed by the caller.
    unsafe { std::str::from_utf8_unchecked_mut(bytes_mut(ptr, len)) }
}
