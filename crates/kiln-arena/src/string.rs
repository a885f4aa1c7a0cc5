//! Length-based text views and arena-backed text buffers.
//!
//! [`ArenaStr`] is an immutable `(pointer, length)` view of UTF-8 bytes it
//! does not own. [`ArenaString`] accumulates text in a single arena
//! allocation, growing it through [`Bump::grow`] so the finished text is
//! always one contiguous region.

use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;

use crate::error::ArenaError;
use crate::fatal::fatal;
use crate::raw;
use crate::traits::Bump;

/// A non-owning view of UTF-8 text.
///
/// The bytes belong to whichever arena produced them (or to static storage
/// for literals); the lifetime `'a` keeps the view from outliving them.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArenaStr<'a> {
    text: &'a str,
}

impl ArenaStr<'static> {
    /// View a string literal.
    pub const fn from_static(text: &'static str) -> Self {
        Self { text }
    }
}

impl<'a> ArenaStr<'a> {
    /// Copy `text` into `arena` and view the copy.
    pub fn copy_in<A: Bump>(arena: &'a A, text: &str) -> Self {
        Self {
            text: arena.alloc_str(text),
        }
    }

    /// The viewed text.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// The viewed bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl<'a> From<&'a str> for ArenaStr<'a> {
    fn from(text: &'a str) -> Self {
        Self { text }
    }
}

impl Deref for ArenaStr<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.text
    }
}

impl AsRef<str> for ArenaStr<'_> {
    fn as_ref(&self) -> &str {
        self.text
    }
}

impl PartialEq<str> for ArenaStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for ArenaStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl fmt::Display for ArenaStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

impl fmt::Debug for ArenaStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.text, f)
    }
}

/// A growable UTF-8 buffer living in a single arena allocation.
///
/// Growth doubles the capacity through [`Bump::grow`], which extends the
/// allocation in place while it is the arena's most recent one and copies
/// it otherwise. Abandoned regions are reclaimed with the arena's next
/// bulk release.
pub struct ArenaString<'a, A: Bump> {
    arena: &'a A,
    ptr: NonNull<u8>,
    len: usize,
    cap: usize,
}

// `ptr` is always either dangling with `cap == 0` or the most recent
// allocation this buffer made from `arena`, `cap` bytes long, with the
// first `len` bytes holding UTF-8. No other handle to that region exists.
#[allow(unsafe_code)]
impl<'a, A: Bump> ArenaString<'a, A> {
    /// Smallest capacity allocated on first growth.
    pub const MIN_CAPACITY: usize = 16;

    /// An empty buffer. Nothing is allocated until the first push.
    pub fn new(arena: &'a A) -> Self {
        Self {
            arena,
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
        }
    }

    /// An empty buffer with room for `capacity` bytes.
    pub fn with_capacity(arena: &'a A, capacity: usize) -> Self {
        let mut buf = Self::new(arena);
        buf.reserve(capacity);
        buf
    }

    /// The arena backing this buffer.
    pub fn arena(&self) -> &'a A {
        self.arena
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// The text written so far.
    pub fn as_str(&self) -> &str {
        // SAFETY: the first `len` bytes are initialised UTF-8.
        unsafe { raw::str_at(self.ptr, self.len) }
    }

    /// Number of chars written at or after byte offset `start`.
    ///
    /// # Panics
    ///
    /// Panics if `start` is not a char boundary.
    pub fn chars_since(&self, start: usize) -> usize {
        self.as_str()[start..].chars().count()
    }

    /// Make room for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.len.checked_add(additional).unwrap_or_else(|| {
            fatal(ArenaError::InvalidLayout {
                size: usize::MAX,
                align: 1,
            })
        });
        if required <= self.cap {
            return;
        }
        let new_cap = required
            .max(self.cap.saturating_mul(2))
            .max(Self::MIN_CAPACITY);
        self.ptr = if self.cap == 0 {
            self.arena.allocate(new_cap, 1)
        } else {
            // SAFETY: `ptr`/`cap` is this buffer's own allocation and no
            // reference into it outlives `&mut self`.
            unsafe { self.arena.grow(self.ptr, self.cap, new_cap, 1) }
        };
        self.cap = new_cap;
    }

    /// Append `text`.
    pub fn push_str(&mut self, text: &str) {
        self.reserve(text.len());
        // SAFETY: `reserve` left room for `text` past `len`, and `text`
        // cannot point into the unwritten tail.
        unsafe {
            let dst = raw::offset_ptr(self.ptr, self.len);
            raw::copy_bytes(text.as_ptr(), dst, text.len());
        }
        self.len += text.len();
    }

    /// Append one char.
    pub fn push_char(&mut self, ch: char) {
        let mut encoded = [0u8; 4];
        self.push_str(ch.encode_utf8(&mut encoded));
    }

    /// Append `count` copies of `ch`.
    pub fn push_fill(&mut self, ch: char, count: usize) {
        let mut encoded = [0u8; 4];
        let unit = ch.encode_utf8(&mut encoded);
        self.reserve(unit.len().saturating_mul(count));
        for _ in 0..count {
            self.push_str(unit);
        }
    }

    /// Insert `count` copies of `ch` at byte offset `at`, shifting the tail.
    ///
    /// # Panics
    ///
    /// Panics if `at` is not a char boundary.
    pub fn insert_fill(&mut self, at: usize, ch: char, count: usize) {
        assert!(
            self.as_str().is_char_boundary(at),
            "insert position {at} is not a char boundary"
        );
        if count == 0 {
            return;
        }
        let mut encoded = [0u8; 4];
        let unit = ch.encode_utf8(&mut encoded);
        let total = unit.len().saturating_mul(count);
        self.reserve(total);
        // SAFETY: `reserve` made room for `len + total` bytes; `unit` lives
        // on the stack.
        unsafe {
            raw::shift_right(self.ptr, at, self.len - at, total);
            for i in 0..count {
                let dst = raw::offset_ptr(self.ptr, at + i * unit.len());
                raw::copy_bytes(unit.as_ptr(), dst, unit.len());
            }
        }
        self.len += total;
    }

    /// Shorten the buffer to `new_len` bytes. Capacity is kept.
    ///
    /// # Panics
    ///
    /// Panics if `new_len` is not a char boundary.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len < self.len {
            assert!(
                self.as_str().is_char_boundary(new_len),
                "truncate position {new_len} is not a char boundary"
            );
            self.len = new_len;
        }
    }

    /// Drop all text. Capacity is kept.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Stop writing and view the finished text for the arena's lifetime.
    pub fn finish(self) -> ArenaStr<'a> {
        // SAFETY: consuming `self` ends all writes to the region, which the
        // arena keeps alive for `'a`.
        let text = unsafe { raw::str_at(self.ptr, self.len) };
        ArenaStr { text }
    }
}

impl<A: Bump> fmt::Write for ArenaString<'_, A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.push_char(c);
        Ok(())
    }
}

impl<A: Bump> fmt::Debug for ArenaString<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<A: Bump> fmt::Display for ArenaString<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use super::*;
    use crate::{Arena, StackArena};

    #[test]
    fn empty_buffer_allocates_nothing() {
        let arena = Arena::with_chunk_size(64);
        let buf = ArenaString::new(&arena);
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.as_str(), "");
        assert_eq!(arena.allocated_bytes(), 0);
    }

    #[test]
    fn push_and_finish() {
        let arena = Arena::with_chunk_size(64);
        let mut buf = ArenaString::new(&arena);
        buf.push_str("hello");
        buf.push_char(' ');
        buf.push_str("world");
        let text = buf.finish();
        assert_eq!(text, "hello world");
        assert_eq!(text.len(), 11);
    }

    #[test]
    fn growth_stays_in_place_when_last_allocation() {
        let arena = Arena::with_chunk_size(1024);
        let mut buf = ArenaString::new(&arena);
        buf.push_str("0123456789abcdef");
        let before = buf.as_str().as_ptr();
        buf.push_str("more text to force growth");
        assert_eq!(buf.as_str().as_ptr(), before);
        assert_eq!(buf.as_str(), "0123456789abcdefmore text to force growth");
    }

    #[test]
    fn growth_copies_when_interleaved() {
        let arena = Arena::with_chunk_size(1024);
        let mut buf = ArenaString::new(&arena);
        buf.push_str("0123456789abcdef");
        let other = arena.alloc_str("interleaved");
        buf.push_str("!");
        assert_eq!(buf.as_str(), "0123456789abcdef!");
        assert_eq!(other, "interleaved");
    }

    #[test]
    fn growth_spans_chunks() {
        let arena = Arena::with_chunk_size(32);
        let mut buf = ArenaString::new(&arena);
        for _ in 0..10 {
            buf.push_str("abcdefgh");
        }
        assert_eq!(buf.len(), 80);
        assert!(arena.chunk_count() > 1);
        assert!(buf.as_str().chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn insert_fill_shifts_tail() {
        let arena = StackArena::<128>::new();
        let mut buf = ArenaString::new(&arena);
        buf.push_str("ab");
        buf.insert_fill(1, '*', 3);
        assert_eq!(buf.as_str(), "a***b");
        buf.insert_fill(0, 'é', 2);
        assert_eq!(buf.as_str(), "ééa***b");
        assert_eq!(buf.chars_since(0), 7);
    }

    #[test]
    fn push_fill_multibyte() {
        let arena = StackArena::<64>::new();
        let mut buf = ArenaString::new(&arena);
        buf.push_fill('─', 3);
        assert_eq!(buf.as_str(), "───");
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn truncate_and_clear_keep_capacity() {
        let arena = StackArena::<64>::new();
        let mut buf = ArenaString::with_capacity(&arena, 32);
        buf.push_str("truncate me");
        buf.truncate(8);
        assert_eq!(buf.as_str(), "truncate");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 32);
    }

    #[test]
    #[should_panic(expected = "not a char boundary")]
    fn insert_inside_char_panics() {
        let arena = StackArena::<64>::new();
        let mut buf = ArenaString::new(&arena);
        buf.push_str("é");
        buf.insert_fill(1, ' ', 1);
    }

    #[test]
    fn fmt_write_appends() {
        let arena = StackArena::<64>::new();
        let mut buf = ArenaString::new(&arena);
        write!(buf, "{}-{}", 1, 2).unwrap();
        assert_eq!(buf.as_str(), "1-2");
    }

    #[test]
    fn views_compare_with_str() {
        let arena = Arena::with_chunk_size(64);
        let copied = ArenaStr::copy_in(&arena, "view");
        assert_eq!(copied, "view");
        assert_eq!(copied, ArenaStr::from_static("view"));
        assert_eq!(format!("{copied}"), "view");
        assert_eq!(format!("{copied:?}"), "\"view\"");
        assert_eq!(copied.to_uppercase(), "VIEW");
    }
}
