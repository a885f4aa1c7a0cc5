//! Typed, arena-backed text formatting for Kiln.
//!
//! Format strings use a compact specifier language,
//! `{[argref][:[[fill]align][sign][#][0][width][.precision][type]]}`, and
//! render into an [`ArenaString`](kiln_arena::ArenaString) owned by any
//! [`Bump`](kiln_arena::Bump) arena. Arguments are dispatched statically
//! through the [`Format`] trait; there are no trait objects and no heap
//! allocation outside the arena.
//!
//! # Architecture
//!
//! ```text
//! format / format_into (engine)
//! ├── parse_placeholder → Placeholder   (parse, spec)
//! ├── Args::render(index) → Format impl (args, render)
//! └── ArenaString (kiln-arena)
//! print / write_to (print) → std::io::Write
//! ```
//!
//! # Example
//!
//! ```
//! use kiln_arena::Arena;
//! use kiln_fmt::{format_in, named};
//!
//! let arena = Arena::with_chunk_size(256);
//! let text = format_in!(&arena, "{:<6}|{n:>#06x}|{:+.1e}", "cpu", 1234.5, named("n", 255)).unwrap();
//! assert_eq!(text, "cpu   |  0xff|+1.2e+03");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod args;
pub mod engine;
pub mod error;
pub mod parse;
pub mod print;
pub mod render;
pub mod spec;

pub use args::Args;
pub use engine::{format, format_into};
pub use error::FormatError;
pub use parse::parse_placeholder;
pub use print::{print, print_in, println, println_in, write_to, writeln_to, PRINT_CHUNK_SIZE};
pub use render::{apply_width, named, Format, Named};
pub use spec::{Align, ArgRef, Count, FormatSpec, Placeholder, Presentation, Sign};

/// Format into an arena, taking arguments by reference.
///
/// `format_in!(arena, fmt, a, b)` is `format(arena, fmt, &(&a, &b))`.
#[macro_export]
macro_rules! format_in {
    ($arena:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::format($arena, $fmt, &($(&$arg,)*))
    };
}

/// Print to stdout through a transient arena.
#[macro_export]
macro_rules! print_out {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::print($fmt, &($(&$arg,)*))
    };
}

/// Print a line to stdout through a transient arena.
#[macro_export]
macro_rules! println_out {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::println($fmt, &($(&$arg,)*))
    };
}
