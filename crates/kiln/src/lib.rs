//! Kiln: arena allocation and arena-backed typed formatting.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Kiln sub-crates. For most users, adding `kiln` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use kiln::prelude::*;
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Format for Point {
//!     fn format<A: Bump>(
//!         &self,
//!         spec: &FormatSpec,
//!         out: &mut ArenaString<'_, A>,
//!     ) -> Result<usize, FormatError> {
//!         let start = out.len();
//!         kiln::fmt::format_into(out, "({}, {})", &(self.x, self.y))?;
//!         Ok(kiln::fmt::apply_width(out, start, 0, spec, Align::Left, false))
//!     }
//! }
//!
//! let mut arena = Arena::with_chunk_size(1024);
//! let label = arena.scope(|arena| {
//!     let text = format_in!(arena, "{:<10}|", Point { x: 3, y: -4 }).unwrap();
//!     assert_eq!(text, "(3, -4)   |");
//!     text.len()
//! });
//! assert_eq!(label, 11);
//! assert_eq!(arena.allocated_bytes(), 0);
//! arena.free();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `kiln-arena` | `Arena`, `StackArena`, `Bump`, `ArenaStr`, `ArenaString`, fatal handler |
//! | [`fmt`] | `kiln-fmt` | Specifier parser, `Format` trait, format engine, print layer |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arenas, arena text, and the fatal handler (`kiln-arena`).
///
/// [`arena::Arena`] grows by chunks; [`arena::StackArena`] is a fixed
/// inline buffer. Both implement [`arena::Bump`].
pub use kiln_arena as arena;

/// Typed formatting into arenas (`kiln-fmt`).
///
/// [`fmt::format`] renders a format string with an argument tuple;
/// implement [`fmt::Format`] to make your own types printable.
pub use kiln_fmt as fmt;

pub use kiln_fmt::{format_in, print_out, println_out};

/// Common imports for typical Kiln usage.
///
/// ```rust
/// use kiln::prelude::*;
/// ```
pub mod prelude {
    // Arenas
    pub use kiln_arena::{Arena, ArenaConfig, ArenaStr, ArenaString, Bump, StackArena};

    // Errors
    pub use kiln_arena::ArenaError;
    pub use kiln_fmt::FormatError;

    // Formatting
    pub use kiln_fmt::{format, named, print, println, Align, Format, FormatSpec};

    // Macros
    pub use kiln_fmt::{format_in, print_out, println_out};
}
