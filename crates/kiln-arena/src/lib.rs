//! Region-based allocation for Kiln.
//!
//! Provides the chunked [`Arena`] that serves as the program's sole
//! allocator, the fixed-capacity [`StackArena`], the [`Bump`] contract both
//! implement, and the length-based text types built on them. This is the
//! only Kiln crate that contains `unsafe` code. The pointer primitives are
//! `unsafe fn`s in the private `raw` module; the `unsafe trait Bump`, its
//! impls for [`Arena`] and [`StackArena`], and [`ArenaString`]'s methods
//! call them under `#[allow(unsafe_code)]`. [`Bump::grow`] is the one
//! `unsafe` method in the public API.
//!
//! # Architecture
//!
//! ```text
//! Arena (RefCell<ChunkList>, ArenaConfig)
//! └── ChunkList → Chunk[] (RawBlock + bump cursor, fill order)
//! StackArena<N> (inline [u8; N] + bump cursor)
//! Bump (alloc_layout / grow + typed helpers)
//! ├── ArenaString (one growable allocation)
//! └── ArenaStr (immutable (ptr, len) view)
//! ```
//!
//! # Release model
//!
//! Nothing is freed individually and no destructors run. Memory comes back
//! in bulk: [`Arena::clear`] keeps every chunk, [`Arena::clear_and_reinit`]
//! keeps only the first, [`Arena::free`] returns them all, and
//! [`Arena::scope`] rewinds to a checkpoint when its closure returns.
//!
//! # Failure model
//!
//! Allocation does not return errors. Unsatisfiable requests go to the
//! process-wide [fatal handler](fatal::fatal). The one recoverable surface is
//! [`Arena::try_with_config`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod chunk;
pub mod config;
pub mod error;
pub mod fatal;
mod raw;
pub mod stack;
pub mod string;
pub mod traits;

// Public re-exports for the primary API surface.
pub use arena::{Arena, ArenaStats};
pub use chunk::Checkpoint;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use fatal::{fatal, set_fatal_handler, FatalHandler};
pub use stack::StackArena;
pub use string::{ArenaStr, ArenaString};
pub use traits::Bump;
