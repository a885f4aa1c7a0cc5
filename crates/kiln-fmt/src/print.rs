//! Writing formatted text to stdout or any `io::Write` sink.
//!
//! The `*_in` and `*_to` functions format into a caller-supplied arena.
//! [`print`] and [`println`] create a transient arena for the call and
//! free it before returning.

use std::io::{self, Write};

use kiln_arena::{Arena, ArenaString, Bump};

use crate::args::Args;
use crate::engine::format_into;
use crate::error::FormatError;

/// Chunk size of the transient arena used by [`print`] and [`println`].
pub const PRINT_CHUNK_SIZE: usize = 256;

fn emit<A: Bump, W: Write + ?Sized, T: Args + ?Sized>(
    arena: &A,
    writer: &mut W,
    fmt: &str,
    args: &T,
    newline: bool,
) -> Result<usize, FormatError> {
    let mut out = ArenaString::with_capacity(arena, fmt.len() + usize::from(newline));
    format_into(&mut out, fmt, args)?;
    if newline {
        out.push_char('\n');
    }
    writer.write_all(out.as_str().as_bytes())?;
    Ok(out.len())
}

/// Format into `arena` and write the text to `writer`.
///
/// Returns the number of bytes written.
pub fn write_to<A: Bump, W: Write + ?Sized, T: Args + ?Sized>(
    arena: &A,
    writer: &mut W,
    fmt: &str,
    args: &T,
) -> Result<usize, FormatError> {
    emit(arena, writer, fmt, args, false)
}

/// [`write_to`] followed by a newline.
pub fn writeln_to<A: Bump, W: Write + ?Sized, T: Args + ?Sized>(
    arena: &A,
    writer: &mut W,
    fmt: &str,
    args: &T,
) -> Result<usize, FormatError> {
    emit(arena, writer, fmt, args, true)
}

fn stdout_in<A: Bump, T: Args + ?Sized>(
    arena: &A,
    fmt: &str,
    args: &T,
    newline: bool,
) -> Result<usize, FormatError> {
    let mut stdout = io::stdout().lock();
    let written = emit(arena, &mut stdout, fmt, args, newline)?;
    stdout.flush()?;
    Ok(written)
}

/// Format into `arena` and write the text to stdout.
pub fn print_in<A: Bump, T: Args + ?Sized>(
    arena: &A,
    fmt: &str,
    args: &T,
) -> Result<usize, FormatError> {
    stdout_in(arena, fmt, args, false)
}

/// [`print_in`] followed by a newline.
pub fn println_in<A: Bump, T: Args + ?Sized>(
    arena: &A,
    fmt: &str,
    args: &T,
) -> Result<usize, FormatError> {
    stdout_in(arena, fmt, args, true)
}

fn transient<T: Args + ?Sized>(fmt: &str, args: &T, newline: bool) -> Result<usize, FormatError> {
    let arena = Arena::with_chunk_size(PRINT_CHUNK_SIZE);
    let result = stdout_in(&arena, fmt, args, newline);
    arena.free();
    result
}

/// Format with a transient arena and write the text to stdout.
pub fn print<T: Args + ?Sized>(fmt: &str, args: &T) -> Result<usize, FormatError> {
    transient(fmt, args, false)
}

/// [`print`] followed by a newline.
pub fn println<T: Args + ?Sized>(fmt: &str, args: &T) -> Result<usize, FormatError> {
    transient(fmt, args, true)
}
