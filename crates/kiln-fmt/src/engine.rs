//! The format engine: scans a format string and renders its placeholders.

use kiln_arena::{ArenaStr, ArenaString, Bump};
use tracing::debug;

use crate::args::Args;
use crate::error::FormatError;
use crate::parse::parse_placeholder;
use crate::spec::{ArgRef, Count, FormatSpec, Placeholder};

/// Render `fmt` with `args` into a new arena-owned string.
///
/// ```
/// use kiln_arena::Arena;
///
/// let arena = Arena::with_chunk_size(256);
/// let text = kiln_fmt::format(&arena, "{0}-{0}: {1:>4}", &("ab", 7)).unwrap();
/// assert_eq!(text, "ab-ab:    7");
/// ```
pub fn format<'a, A: Bump, T: Args + ?Sized>(
    arena: &'a A,
    fmt: &str,
    args: &T,
) -> Result<ArenaStr<'a>, FormatError> {
    let mut out = ArenaString::with_capacity(arena, fmt.len());
    format_into(&mut out, fmt, args)?;
    Ok(out.finish())
}

/// Append `fmt` rendered with `args` to `out`.
///
/// Returns the number of bytes appended. On error `out` is truncated back
/// to its length before the call.
pub fn format_into<A: Bump, T: Args + ?Sized>(
    out: &mut ArenaString<'_, A>,
    fmt: &str,
    args: &T,
) -> Result<usize, FormatError> {
    let start = out.len();
    let mut engine = Engine {
        fmt,
        args,
        next: 0,
    };
    match engine.run(out) {
        Ok(()) => Ok(out.len() - start),
        Err(err) => {
            debug!(%err, fmt, "format string rejected");
            out.truncate(start);
            Err(err)
        }
    }
}

struct Engine<'f, 'a, T: ?Sized> {
    fmt: &'f str,
    args: &'a T,
    /// Index taken by the next placeholder without an explicit reference.
    next: usize,
}

impl<'f, T: Args + ?Sized> Engine<'f, '_, T> {
    fn run<A: Bump>(&mut self, out: &mut ArenaString<'_, A>) -> Result<(), FormatError> {
        let fmt = self.fmt;
        let bytes = fmt.as_bytes();
        let mut literal = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    out.push_str(&fmt[literal..=i]);
                    i += 2;
                    literal = i;
                }
                b'{' => {
                    out.push_str(&fmt[literal..i]);
                    let close = find_close(bytes, i)
                        .ok_or(FormatError::UnterminatedPlaceholder { position: i })?;
                    let placeholder = parse_placeholder(&fmt[i + 1..close], i + 1)?;
                    self.render(&placeholder, i, out)?;
                    i = close + 1;
                    literal = i;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    out.push_str(&fmt[literal..=i]);
                    i += 2;
                    literal = i;
                }
                b'}' => return Err(FormatError::UnmatchedBrace { position: i }),
                _ => i += 1,
            }
        }
        out.push_str(&fmt[literal..]);
        Ok(())
    }

    /// Resolve `placeholder` against the arguments and render it.
    ///
    /// The value is resolved before width and precision, so with implicit
    /// references `{:{}.{}}` takes value, width, precision in that order.
    fn render<A: Bump>(
        &mut self,
        placeholder: &Placeholder<'f>,
        position: usize,
        out: &mut ArenaString<'_, A>,
    ) -> Result<(), FormatError> {
        let index = self.resolve(placeholder.arg, position)?;
        let width = self.count(placeholder.width, position)?;
        let precision = self.count(placeholder.precision, position)?;
        let spec = FormatSpec {
            fill: placeholder.fill.unwrap_or(' '),
            align: placeholder.align,
            sign: placeholder.sign,
            alternate: placeholder.alternate,
            zero_pad: placeholder.zero_pad,
            width,
            precision,
            presentation: placeholder.presentation,
        };
        self.args.render(index, &spec, out)?;
        Ok(())
    }

    fn resolve(&mut self, arg: Option<ArgRef<'f>>, position: usize) -> Result<usize, FormatError> {
        let index = match arg {
            Some(ArgRef::Index(index)) => index,
            Some(ArgRef::Name(name)) => self
                .args
                .position(name)
                .ok_or(FormatError::UnknownArgument { position })?,
            None => {
                let index = self.next;
                self.next += 1;
                index
            }
        };
        if index >= self.args.len() {
            return Err(FormatError::ArgumentOutOfRange {
                index,
                count: self.args.len(),
            });
        }
        Ok(index)
    }

    fn count(
        &mut self,
        count: Option<Count<'f>>,
        position: usize,
    ) -> Result<Option<usize>, FormatError> {
        let arg = match count {
            None => return Ok(None),
            Some(Count::Literal(n)) => return Ok(Some(n)),
            Some(Count::Arg(arg)) => arg,
        };
        let index = self.resolve(arg, position)?;
        let value = self
            .args
            .count(index)
            .ok_or(FormatError::CountNotInteger { index })?;
        if value < 0 {
            return Err(FormatError::NegativeCount { index, value });
        }
        usize::try_from(value)
            .map(Some)
            .map_err(|_| FormatError::CountOverflow { index })
    }
}

/// Offset of the `}` closing the placeholder opened at `open`.
///
/// Nested `{...}` count references are skipped over.
fn find_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &byte) in bytes[open + 1..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(open + 1 + offset),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}
