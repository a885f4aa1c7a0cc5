//! The `Format` trait and its built-in implementations.
//!
//! Dispatch is static: each argument's concrete type selects its
//! [`Format`] impl at compile time, and argument packs
//! ([`Args`](crate::Args)) select the impl for a runtime index with a
//! `match` over tuple positions.
//!
//! Every impl writes its text at the end of the output buffer and then
//! calls [`apply_width`] to pad the field.

use std::fmt::Write as _;

use kiln_arena::{ArenaStr, ArenaString, Bump};

use crate::error::FormatError;
use crate::spec::{Align, FormatSpec, Presentation, Sign};

/// A value that can render itself under a [`FormatSpec`].
///
/// Implement this for your own types to use them as format arguments.
/// Return the number of bytes appended to `out`.
///
/// ```
/// use kiln_arena::{ArenaString, Bump, StackArena};
/// use kiln_fmt::{apply_width, format, Align, Format, FormatError, FormatSpec};
///
/// struct Meters(u32);
///
/// impl Format for Meters {
///     fn format<A: Bump>(
///         &self,
///         spec: &FormatSpec,
///         out: &mut ArenaString<'_, A>,
///     ) -> Result<usize, FormatError> {
///         let start = out.len();
///         self.0.format(&FormatSpec::default(), out)?;
///         out.push_str(" m");
///         Ok(apply_width(out, start, 0, spec, Align::Right, false))
///     }
/// }
///
/// let arena = StackArena::<128>::new();
/// let text = format(&arena, "[{:>6}]", &(Meters(12),)).unwrap();
/// assert_eq!(text, "[  12 m]");
/// ```
pub trait Format {
    /// Append this value to `out` as directed by `spec`.
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError>;

    /// The value as a width or precision, if this is an integer type.
    fn as_count(&self) -> Option<i128> {
        None
    }

    /// The name this argument answers to in `{name}` references.
    fn arg_name(&self) -> Option<&str> {
        None
    }
}

/// Pad the field written at `out[start..]` to `spec.width` chars.
///
/// `default_align` applies when `spec.align` is [`Align::Default`]. With
/// `numeric` set, a zero-pad flag and default alignment, zeros go after the
/// first `prefix_len` bytes (sign and radix prefix) instead of fill chars.
/// Returns the field length in bytes.
pub fn apply_width<A: Bump>(
    out: &mut ArenaString<'_, A>,
    start: usize,
    prefix_len: usize,
    spec: &FormatSpec,
    default_align: Align,
    numeric: bool,
) -> usize {
    let Some(width) = spec.width else {
        return out.len() - start;
    };
    let pad = width.saturating_sub(out.chars_since(start));
    if pad == 0 {
        return out.len() - start;
    }
    if numeric && spec.zero_pad && spec.align == Align::Default {
        out.insert_fill(start + prefix_len, '0', pad);
        return out.len() - start;
    }
    let align = match spec.align {
        Align::Default => default_align,
        other => other,
    };
    match align {
        Align::Left | Align::Default => out.push_fill(spec.fill, pad),
        Align::Right => out.insert_fill(start, spec.fill, pad),
        Align::Center => {
            let before = pad / 2;
            out.insert_fill(start, spec.fill, before);
            out.push_fill(spec.fill, pad - before);
        }
    }
    out.len() - start
}

fn push_sign<A: Bump>(out: &mut ArenaString<'_, A>, negative: bool, sign: Sign) {
    match (negative, sign) {
        (true, _) => out.push_char('-'),
        (false, Sign::Plus) => out.push_char('+'),
        (false, Sign::Space) => out.push_char(' '),
        (false, Sign::Default | Sign::Minus) => {}
    }
}

const LOWER_DIGITS: &[u8; 16] = b"0123456789abcdef";
const UPPER_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn push_digits<A: Bump>(out: &mut ArenaString<'_, A>, mut value: u128, radix: u32, upper: bool) {
    let table = if upper { UPPER_DIGITS } else { LOWER_DIGITS };
    let radix = u128::from(radix);
    // Largest case is u128 in binary.
    let mut buf = [0u8; 128];
    let mut at = buf.len();
    loop {
        at -= 1;
        buf[at] = table[(value % radix) as usize];
        value /= radix;
        if value == 0 {
            break;
        }
    }
    out.reserve(buf.len() - at);
    for &digit in &buf[at..] {
        out.push_char(char::from(digit));
    }
}

fn write_integer<A: Bump>(
    negative: bool,
    magnitude: u128,
    spec: &FormatSpec,
    out: &mut ArenaString<'_, A>,
    type_name: &'static str,
) -> Result<usize, FormatError> {
    let (radix, prefix) = match spec.presentation {
        Presentation::Default | Presentation::Decimal => (10, ""),
        Presentation::Hex => (16, "0x"),
        Presentation::HexUpper => (16, "0X"),
        Presentation::Octal => (8, "0o"),
        Presentation::Binary => (2, "0b"),
        Presentation::Char => {
            let ch = u32::try_from(magnitude)
                .ok()
                .filter(|_| !negative)
                .and_then(char::from_u32)
                .ok_or(FormatError::RenderFailed { type_name })?;
            return write_char(ch, spec, out);
        }
        _ => return Err(spec.unsupported(type_name)),
    };
    let start = out.len();
    push_sign(out, negative, spec.sign);
    if spec.alternate {
        out.push_str(prefix);
    }
    let prefix_len = out.len() - start;
    if let Some(min_digits) = spec.precision {
        let digits = if magnitude == 0 {
            1
        } else {
            magnitude.ilog(u128::from(radix)) as usize + 1
        };
        out.push_fill('0', min_digits.saturating_sub(digits));
    }
    push_digits(out, magnitude, radix, spec.presentation.is_upper());
    Ok(apply_width(out, start, prefix_len, spec, Align::Right, true))
}

macro_rules! format_unsigned {
    ($($t:ty),*) => {$(
        impl Format for $t {
            fn format<A: Bump>(
                &self,
                spec: &FormatSpec,
                out: &mut ArenaString<'_, A>,
            ) -> Result<usize, FormatError> {
                write_integer(false, *self as u128, spec, out, stringify!($t))
            }

            fn as_count(&self) -> Option<i128> {
                Some(i128::try_from(*self).unwrap_or(i128::MAX))
            }
        }
    )*};
}

macro_rules! format_signed {
    ($($t:ty),*) => {$(
        impl Format for $t {
            fn format<A: Bump>(
                &self,
                spec: &FormatSpec,
                out: &mut ArenaString<'_, A>,
            ) -> Result<usize, FormatError> {
                write_integer(
                    *self < 0,
                    self.unsigned_abs() as u128,
                    spec,
                    out,
                    stringify!($t),
                )
            }

            fn as_count(&self) -> Option<i128> {
                Some(*self as i128)
            }
        }
    )*};
}

format_unsigned!(u8, u16, u32, u64, u128, usize);
format_signed!(i8, i16, i32, i64, i128, isize);

/// The float operations rendering needs, for `f32` and `f64`.
trait Float: Copy + std::fmt::Display + std::fmt::LowerExp {
    const NAME: &'static str;
    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn is_sign_negative(self) -> bool;
    fn abs(self) -> Self;
}

macro_rules! float_impl {
    ($($t:ident),*) => {$(
        impl Float for $t {
            const NAME: &'static str = stringify!($t);
            fn is_nan(self) -> bool {
                $t::is_nan(self)
            }
            fn is_infinite(self) -> bool {
                $t::is_infinite(self)
            }
            fn is_sign_negative(self) -> bool {
                $t::is_sign_negative(self)
            }
            fn abs(self) -> Self {
                $t::abs(self)
            }
        }

        impl Format for $t {
            fn format<A: Bump>(
                &self,
                spec: &FormatSpec,
                out: &mut ArenaString<'_, A>,
            ) -> Result<usize, FormatError> {
                write_float(*self, spec, out)
            }
        }
    )*};
}

float_impl!(f32, f64);

const MAX_FMT_PRECISION: usize = u16::MAX as usize;

fn write_float<A: Bump, F: Float>(
    value: F,
    spec: &FormatSpec,
    out: &mut ArenaString<'_, A>,
) -> Result<usize, FormatError> {
    let failed = |_| FormatError::RenderFailed { type_name: F::NAME };
    let upper = spec.presentation.is_upper();
    let exponent = match spec.presentation {
        Presentation::Default | Presentation::Fixed | Presentation::FixedUpper => false,
        Presentation::Exp | Presentation::ExpUpper => true,
        _ => return Err(spec.unsupported(F::NAME)),
    };

    let start = out.len();
    push_sign(out, value.is_sign_negative() && !value.is_nan(), spec.sign);
    let prefix_len = out.len() - start;

    if value.is_nan() || value.is_infinite() {
        let word = match (value.is_nan(), upper) {
            (true, false) => "nan",
            (true, true) => "NAN",
            (false, false) => "inf",
            (false, true) => "INF",
        };
        out.push_str(word);
        return Ok(apply_width(out, start, prefix_len, spec, Align::Right, false));
    }

    let magnitude = value.abs();
    let body = out.len();
    // `core::fmt` caps precision at `u16::MAX`. No float has a nonzero digit
    // that far out, so the rest is zeros.
    let requested = spec.precision.unwrap_or(6);
    let precision = requested.min(MAX_FMT_PRECISION);
    let extra_zeros = requested - precision;
    if exponent {
        write!(out, "{magnitude:.precision$e}").map_err(failed)?;
        if extra_zeros > 0 {
            let marker = out.as_str()[body..].find('e').map_or(out.len(), |e| body + e);
            out.insert_fill(marker, '0', extra_zeros);
        }
        normalize_exponent(out, body, upper)?;
    } else if spec.presentation == Presentation::Default && spec.precision.is_none() {
        write!(out, "{magnitude}").map_err(failed)?;
    } else {
        write!(out, "{magnitude:.precision$}").map_err(failed)?;
        out.push_fill('0', extra_zeros);
    }

    if spec.alternate && !out.as_str()[body..].contains('.') {
        let at = out.as_str()[body..]
            .find(['e', 'E'])
            .map_or(out.len(), |e| body + e);
        out.insert_fill(at, '.', 1);
    }
    Ok(apply_width(out, start, prefix_len, spec, Align::Right, true))
}

/// Rewrite the trailing `e<exp>` after `body` as `e+XX` / `e-XX`.
fn normalize_exponent<A: Bump>(
    out: &mut ArenaString<'_, A>,
    body: usize,
    upper: bool,
) -> Result<(), FormatError> {
    let failed = FormatError::RenderFailed { type_name: "float" };
    let text = out.as_str();
    let marker = body + text[body..].find('e').ok_or(failed.clone())?;
    let exp: i32 = text[marker + 1..].parse().map_err(|_| failed.clone())?;
    out.truncate(marker);
    out.push_char(if upper { 'E' } else { 'e' });
    out.push_char(if exp < 0 { '-' } else { '+' });
    write!(out, "{:02}", exp.unsigned_abs()).map_err(|_| failed)
}

fn write_text<A: Bump>(
    text: &str,
    spec: &FormatSpec,
    out: &mut ArenaString<'_, A>,
    type_name: &'static str,
) -> Result<usize, FormatError> {
    if !matches!(spec.presentation, Presentation::Default | Presentation::Str) {
        return Err(spec.unsupported(type_name));
    }
    let text = match spec.precision.and_then(|max| text.char_indices().nth(max)) {
        Some((cut, _)) => &text[..cut],
        None => text,
    };
    let start = out.len();
    out.push_str(text);
    Ok(apply_width(out, start, 0, spec, Align::Left, false))
}

fn write_char<A: Bump>(
    ch: char,
    spec: &FormatSpec,
    out: &mut ArenaString<'_, A>,
) -> Result<usize, FormatError> {
    let start = out.len();
    out.push_char(ch);
    Ok(apply_width(out, start, 0, spec, Align::Left, false))
}

impl Format for str {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        write_text(self, spec, out, "str")
    }
}

impl Format for ArenaStr<'_> {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        write_text(self.as_str(), spec, out, "ArenaStr")
    }
}

impl<B: Bump> Format for ArenaString<'_, B> {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        write_text(self.as_str(), spec, out, "ArenaString")
    }
}

impl Format for bool {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        write_text(if *self { "true" } else { "false" }, spec, out, "bool")
    }
}

impl Format for char {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        match spec.presentation {
            Presentation::Default | Presentation::Char | Presentation::Str => {
                write_char(*self, spec, out)
            }
            _ => write_integer(false, u128::from(u32::from(*self)), spec, out, "char"),
        }
    }
}

impl<T: Format + ?Sized> Format for &T {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        (**self).format(spec, out)
    }

    fn as_count(&self) -> Option<i128> {
        (**self).as_count()
    }

    fn arg_name(&self) -> Option<&str> {
        (**self).arg_name()
    }
}

/// An argument that can be referenced by name, `{width}`.
///
/// Built with [`named`]. A named argument still occupies its position, so
/// it can also be referenced by index or consumed by `{}`.
#[derive(Clone, Copy, Debug)]
pub struct Named<'n, T> {
    name: &'n str,
    value: T,
}

/// Attach `name` to `value` for use in `{name}` references.
pub fn named<T: Format>(name: &str, value: T) -> Named<'_, T> {
    Named { name, value }
}

impl<T> Named<'_, T> {
    /// The wrapped value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Format> Format for Named<'_, T> {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        self.value.format(spec, out)
    }

    fn as_count(&self) -> Option<i128> {
        self.value.as_count()
    }

    fn arg_name(&self) -> Option<&str> {
        Some(self.name)
    }
}
