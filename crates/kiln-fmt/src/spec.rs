//! Format specifier types.
//!
//! A [`Placeholder`] is what the parser reads out of `{...}`: width and
//! precision may still point at other arguments. The engine resolves those
//! references and hands rendering routines a plain [`FormatSpec`].

use crate::error::FormatError;

/// How a placeholder names its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgRef<'f> {
    /// Explicit position, `{1}`.
    Index(usize),
    /// Name of a [`Named`](crate::Named) argument, `{width}`.
    Name(&'f str),
}

/// A width or precision as written in the placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Count<'f> {
    /// A decimal literal, `{:8}`.
    Literal(usize),
    /// Taken from an integer argument at render time, `{:{1}}`.
    /// `None` means the next positional argument, `{:{}}`.
    Arg(Option<ArgRef<'f>>),
}

/// Text alignment within the field width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// The type's natural alignment: numbers right, text left.
    #[default]
    Default,
    /// `<`
    Left,
    /// `>`
    Right,
    /// `^`
    Center,
}

impl Align {
    /// Parse an alignment character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Left),
            '>' => Some(Self::Right),
            '^' => Some(Self::Center),
            _ => None,
        }
    }
}

/// Sign policy for numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sign {
    /// Same as [`Sign::Minus`].
    #[default]
    Default,
    /// `+`: always show a sign.
    Plus,
    /// `-`: sign only for negative values.
    Minus,
    /// space: a space in place of the plus sign.
    Space,
}

/// Presentation type, the last character of a specifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Presentation {
    /// No type character: the type's default presentation.
    #[default]
    Default,
    /// `b`
    Binary,
    /// `c`
    Char,
    /// `d`
    Decimal,
    /// `e`
    Exp,
    /// `E`
    ExpUpper,
    /// `f`
    Fixed,
    /// `F`
    FixedUpper,
    /// `o`
    Octal,
    /// `s`
    Str,
    /// `x`
    Hex,
    /// `X`
    HexUpper,
}

impl Presentation {
    /// Parse a presentation character.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'b' => Self::Binary,
            'c' => Self::Char,
            'd' => Self::Decimal,
            'e' => Self::Exp,
            'E' => Self::ExpUpper,
            'f' => Self::Fixed,
            'F' => Self::FixedUpper,
            'o' => Self::Octal,
            's' => Self::Str,
            'x' => Self::Hex,
            'X' => Self::HexUpper,
            _ => return None,
        })
    }

    /// The character selecting this presentation; `None` for the default.
    pub fn as_char(self) -> Option<char> {
        Some(match self {
            Self::Default => return None,
            Self::Binary => 'b',
            Self::Char => 'c',
            Self::Decimal => 'd',
            Self::Exp => 'e',
            Self::ExpUpper => 'E',
            Self::Fixed => 'f',
            Self::FixedUpper => 'F',
            Self::Octal => 'o',
            Self::Str => 's',
            Self::Hex => 'x',
            Self::HexUpper => 'X',
        })
    }

    /// Whether this presentation asks for upper-case output.
    pub fn is_upper(self) -> bool {
        matches!(self, Self::ExpUpper | Self::FixedUpper | Self::HexUpper)
    }
}

/// A placeholder body as parsed, before argument references are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placeholder<'f> {
    /// Explicit argument reference; `None` takes the next positional one.
    pub arg: Option<ArgRef<'f>>,
    /// Fill character, if given.
    pub fill: Option<char>,
    /// Alignment.
    pub align: Align,
    /// Sign policy.
    pub sign: Sign,
    /// `#`: alternate form (radix prefixes, forced decimal point).
    pub alternate: bool,
    /// `0`: pad numbers with zeros after the sign.
    pub zero_pad: bool,
    /// Minimum field width in chars.
    pub width: Option<Count<'f>>,
    /// Precision: digits for numbers, max chars for text.
    pub precision: Option<Count<'f>>,
    /// Presentation type.
    pub presentation: Presentation,
}

/// A fully resolved specifier, as seen by [`Format`](crate::Format) impls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    /// Fill character used for padding. Defaults to a space.
    pub fill: char,
    /// Alignment.
    pub align: Align,
    /// Sign policy.
    pub sign: Sign,
    /// Alternate form.
    pub alternate: bool,
    /// Zero padding after the sign (numbers, default alignment only).
    pub zero_pad: bool,
    /// Minimum field width in chars.
    pub width: Option<usize>,
    /// Precision.
    pub precision: Option<usize>,
    /// Presentation type.
    pub presentation: Presentation,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: Align::Default,
            sign: Sign::Default,
            alternate: false,
            zero_pad: false,
            width: None,
            precision: None,
            presentation: Presentation::Default,
        }
    }
}

impl FormatSpec {
    /// Set the width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the precision.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set fill and alignment.
    pub fn with_align(mut self, fill: char, align: Align) -> Self {
        self.fill = fill;
        self.align = align;
        self
    }

    /// Set the sign policy.
    pub fn with_sign(mut self, sign: Sign) -> Self {
        self.sign = sign;
        self
    }

    /// Set the presentation type.
    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    /// The error for a type that cannot honour this presentation.
    pub fn unsupported(&self, type_name: &'static str) -> FormatError {
        FormatError::UnsupportedPresentation {
            type_name,
            presentation: self.presentation.as_char().unwrap_or('?'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presentation_chars_round_trip() {
        for c in "bcdeEfFosxX".chars() {
            let p = Presentation::from_char(c).unwrap();
            assert_eq!(p.as_char(), Some(c));
        }
        assert_eq!(Presentation::from_char('q'), None);
        assert_eq!(Presentation::Default.as_char(), None);
    }

    #[test]
    fn default_spec_is_blank() {
        let spec = FormatSpec::default();
        assert_eq!(spec.fill, ' ');
        assert_eq!(spec.width, None);
        assert_eq!(spec.presentation, Presentation::Default);
    }

    #[test]
    fn unsupported_names_presentation() {
        let spec = FormatSpec::default().with_presentation(Presentation::Hex);
        assert_eq!(
            spec.unsupported("str"),
            FormatError::UnsupportedPresentation {
                type_name: "str",
                presentation: 'x'
            }
        );
    }
}
