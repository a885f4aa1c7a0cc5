//! Errors from parsing and rendering format strings.
//!
//! Every variant is recoverable: the caller decides whether a bad format
//! string is fatal. Output written before the failure stays in the arena
//! as an abandoned allocation and is reclaimed with the next bulk release.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors returned by [`format`](crate::format) and friends.
///
/// Positions are byte offsets into the format string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// A `{` without a matching `}`.
    UnterminatedPlaceholder {
        /// Offset of the opening brace.
        position: usize,
    },
    /// A `}` that neither closes a placeholder nor is doubled.
    UnmatchedBrace {
        /// Offset of the stray brace.
        position: usize,
    },
    /// The placeholder body does not follow the specifier grammar.
    InvalidSpec {
        /// Offset of the offending character.
        position: usize,
        /// What was expected there.
        reason: &'static str,
    },
    /// A presentation type character outside the supported set.
    UnknownPresentation {
        /// Offset of the character.
        position: usize,
        /// The character found.
        found: char,
    },
    /// A positional reference past the end of the argument list.
    ArgumentOutOfRange {
        /// The referenced index.
        index: usize,
        /// Number of arguments supplied.
        count: usize,
    },
    /// A named reference that matches no argument.
    UnknownArgument {
        /// Offset of the placeholder holding the name.
        position: usize,
    },
    /// A width or precision reference to a non-integer argument.
    CountNotInteger {
        /// The referenced argument index.
        index: usize,
    },
    /// A width or precision reference to a negative integer.
    NegativeCount {
        /// The referenced argument index.
        index: usize,
        /// The value found.
        value: i128,
    },
    /// A width or precision reference to a value too large for `usize`.
    CountOverflow {
        /// The referenced argument index.
        index: usize,
    },
    /// The argument's type cannot be shown with the requested presentation.
    UnsupportedPresentation {
        /// Name of the argument's type.
        type_name: &'static str,
        /// The requested presentation character.
        presentation: char,
    },
    /// A `core::fmt` bridge reported failure while rendering.
    RenderFailed {
        /// Name of the argument's type.
        type_name: &'static str,
    },
    /// Writing the finished text to its sink failed.
    Io(io::ErrorKind),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedPlaceholder { position } => {
                write!(f, "unterminated placeholder opened at byte {position}")
            }
            Self::UnmatchedBrace { position } => {
                write!(f, "unmatched '}}' at byte {position}")
            }
            Self::InvalidSpec { position, reason } => {
                write!(f, "invalid format spec at byte {position}: {reason}")
            }
            Self::UnknownPresentation { position, found } => {
                write!(f, "unknown presentation type '{found}' at byte {position}")
            }
            Self::ArgumentOutOfRange { index, count } => {
                write!(
                    f,
                    "argument index {index} out of range: {count} arguments supplied"
                )
            }
            Self::UnknownArgument { position } => {
                write!(f, "no argument matches the name used at byte {position}")
            }
            Self::CountNotInteger { index } => {
                write!(f, "width/precision argument {index} is not an integer")
            }
            Self::NegativeCount { index, value } => {
                write!(f, "width/precision argument {index} is negative ({value})")
            }
            Self::CountOverflow { index } => {
                write!(f, "width/precision argument {index} is too large")
            }
            Self::UnsupportedPresentation {
                type_name,
                presentation,
            } => {
                write!(f, "type {type_name} does not support presentation '{presentation}'")
            }
            Self::RenderFailed { type_name } => {
                write!(f, "rendering a value of type {type_name} failed")
            }
            Self::Io(kind) => write!(f, "failed to write formatted output: {kind}"),
        }
    }
}

impl Error for FormatError {}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message() {
        let err = FormatError::ArgumentOutOfRange { index: 2, count: 2 };
        assert_eq!(
            err.to_string(),
            "argument index 2 out of range: 2 arguments supplied"
        );
    }

    #[test]
    fn unmatched_brace_escapes_in_message() {
        let err = FormatError::UnmatchedBrace { position: 4 };
        assert_eq!(err.to_string(), "unmatched '}' at byte 4");
    }

    #[test]
    fn io_error_keeps_kind() {
        let err: FormatError = io::Error::from(io::ErrorKind::BrokenPipe).into();
        assert_eq!(err, FormatError::Io(io::ErrorKind::BrokenPipe));
    }
}
