//! Placeholder body parser.
//!
//! Grammar of the text between `{` and `}`:
//!
//! ```text
//! body      := [argref] [":" spec]
//! spec      := [[fill] align] [sign] ["#"] ["0"] [count] ["." count] [type]
//! argref    := integer | identifier
//! count     := integer | "{" [argref] "}"
//! align     := "<" | ">" | "^"
//! sign      := "+" | "-" | " "
//! type      := "b" | "c" | "d" | "e" | "E" | "f" | "F" | "o" | "s" | "x" | "X"
//! ```

use crate::error::FormatError;
use crate::spec::{Align, ArgRef, Count, Placeholder, Presentation, Sign};

/// Parse a placeholder body.
///
/// `origin` is the byte offset of `body` within the whole format string;
/// error positions are reported relative to the format string.
pub fn parse_placeholder(body: &str, origin: usize) -> Result<Placeholder<'_>, FormatError> {
    let mut cur = Cursor {
        text: body,
        pos: 0,
        origin,
    };
    let mut spec = Placeholder {
        arg: cur.arg_ref()?,
        ..Placeholder::default()
    };
    if cur.at_end() {
        return Ok(spec);
    }
    if !cur.eat(':') {
        return Err(cur.error("expected ':' after argument reference"));
    }

    if let Some(align) = cur.peek_second().and_then(Align::from_char) {
        let fill = cur.bump();
        if matches!(fill, Some('{' | '}')) {
            return Err(cur.error("fill character cannot be a brace"));
        }
        cur.bump();
        spec.fill = fill;
        spec.align = align;
    } else if let Some(align) = cur.peek().and_then(Align::from_char) {
        cur.bump();
        spec.align = align;
    }

    spec.sign = match cur.peek() {
        Some('+') => Sign::Plus,
        Some('-') => Sign::Minus,
        Some(' ') => Sign::Space,
        _ => Sign::Default,
    };
    if spec.sign != Sign::Default {
        cur.bump();
    }
    spec.alternate = cur.eat('#');
    spec.zero_pad = cur.eat('0');
    spec.width = cur.count()?;
    if cur.eat('.') {
        spec.precision = cur.count()?;
        if spec.precision.is_none() {
            return Err(cur.error("expected precision after '.'"));
        }
    }

    if let Some(found) = cur.peek() {
        let position = cur.offset();
        spec.presentation = Presentation::from_char(found)
            .ok_or(FormatError::UnknownPresentation { position, found })?;
        cur.bump();
    }
    if !cur.at_end() {
        return Err(cur.error("unexpected characters after presentation type"));
    }
    Ok(spec)
}

struct Cursor<'f> {
    text: &'f str,
    pos: usize,
    origin: usize,
}

impl<'f> Cursor<'f> {
    fn rest(&self) -> &'f str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    fn offset(&self) -> usize {
        self.origin + self.pos
    }

    fn error(&self, reason: &'static str) -> FormatError {
        FormatError::InvalidSpec {
            position: self.offset(),
            reason,
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'f str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    fn integer(&mut self) -> Result<Option<usize>, FormatError> {
        let start = self.offset();
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Ok(None);
        }
        digits.parse().map(Some).map_err(|_| FormatError::InvalidSpec {
            position: start,
            reason: "number too large",
        })
    }

    fn arg_ref(&mut self) -> Result<Option<ArgRef<'f>>, FormatError> {
        if let Some(index) = self.integer()? {
            return Ok(Some(ArgRef::Index(index)));
        }
        if self.peek().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
            let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            return Ok(Some(ArgRef::Name(name)));
        }
        Ok(None)
    }

    fn count(&mut self) -> Result<Option<Count<'f>>, FormatError> {
        if self.eat('{') {
            let arg = self.arg_ref()?;
            if !self.eat('}') {
                return Err(self.error("expected '}' after nested argument reference"));
            }
            return Ok(Some(Count::Arg(arg)));
        }
        Ok(self.integer()?.map(Count::Literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Placeholder<'_> {
        parse_placeholder(body, 0).unwrap()
    }

    #[test]
    fn empty_body_is_default() {
        assert_eq!(parse(""), Placeholder::default());
    }

    #[test]
    fn positional_and_named_refs() {
        assert_eq!(parse("3").arg, Some(ArgRef::Index(3)));
        assert_eq!(parse("name_2").arg, Some(ArgRef::Name("name_2")));
        assert_eq!(parse(":x").arg, None);
    }

    #[test]
    fn fill_and_align() {
        let spec = parse(":*^9");
        assert_eq!(spec.fill, Some('*'));
        assert_eq!(spec.align, Align::Center);
        assert_eq!(spec.width, Some(Count::Literal(9)));

        let spec = parse(":<");
        assert_eq!(spec.fill, None);
        assert_eq!(spec.align, Align::Left);
    }

    #[test]
    fn align_char_can_be_fill() {
        let spec = parse(":<<4");
        assert_eq!(spec.fill, Some('<'));
        assert_eq!(spec.align, Align::Left);
    }

    #[test]
    fn multibyte_fill() {
        let spec = parse(":·>6");
        assert_eq!(spec.fill, Some('·'));
        assert_eq!(spec.align, Align::Right);
    }

    #[test]
    fn full_spec() {
        let spec = parse("1:_>+#010.3x");
        assert_eq!(spec.arg, Some(ArgRef::Index(1)));
        assert_eq!(spec.fill, Some('_'));
        assert_eq!(spec.align, Align::Right);
        assert_eq!(spec.sign, Sign::Plus);
        assert!(spec.alternate);
        assert!(spec.zero_pad);
        assert_eq!(spec.width, Some(Count::Literal(10)));
        assert_eq!(spec.precision, Some(Count::Literal(3)));
        assert_eq!(spec.presentation, Presentation::Hex);
    }

    #[test]
    fn zero_flag_without_width() {
        let spec = parse(":0");
        assert!(spec.zero_pad);
        assert_eq!(spec.width, None);
    }

    #[test]
    fn nested_counts() {
        let spec = parse("0:{1}.{prec}");
        assert_eq!(spec.width, Some(Count::Arg(Some(ArgRef::Index(1)))));
        assert_eq!(
            spec.precision,
            Some(Count::Arg(Some(ArgRef::Name("prec"))))
        );
        assert_eq!(parse(":{}").width, Some(Count::Arg(None)));
    }

    #[test]
    fn space_sign() {
        assert_eq!(parse(": d").sign, Sign::Space);
        assert_eq!(parse(":-").sign, Sign::Minus);
    }

    #[test]
    fn unknown_type_reports_position() {
        let err = parse_placeholder(":5q", 10).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownPresentation {
                position: 12,
                found: 'q'
            }
        );
    }

    #[test]
    fn unknown_alignment_char_is_rejected() {
        let err = parse_placeholder(":*5", 0).unwrap_err();
        assert!(matches!(
            err,
            FormatError::UnknownPresentation { found: '*', .. }
        ));
    }

    #[test]
    fn missing_colon() {
        let err = parse_placeholder("0x", 0).unwrap_err();
        assert!(matches!(err, FormatError::InvalidSpec { position: 1, .. }));
    }

    #[test]
    fn missing_precision() {
        let err = parse_placeholder(":.f", 0).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidSpec {
                reason: "expected precision after '.'",
                ..
            }
        ));
    }

    #[test]
    fn trailing_garbage() {
        let err = parse_placeholder(":xx", 0).unwrap_err();
        assert!(matches!(err, FormatError::InvalidSpec { position: 2, .. }));
    }

    #[test]
    fn unclosed_nested_count() {
        let err = parse_placeholder(":{1", 0).unwrap_err();
        assert!(matches!(err, FormatError::InvalidSpec { .. }));
    }

    #[test]
    fn oversized_number() {
        let err = parse_placeholder(":99999999999999999999999", 0).unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidSpec {
                position: 1,
                reason: "number too large"
            }
        );
    }

    #[test]
    fn brace_fill_rejected() {
        let err = parse_placeholder(":{<5", 0).unwrap_err();
        assert!(matches!(err, FormatError::InvalidSpec { .. }));
    }
}
