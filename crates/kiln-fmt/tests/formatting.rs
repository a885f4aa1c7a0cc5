//! End-to-end formatting through the public API.

use kiln_arena::{Arena, ArenaStr, ArenaString, Bump, StackArena};
use kiln_fmt::{
    apply_width, format, format_in, named, println_out, write_to, Align, Format, FormatError,
    FormatSpec, Presentation,
};
use proptest::prelude::*;

/// A fixed-point value stored in hundredths.
struct Cents(i64);

impl Format for Cents {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        if spec.presentation != Presentation::Default {
            return Err(spec.unsupported("Cents"));
        }
        let start = out.len();
        if self.0 < 0 {
            out.push_char('-');
        }
        let abs = self.0.unsigned_abs();
        let whole = FormatSpec::default();
        (abs / 100).format(&whole, out)?;
        out.push_char('.');
        (abs % 100).format(&whole.with_precision(2), out)?;
        Ok(apply_width(out, start, 0, spec, Align::Right, false))
    }
}

#[test]
fn basic_examples() {
    let arena = Arena::with_chunk_size(256);
    assert_eq!(format(&arena, "{}", &(42,)).unwrap(), "42");
    assert_eq!(format(&arena, "{0} {0}", &("x",)).unwrap(), "x x");
    assert_eq!(format(&arena, "{:5}", &(3,)).unwrap(), "    3");
    assert_eq!(format(&arena, "{:.2}", &(3.14159,)).unwrap(), "3.14");
    assert_eq!(format(&arena, "{{}}", &()).unwrap(), "{}");
    assert_eq!(
        format(&arena, "{2}", &(1, 2)),
        Err(FormatError::ArgumentOutOfRange { index: 2, count: 2 })
    );
}

#[test]
fn custom_type_participates_in_dispatch() {
    let arena = Arena::with_chunk_size(256);
    let text = format_in!(&arena, "[{:>8}] [{}]", Cents(-1205), Cents(7)).unwrap();
    assert_eq!(text, "[  -12.05] [0.07]");
    let err = format_in!(&arena, "{:x}", Cents(1)).unwrap_err();
    assert_eq!(
        err,
        FormatError::UnsupportedPresentation {
            type_name: "Cents",
            presentation: 'x'
        }
    );
}

#[test]
fn macro_borrows_arguments() {
    let arena = Arena::with_chunk_size(256);
    let label = ArenaStr::copy_in(&arena, "load");
    let value = 0.7f32;
    let text = format_in!(&arena, "{}={:.1}{unit}", label, value, named("unit", '%'),).unwrap();
    assert_eq!(text, "load=0.7%");
    assert_eq!(label, "load");
}

#[test]
fn formatting_in_a_stack_arena() {
    let arena = StackArena::<256>::new();
    let text = format(&arena, "{:^9}|{:08.3}|{:#b}", &("mid", -2.5, 5u8)).unwrap();
    assert_eq!(text, "   mid   |-002.500|0b101");
    assert!(arena.used() >= text.len());
}

#[test]
fn results_live_as_long_as_the_arena() {
    let arena = Arena::with_chunk_size(64);
    let lines: Vec<ArenaStr<'_>> = (0..20)
        .map(|i| format(&arena, "line {:>3}", &(i,)).unwrap())
        .collect();
    assert!(arena.chunk_count() > 1);
    assert_eq!(lines[0], "line   0");
    assert_eq!(lines[19], "line  19");
}

#[test]
fn huge_float_precision_is_not_a_panic() {
    let arena = Arena::with_chunk_size(256);
    let fixed = format(&arena, "{:.70000}", &(1.5f64,)).unwrap();
    assert_eq!(fixed.len(), 70_002);
    assert!(fixed.starts_with("1.5000"));

    let exp = format(&arena, "{:.{}e}", &(1.5f64, 70_000usize)).unwrap();
    assert_eq!(exp.len(), 70_006);
    assert!(exp.starts_with("1.5000"));
    assert!(exp.ends_with("0e+00"));
}

#[test]
fn write_to_vec() {
    let arena = Arena::with_chunk_size(256);
    let mut sink = Vec::new();
    write_to(&arena, &mut sink, "{a}:{b}", &(named("a", 1), named("b", true))).unwrap();
    assert_eq!(sink, b"1:true");
}

#[test]
fn println_macro_reports_length() {
    assert_eq!(println_out!("{} {}", "kiln", 1), Ok(7));
}

proptest! {
    #[test]
    fn hex_round_trips_u64(value in any::<u64>()) {
        let arena = Arena::with_chunk_size(128);
        let text = format(&arena, "{:x}", &(value,)).unwrap();
        prop_assert_eq!(u64::from_str_radix(&text, 16).unwrap(), value);
        let upper = format(&arena, "{:X}", &(value,)).unwrap();
        prop_assert_eq!(upper.as_str(), text.to_uppercase());
    }

    #[test]
    fn hex_round_trips_i64(value in any::<i64>()) {
        let arena = Arena::with_chunk_size(128);
        let text = format(&arena, "{:x}", &(value,)).unwrap();
        prop_assert_eq!(i64::from_str_radix(&text, 16).unwrap(), value);
    }

    #[test]
    fn width_is_a_minimum(value in any::<i32>(), width in 0usize..40) {
        let arena = Arena::with_chunk_size(128);
        let text = format(&arena, "{:{}}", &(value, width)).unwrap();
        let plain = value.to_string();
        prop_assert_eq!(text.chars().count(), width.max(plain.len()));
        prop_assert!(text.ends_with(plain.as_str()));
    }

    #[test]
    fn decimal_matches_std(value in any::<i128>()) {
        let arena = StackArena::<64>::new();
        let text = format(&arena, "{}", &(value,)).unwrap();
        prop_assert_eq!(text.as_str(), value.to_string());
    }
}
