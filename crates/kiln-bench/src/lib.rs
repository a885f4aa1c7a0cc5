//! Benchmark fixtures for Kiln arenas and formatting.
//!
//! - [`Vec3`]: a user-defined [`Format`] type exercising nested dispatch
//! - [`record_args`]: a six-argument tuple in the shape of a log record
//! - [`RECORD_FMT`]: the format string matching [`record_args`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kiln_arena::{ArenaString, Bump};
use kiln_fmt::{apply_width, format_into, Align, Format, FormatError, FormatSpec};

/// A three-component vector rendered as `(x, y, z)`.
///
/// A precision applies to each component; the default is two digits.
#[derive(Clone, Copy, Debug)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Format for Vec3 {
    fn format<A: Bump>(
        &self,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        let start = out.len();
        let precision = spec.precision.unwrap_or(2);
        format_into(
            out,
            "({:.{3}}, {:.{3}}, {:.{3}})",
            &(self.x, self.y, self.z, precision),
        )?;
        Ok(apply_width(out, start, 0, spec, Align::Left, false))
    }
}

/// Format string for [`record_args`].
pub const RECORD_FMT: &str = "[{:>6}] {:<8} id={:#010x} pos={:.3} load={:5.1}% ok={}";

/// Arguments in the shape of a log record, varied by `seed`.
pub fn record_args(seed: u32) -> (u32, &'static str, u64, Vec3, f64, bool) {
    let names = ["render", "physics", "audio", "net"];
    let f = seed as f32;
    (
        seed,
        names[seed as usize % names.len()],
        u64::from(seed).wrapping_mul(0x9e37_79b9),
        Vec3 {
            x: f * 0.5,
            y: -f,
            z: f * 0.25,
        },
        f64::from(seed % 100),
        seed % 2 == 0,
    )
}

#[cfg(test)]
mod tests {
    use kiln_arena::StackArena;
    use kiln_fmt::format;

    use super::*;

    #[test]
    fn vec3_renders_components() {
        let arena = StackArena::<256>::new();
        let v = Vec3 {
            x: 1.0,
            y: -2.5,
            z: 0.3,
        };
        assert_eq!(format(&arena, "{}", &(v,)).unwrap(), "(1.00, -2.50, 0.30)");
        assert_eq!(
            format(&arena, "{:.1}|", &(v,)).unwrap(),
            "(1.0, -2.5, 0.3)|"
        );
    }

    #[test]
    fn record_fixture_formats() {
        let arena = StackArena::<512>::new();
        let text = format(&arena, RECORD_FMT, &record_args(2)).unwrap();
        assert_eq!(
            text,
            "[     2] audio    id=0x13c6ef372 pos=(1.000, -2.000, 0.500) load=  2.0% ok=true"
        );
    }
}
