//! Argument packs.
//!
//! A format call takes its arguments as one value implementing [`Args`]:
//! a tuple of up to twelve [`Format`] values, or an array or slice of a
//! single `Format` type. The engine addresses arguments by index, so each
//! tuple impl is a `match` from index to field.

use kiln_arena::{ArenaString, Bump};

use crate::error::FormatError;
use crate::render::Format;
use crate::spec::FormatSpec;

/// An indexed collection of format arguments.
pub trait Args {
    /// Number of arguments.
    fn len(&self) -> usize;

    /// Whether there are no arguments.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render argument `index` into `out`.
    fn render<A: Bump>(
        &self,
        index: usize,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError>;

    /// Argument `index` as a width or precision. `None` when it is not an
    /// integer or does not exist.
    fn count(&self, index: usize) -> Option<i128>;

    /// The name attached to argument `index`, if any.
    fn name(&self, index: usize) -> Option<&str>;

    /// Index of the first argument named `name`.
    fn position(&self, name: &str) -> Option<usize> {
        (0..self.len()).find(|&index| self.name(index) == Some(name))
    }
}

fn out_of_range(index: usize, count: usize) -> FormatError {
    FormatError::ArgumentOutOfRange { index, count }
}

macro_rules! tuple_args {
    ($len:literal $(; $($idx:tt $T:ident),+)?) => {
        impl$(<$($T: Format),+>)? Args for ($($($T,)+)?) {
            fn len(&self) -> usize {
                $len
            }

            #[allow(unused_variables)]
            fn render<A: Bump>(
                &self,
                index: usize,
                spec: &FormatSpec,
                out: &mut ArenaString<'_, A>,
            ) -> Result<usize, FormatError> {
                match index {
                    $($($idx => self.$idx.format(spec, out),)+)?
                    _ => Err(out_of_range(index, $len)),
                }
            }

            fn count(&self, index: usize) -> Option<i128> {
                match index {
                    $($($idx => self.$idx.as_count(),)+)?
                    _ => None,
                }
            }

            fn name(&self, index: usize) -> Option<&str> {
                match index {
                    $($($idx => self.$idx.arg_name(),)+)?
                    _ => None,
                }
            }
        }
    };
}

tuple_args!(0);
tuple_args!(1; 0 T0);
tuple_args!(2; 0 T0, 1 T1);
tuple_args!(3; 0 T0, 1 T1, 2 T2);
tuple_args!(4; 0 T0, 1 T1, 2 T2, 3 T3);
tuple_args!(5; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4);
tuple_args!(6; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5);
tuple_args!(7; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6);
tuple_args!(8; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7);
tuple_args!(9; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8);
tuple_args!(10; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9);
tuple_args!(11; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9, 10 T10);
tuple_args!(12; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7, 8 T8, 9 T9, 10 T10, 11 T11);

impl<T: Format> Args for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn render<A: Bump>(
        &self,
        index: usize,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        self.get(index)
            .ok_or(out_of_range(index, <[T]>::len(self)))?
            .format(spec, out)
    }

    fn count(&self, index: usize) -> Option<i128> {
        self.get(index)?.as_count()
    }

    fn name(&self, index: usize) -> Option<&str> {
        self.get(index)?.arg_name()
    }
}

impl<T: Format, const N: usize> Args for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn render<A: Bump>(
        &self,
        index: usize,
        spec: &FormatSpec,
        out: &mut ArenaString<'_, A>,
    ) -> Result<usize, FormatError> {
        self.as_slice().render(index, spec, out)
    }

    fn count(&self, index: usize) -> Option<i128> {
        self.as_slice().count(index)
    }

    fn name(&self, index: usize) -> Option<&str> {
        self.as_slice().name(index)
    }
}

#[cfg(test)]
mod tests {
    use kiln_arena::StackArena;

    use super::*;
    use crate::render::named;

    #[test]
    fn empty_tuple() {
        let arena = StackArena::<16>::new();
        let mut out = ArenaString::new(&arena);
        assert!(().is_empty());
        assert_eq!(
            ().render(0, &FormatSpec::default(), &mut out),
            Err(FormatError::ArgumentOutOfRange { index: 0, count: 0 })
        );
    }

    #[test]
    fn tuple_dispatches_by_index() {
        let arena = StackArena::<64>::new();
        let mut out = ArenaString::new(&arena);
        let args = (1u8, "two", 3.5f64);
        assert_eq!(args.len(), 3);
        for index in [2, 0, 1] {
            args.render(index, &FormatSpec::default(), &mut out).unwrap();
        }
        assert_eq!(out.as_str(), "3.51two");
    }

    #[test]
    fn counts_and_names() {
        let args = (named("width", 8usize), "x", -2i32);
        assert_eq!(args.count(0), Some(8));
        assert_eq!(args.count(1), None);
        assert_eq!(args.count(2), Some(-2));
        assert_eq!(args.count(9), None);
        assert_eq!(args.position("width"), Some(0));
        assert_eq!(args.position("x"), None);
    }

    #[test]
    fn twelve_arguments() {
        let args = (0u8, 1u8, 2u8, 3u8, 4u8, 5u8, 6u8, 7u8, 8u8, 9u8, 10u8, 11u8);
        assert_eq!(args.len(), 12);
        assert_eq!(args.count(11), Some(11));
    }

    #[test]
    fn arrays_and_slices() {
        let arena = StackArena::<64>::new();
        let mut out = ArenaString::new(&arena);
        let values = [10u32, 20, 30];
        values.render(1, &FormatSpec::default(), &mut out).unwrap();
        assert_eq!(out.as_str(), "20");
        let slice: &[u32] = &values;
        assert_eq!(Args::len(slice), 3);
        assert_eq!(
            slice.render(3, &FormatSpec::default(), &mut out),
            Err(FormatError::ArgumentOutOfRange { index: 3, count: 3 })
        );
    }
}
