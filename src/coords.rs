//! Compile-time generation of the per-arity coordinate logic.
//!
//! A grid's axes are carried as a tuple so that each dimension can keep its
//! own knot type.  The impls below are generated once per arity by
//! `impl_axis_tuple!`, which plays the role the per-dimension recursion
//! plays in hand-rolled variadic code: the coordinate combine/extract steps
//! exist for every supported axis count without being written out by hand.

use crate::core::axis::Axis;
use crate::core::index::GridIndexer;

/// A tuple of `usize` coordinates, one per axis, axis 0 (fastest-varying)
/// first.
///
/// Implemented for `(usize,)` through 8-tuples.  Carries no state beyond the
/// coordinates themselves; the conversions to and from a fixed-length array
/// are what let [`GridIndexer`] walk coordinates with a bounded loop.
///
/// [`GridIndexer`]: struct.GridIndexer.html
pub trait CoordTuple: Copy {
    const RANK: usize;

    /// `[usize; N]` with `N == RANK`.
    type Array: AsRef<[usize]> + AsMut<[usize]> + Copy;

    fn to_array(self) -> Self::Array;
    fn from_array(array: Self::Array) -> Self;
    fn zeroed_array() -> Self::Array;
}

/// A tuple of [`Axis`] values forming the dimensions of a grid.
///
/// Implemented for `(Axis<T0>,)` through 8-tuples; the element types of the
/// axes are independent of one another.
///
/// [`Axis`]: struct.Axis.html
pub trait AxisTuple {
    const RANK: usize;

    /// The coordinate tuple with one `usize` per axis.
    type Coords: CoordTuple;

    /// Axis sizes in axis order.
    fn sizes(&self) -> Vec<usize>;

    /// Axis labels in axis order.
    fn names(&self) -> Vec<&str>;
}

/// Reconstruct a coordinate tuple from a linear offset.
pub(crate) fn coords_at<C: CoordTuple>(indexer: &GridIndexer, offset: usize) -> C {
    let mut array = C::zeroed_array();
    for (axis, slot) in array.as_mut().iter_mut().enumerate() {
        *slot = indexer.axis_index(axis, offset);
    }
    C::from_array(array)
}

macro_rules! usize_of {
    ($T:ident) => { usize };
}

macro_rules! impl_axis_tuple {
    ($n:tt => $(($T:ident, $i:tt)),+) => {
        impl<$($T),+> AxisTuple for ($(Axis<$T>,)+) {
            const RANK: usize = $n;
            type Coords = ($(usize_of!($T),)+);

            fn sizes(&self) -> Vec<usize> {
                vec![$(self.$i.size()),+]
            }

            fn names(&self) -> Vec<&str> {
                vec![$(self.$i.name()),+]
            }
        }

        impl CoordTuple for ($(usize_of!($T),)+) {
            const RANK: usize = $n;
            type Array = [usize; $n];

            fn to_array(self) -> [usize; $n] {
                [$(self.$i),+]
            }

            fn from_array(array: [usize; $n]) -> Self {
                ($(array[$i],)+)
            }

            fn zeroed_array() -> [usize; $n] {
                [0; $n]
            }
        }
    };
}

impl_axis_tuple!{1 => (A0, 0)}
impl_axis_tuple!{2 => (A0, 0), (A1, 1)}
impl_axis_tuple!{3 => (A0, 0), (A1, 1), (A2, 2)}
impl_axis_tuple!{4 => (A0, 0), (A1, 1), (A2, 2), (A3, 3)}
impl_axis_tuple!{5 => (A0, 0), (A1, 1), (A2, 2), (A3, 3), (A4, 4)}
impl_axis_tuple!{6 => (A0, 0), (A1, 1), (A2, 2), (A3, 3), (A4, 4), (A5, 5)}
impl_axis_tuple!{7 => (A0, 0), (A1, 1), (A2, 2), (A3, 3), (A4, 4), (A5, 5), (A6, 6)}
impl_axis_tuple!{8 => (A0, 0), (A1, 1), (A2, 2), (A3, 3), (A4, 4), (A5, 5), (A6, 6), (A7, 7)}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn array_round_trip() {
        let coords = (3usize, 1usize, 4usize);
        assert_eq!(coords.to_array(), [3, 1, 4]);
        assert_eq!(<(usize, usize, usize)>::from_array([3, 1, 4]), coords);

        let single = (7usize,);
        assert_eq!(single.to_array(), [7]);
        assert_eq!(<(usize,)>::from_array([7]), single);
    }

    #[test]
    fn heterogeneous_axis_tuple() {
        let axes = (
            Axis::new("Z", vec![0.0, 0.5, 1.0]),
            Axis::new("SED", vec!["elliptical".to_string(), "spiral".to_string()]),
        );
        assert_eq!(<(Axis<f64>, Axis<String>)>::RANK, 2);
        assert_eq!(axes.sizes(), vec![3, 2]);
        assert_eq!(axes.names(), vec!["Z", "SED"]);
    }

    #[test]
    fn coords_at_inverts_flat_index() {
        let indexer = GridIndexer::from_sizes(vec![3, 2]);
        let coords: (usize, usize) = coords_at(&indexer, 5);
        assert_eq!(coords, (2, 1));
        assert_eq!(indexer.flat_index(&coords.to_array()), 5);
    }
}
