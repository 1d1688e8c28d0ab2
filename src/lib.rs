//! Generic, dimension-parameterized grid container for data indexed by
//! several independent, named axes (e.g. physical-parameter grids for
//! model templates).
//!
//! The container is built from three largely independent pieces:
//!
//! * [`Axis`], the per-dimension metadata (an ordered, named knot sequence);
//! * [`GridIndexer`], which converts between per-axis coordinates and the
//!   linear offset into a flat backing store (axis 0 varies fastest);
//! * the [`CellStorage`] trait, which decouples the container from the
//!   concrete type used to hold the cells.
//!
//! [`Grid`] composes the three.  Axes of a single grid may have different
//! knot types; the axis count is fixed at the type level by using a tuple
//! of `Axis` values (arities 1 through 8 are supported).
//!
//! [`Axis`]: struct.Axis.html
//! [`GridIndexer`]: struct.GridIndexer.html
//! [`CellStorage`]: trait.CellStorage.html
//! [`Grid`]: struct.Grid.html

#[macro_use] extern crate failure;
#[macro_use] extern crate itertools;
#[macro_use] extern crate log;
#[macro_use] extern crate serde;
extern crate serde_json;

#[cfg(test)] extern crate rand;

// FIXME copied from failure 1.0 prerelease; remove once actually released
macro_rules! throw {
    ($e:expr) => {
        return Err(::std::convert::Into::into($e));
    }
}

/// Alias used for results with *any* error type, in operations whose failures
/// may come from the serialization machinery as well as from this crate.
pub type FailResult<T> = Result<T, failure::Error>;

/// Failures surfaced by grid operations.
///
/// All of these are synchronous, local failures reported directly to the
/// caller of the triggering operation; they indicate violated preconditions
/// rather than transient faults, so there is nothing to retry.
#[derive(Debug, Fail)]
pub enum GridError {
    /// A coordinate supplied to a checked conversion exceeds its axis size.
    ///
    /// Never produced by the unchecked paths, which require the caller to
    /// pre-validate.
    #[fail(display = "coordinate {} is out of bounds for axis {} (size {})", coord, axis, size)]
    OutOfBounds {
        axis: usize,
        coord: usize,
        size: usize,
    },

    /// Pre-supplied cell data does not match the product of the axis sizes.
    #[fail(display = "got {} cells where the axes require exactly {}", actual, expected)]
    SizeMismatch {
        expected: usize,
        actual: usize,
    },

    /// Persistence was attempted on a storage type whose capability flag
    /// (`CellStorage::PERSISTABLE`) denies it.
    #[fail(display = "storage type `{}` does not support persistence", storage)]
    UnsupportedPersistence {
        storage: &'static str,
    },

    /// An axis violates a precondition imposed by the consuming context.
    /// (the grid itself requires every axis to have at least one knot)
    #[fail(display = "invalid definition for axis {:?}: {}", axis, reason)]
    InvalidAxisDefinition {
        axis: String,
        reason: &'static str,
    },
}

mod core;
mod coords;
mod serialization;
mod storage;

pub use crate::core::axis::Axis;
pub use crate::core::grid::{Cells, CellsMut, FixedAxisCells, Grid};
pub use crate::core::index::GridIndexer;
pub use crate::coords::{AxisTuple, CoordTuple};
pub use crate::serialization::{load_shared_axes, save_shared_axes};
pub use crate::storage::{CellStorage, ChunkedStorage};
