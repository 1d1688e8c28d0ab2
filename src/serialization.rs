//! Persistence for axes and grids.
//!
//! Everything here writes the serde JSON encoding, which round-trips finite
//! floating-point knots bit-exactly.  Reconstruction goes through
//! `Deserialize`, so knot and cell types are never required to be
//! default-constructible.
//!
//! Grid persistence is gated on the storage capability flag
//! (`CellStorage::PERSISTABLE`): a store that has not opted in is refused
//! up front instead of producing a write that cannot be restored.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::coords::AxisTuple;
use crate::core::axis::Axis;
use crate::core::grid::Grid;
use crate::storage::CellStorage;
use crate::{FailResult, GridError};

impl<T: Serialize> Axis<T> {
    /// Write the axis (name, then the ordered knot sequence) to a stream.
    pub fn save<W: Write>(&self, writer: W) -> FailResult<()> {
        Ok(serde_json::to_writer(writer, self)?)
    }
}

impl<T: DeserializeOwned> Axis<T> {
    /// Reconstruct an axis written by [`save`].
    ///
    /// [`save`]: #method.save
    pub fn load<R: Read>(reader: R) -> FailResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

// The stored form of a set of axis handles: each distinct axis is written
// once, and every handle is an index into that table.
#[derive(Serialize)]
struct SharedAxesRef<'a, T> {
    unique: Vec<&'a Axis<T>>,
    refs: Vec<usize>,
}

#[derive(Deserialize)]
struct SharedAxes<T> {
    unique: Vec<Axis<T>>,
    refs: Vec<usize>,
}

/// Persist a sequence of axis handles, preserving sharing.
///
/// Handles are deduplicated by pointer identity: writing the same `Arc`
/// twice stores the axis once, and [`load_shared_axes`] hands back two
/// clones of one reconstructed `Arc` rather than two independent copies.
///
/// [`load_shared_axes`]: fn.load_shared_axes.html
pub fn save_shared_axes<T, W>(writer: W, axes: &[Arc<Axis<T>>]) -> FailResult<()>
where
    T: Serialize,
    W: Write,
{
    let mut order: HashMap<*const Axis<T>, usize> = HashMap::new();
    let mut unique = Vec::new();
    let mut refs = Vec::with_capacity(axes.len());
    for axis in axes {
        let ptr = &**axis as *const Axis<T>;
        let next = unique.len();
        let id = *order.entry(ptr).or_insert(next);
        if id == unique.len() {
            unique.push(&**axis);
        }
        refs.push(id);
    }
    debug!("persisting {} axis handles ({} unique)", refs.len(), unique.len());
    Ok(serde_json::to_writer(writer, &SharedAxesRef { unique, refs })?)
}

/// Reconstruct axis handles written by [`save_shared_axes`], with sharing
/// intact: handles that pointed to one axis come back pointing to one axis.
///
/// [`save_shared_axes`]: fn.save_shared_axes.html
pub fn load_shared_axes<T, R>(reader: R) -> FailResult<Vec<Arc<Axis<T>>>>
where
    T: DeserializeOwned,
    R: Read,
{
    let SharedAxes { unique, refs } = serde_json::from_reader(reader)?;
    let unique: Vec<Arc<Axis<T>>> = unique.into_iter().map(Arc::new).collect();
    refs.into_iter()
        .map(|id| {
            unique.get(id).cloned().ok_or_else(|| {
                format_err!(
                    "axis reference {} out of range ({} unique axes stored)",
                    id,
                    unique.len(),
                )
            })
        })
        .collect()
}

#[derive(Serialize)]
struct GridRecordRef<'a, A, S> {
    axes: &'a A,
    cells: &'a S,
}

#[derive(Deserialize)]
struct GridRecord<A, S> {
    axes: A,
    cells: S,
}

impl<A, S> Grid<A, S>
where
    A: AxisTuple + Serialize,
    S: CellStorage + Serialize,
{
    /// Write the whole grid (axes and cells) to a stream.
    ///
    /// Fails with `UnsupportedPersistence` when the storage type has not
    /// opted into persistence.
    pub fn save<W: Write>(&self, writer: W) -> FailResult<()> {
        if !S::PERSISTABLE {
            throw!(GridError::UnsupportedPersistence { storage: S::NAME });
        }
        let record = GridRecordRef { axes: self.axes(), cells: self.storage() };
        Ok(serde_json::to_writer(writer, &record)?)
    }
}

impl<A, S> Grid<A, S>
where
    A: AxisTuple + DeserializeOwned,
    S: CellStorage + DeserializeOwned,
{
    /// Reconstruct a grid written by [`save`].
    ///
    /// The storage-size invariant is re-validated, so a record whose cell
    /// count disagrees with its axes fails with `SizeMismatch` rather than
    /// producing a malformed grid.
    ///
    /// [`save`]: #method.save
    pub fn load<R: Read>(reader: R) -> FailResult<Self> {
        if !S::PERSISTABLE {
            throw!(GridError::UnsupportedPersistence { storage: S::NAME });
        }
        let GridRecord { axes, cells } = serde_json::from_reader(reader)?;
        Ok(Grid::from_storage(axes, cells)?)
    }
}
