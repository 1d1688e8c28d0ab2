use std::iter::Enumerate;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::coords::{coords_at, AxisTuple, CoordTuple};
use crate::core::index::GridIndexer;
use crate::storage::CellStorage;
use crate::GridError;

/// A fixed set of named axes plus one cell per point of their cartesian
/// product.
///
/// `A` is a tuple of [`Axis`] values (up to 8; knot types may differ per
/// axis) and `S` is the backing store, any type satisfying [`CellStorage`].
/// The store always holds exactly `product(axis sizes)` cells; grids are
/// never resized after construction.
///
/// Coordinate-addressed access validates by default ([`get`]/[`get_mut`]);
/// a fast unchecked path ([`get_unchecked`]) is exposed for hot loops where
/// the caller has already validated ranges.
///
/// A grid exclusively owns its axes and its storage.  Concurrent read-only
/// use from multiple threads is safe (axes and index factors are immutable
/// after construction); any mutation must be synchronized externally.
///
/// [`Axis`]: struct.Axis.html
/// [`CellStorage`]: trait.CellStorage.html
/// [`get`]: #method.get
/// [`get_mut`]: #method.get_mut
/// [`get_unchecked`]: #method.get_unchecked
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<A: AxisTuple, S: CellStorage> {
    axes: A,
    indexer: GridIndexer,
    cells: S,
}

fn validated_indexer<A: AxisTuple>(axes: &A) -> Result<GridIndexer, GridError> {
    let sizes = axes.sizes();
    if let Some(axis) = sizes.iter().position(|&size| size == 0) {
        throw!(GridError::InvalidAxisDefinition {
            axis: axes.names()[axis].to_string(),
            reason: "empty knot sequence",
        });
    }
    Ok(GridIndexer::from_sizes(sizes))
}

impl<A: AxisTuple, S: CellStorage> Grid<A, S> {
    /// Create a grid with every cell set to the default value, using the
    /// storage factory.
    pub fn new(axes: A) -> Result<Self, GridError>
    where
        S::Cell: Default,
    {
        let indexer = validated_indexer(&axes)?;
        let cells = S::with_len(indexer.len());
        debug!(
            "allocated {} grid of {} cells, axes {:?}",
            S::NAME,
            indexer.len(),
            axes.names(),
        );
        Ok(Grid { axes, indexer, cells })
    }

    /// Create a grid around a pre-populated store.
    ///
    /// Fails with `SizeMismatch` unless the store holds exactly
    /// `product(axis sizes)` cells.
    pub fn from_storage(axes: A, cells: S) -> Result<Self, GridError> {
        let indexer = validated_indexer(&axes)?;
        if cells.num_cells() != indexer.len() {
            throw!(GridError::SizeMismatch {
                expected: indexer.len(),
                actual: cells.num_cells(),
            });
        }
        Ok(Grid { axes, indexer, cells })
    }

    /// The axis tuple.  Individual axes are reached by tuple position,
    /// e.g. `grid.axes().0.name()`.
    pub fn axes(&self) -> &A {
        &self.axes
    }

    /// The coordinate/offset converter for this grid's axis sizes.
    pub fn indexer(&self) -> &GridIndexer {
        &self.indexer
    }

    /// Direct access to the backing store.
    pub fn storage(&self) -> &S {
        &self.cells
    }

    pub fn rank(&self) -> usize {
        A::RANK
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.indexer.len()
    }

    /// The cell at a coordinate tuple, validating every coordinate.
    pub fn get(&self, coords: A::Coords) -> Result<&S::Cell, GridError> {
        let offset = self.indexer.flat_index_checked(coords.to_array().as_ref())?;
        Ok(self.cells.cell(offset))
    }

    pub fn get_mut(&mut self, coords: A::Coords) -> Result<&mut S::Cell, GridError> {
        let offset = self.indexer.flat_index_checked(coords.to_array().as_ref())?;
        Ok(self.cells.cell_mut(offset))
    }

    /// The cell at a coordinate tuple, without validating coordinates.
    ///
    /// This exists purely for hot loops.  An out-of-range coordinate does
    /// not read out of bounds, but it may silently address the *wrong*
    /// cell; the caller guarantees each coordinate is below its axis size.
    pub fn get_unchecked(&self, coords: A::Coords) -> &S::Cell {
        self.cells.cell(self.indexer.flat_index(coords.to_array().as_ref()))
    }

    pub fn get_unchecked_mut(&mut self, coords: A::Coords) -> &mut S::Cell {
        let offset = self.indexer.flat_index(coords.to_array().as_ref());
        self.cells.cell_mut(offset)
    }

    /// The cell at a linear offset.  Panics if `offset >= len()`.
    pub fn at_offset(&self, offset: usize) -> &S::Cell {
        self.cells.cell(offset)
    }

    pub fn at_offset_mut(&mut self, offset: usize) -> &mut S::Cell {
        self.cells.cell_mut(offset)
    }

    /// Reconstruct the coordinate tuple addressed by a linear offset.
    pub fn coords_at(&self, offset: usize) -> A::Coords {
        coords_at(&self.indexer, offset)
    }

    /// Iterate over `(coords, &cell)` in linear offset order
    /// (axis 0 varies fastest).
    pub fn iter(&self) -> Cells<'_, A::Coords, S::Cell> {
        Cells {
            indexer: &self.indexer,
            inner: self.cells.cell_iter().enumerate(),
            _coords: PhantomData,
        }
    }

    /// Iterate over `(coords, &mut cell)` in linear offset order.
    pub fn iter_mut(&mut self) -> CellsMut<'_, A::Coords, S::Cell> {
        CellsMut {
            indexer: &self.indexer,
            inner: self.cells.cell_iter_mut().enumerate(),
            _coords: PhantomData,
        }
    }

    /// Iterate over the cells whose coordinate along `axis` equals `coord`,
    /// i.e. the sub-grid with one axis pinned.
    ///
    /// Fails with `OutOfBounds` if `coord` exceeds the axis size.  Panics if
    /// `axis >= rank()` (a programming error, as with `flat_index`).
    pub fn iter_fixed(
        &self,
        axis: usize,
        coord: usize,
    ) -> Result<FixedAxisCells<'_, A::Coords, S::Cell>, GridError> {
        let size = self.indexer.axis_size(axis);
        if coord >= size {
            throw!(GridError::OutOfBounds { axis, coord, size });
        }
        Ok(FixedAxisCells { axis, coord, inner: self.iter() })
    }
}

impl<A: AxisTuple, T> Grid<A, Vec<T>> {
    /// Create a `Vec`-backed grid with every cell set to `fill`.
    pub fn from_fill(axes: A, fill: T) -> Result<Self, GridError>
    where
        T: Clone,
    {
        let indexer = validated_indexer(&axes)?;
        let cells = vec![fill; indexer.len()];
        Ok(Grid { axes, indexer, cells })
    }

    /// Create a `Vec`-backed grid from pre-populated cell data in linear
    /// offset order.
    pub fn from_cells(axes: A, cells: Vec<T>) -> Result<Self, GridError> {
        Grid::from_storage(axes, cells)
    }
}

/// Checked indexing sugar: `grid[(i, j)]`.  Panics on out-of-range
/// coordinates; use [`Grid::get`] to handle the failure instead.
///
/// [`Grid::get`]: struct.Grid.html#method.get
impl<A: AxisTuple, S: CellStorage> Index<A::Coords> for Grid<A, S> {
    type Output = S::Cell;

    fn index(&self, coords: A::Coords) -> &S::Cell {
        match self.get(coords) {
            Ok(cell) => cell,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<A: AxisTuple, S: CellStorage> IndexMut<A::Coords> for Grid<A, S> {
    fn index_mut(&mut self, coords: A::Coords) -> &mut S::Cell {
        match self.get_mut(coords) {
            Ok(cell) => cell,
            Err(e) => panic!("{}", e),
        }
    }
}

/// Iterator over `(coords, &cell)`; see [`Grid::iter`].
///
/// [`Grid::iter`]: struct.Grid.html#method.iter
pub struct Cells<'a, C: CoordTuple, T> {
    indexer: &'a GridIndexer,
    inner: Enumerate<Box<dyn Iterator<Item = &'a T> + 'a>>,
    _coords: PhantomData<C>,
}

impl<'a, C: CoordTuple, T> Iterator for Cells<'a, C, T> {
    type Item = (C, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, cell) = self.inner.next()?;
        Some((coords_at(self.indexer, offset), cell))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over `(coords, &mut cell)`; see [`Grid::iter_mut`].
///
/// [`Grid::iter_mut`]: struct.Grid.html#method.iter_mut
pub struct CellsMut<'a, C: CoordTuple, T> {
    indexer: &'a GridIndexer,
    inner: Enumerate<Box<dyn Iterator<Item = &'a mut T> + 'a>>,
    _coords: PhantomData<C>,
}

impl<'a, C: CoordTuple, T> Iterator for CellsMut<'a, C, T> {
    type Item = (C, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, cell) = self.inner.next()?;
        Some((coords_at(self.indexer, offset), cell))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over the cells of a sub-grid with one axis pinned;
/// see [`Grid::iter_fixed`].
///
/// [`Grid::iter_fixed`]: struct.Grid.html#method.iter_fixed
pub struct FixedAxisCells<'a, C: CoordTuple, T> {
    axis: usize,
    coord: usize,
    inner: Cells<'a, C, T>,
}

impl<'a, C: CoordTuple, T> Iterator for FixedAxisCells<'a, C, T> {
    type Item = (C, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (coords, cell) = self.inner.next()?;
            if coords.to_array().as_ref()[self.axis] == self.coord {
                return Some((coords, cell));
            }
        }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::core::axis::Axis;
    use crate::storage::ChunkedStorage;
    use crate::GridError;

    fn z_ebv_axes() -> (Axis<f64>, Axis<f64>) {
        (
            Axis::new("Z", vec![0.0, 0.5, 1.0]),
            Axis::new("E(B-V)", vec![0.0, 0.1]),
        )
    }

    #[test]
    fn storage_size_invariant() {
        let grid: Grid<_, Vec<f64>> = Grid::new(z_ebv_axes()).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.storage().num_cells(), 6);
        assert_eq!(grid.rank(), 2);
    }

    #[test]
    fn from_cells_checks_length() {
        match Grid::from_cells(z_ebv_axes(), vec![0.0; 5]) {
            Err(GridError::SizeMismatch { expected: 6, actual: 5 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(Grid::from_cells(z_ebv_axes(), vec![0.0; 6]).is_ok());
    }

    #[test]
    fn empty_axis_is_rejected() {
        let axes = (Axis::new("Z", vec![0.0]), Axis::<f64>::new("E(B-V)", vec![]));
        match Grid::<_, Vec<f64>>::new(axes) {
            Err(GridError::InvalidAxisDefinition { ref axis, .. }) if axis == "E(B-V)" => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn coordinate_access() {
        let mut grid: Grid<_, Vec<f64>> = Grid::new(z_ebv_axes()).unwrap();
        *grid.get_mut((2, 1)).unwrap() = 8.25;
        assert_eq!(*grid.get((2, 1)).unwrap(), 8.25);
        assert_eq!(*grid.at_offset(5), 8.25); // offset 5 = 2*1 + 1*3
        assert_eq!(*grid.get_unchecked((2, 1)), 8.25);
        assert_eq!(grid[(2, 1)], 8.25);

        grid[(0, 1)] = -1.0;
        assert_eq!(*grid.at_offset(3), -1.0);

        match grid.get((3, 0)) {
            Err(GridError::OutOfBounds { axis: 0, coord: 3, size: 3 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_panics_out_of_range() {
        let grid: Grid<_, Vec<f64>> = Grid::new(z_ebv_axes()).unwrap();
        let _ = grid[(0, 2)];
    }

    #[test]
    fn iteration_order_and_coords() {
        let mut grid: Grid<_, Vec<usize>> = Grid::new(z_ebv_axes()).unwrap();
        for (offset, (_, cell)) in grid.iter_mut().enumerate() {
            *cell = offset;
        }

        let expected = [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)];
        let visited: Vec<((usize, usize), usize)> =
            grid.iter().map(|(coords, &cell)| (coords, cell)).collect();
        for (offset, &(coords, cell)) in visited.iter().enumerate() {
            assert_eq!(cell, offset);
            assert_eq!(coords, expected[offset]);
            assert_eq!(grid.coords_at(offset), coords);
        }
        assert_eq!(visited.len(), grid.len());
    }

    #[test]
    fn fixed_axis_iteration() {
        let mut grid: Grid<_, Vec<usize>> = Grid::new(z_ebv_axes()).unwrap();
        for (offset, (_, cell)) in grid.iter_mut().enumerate() {
            *cell = offset;
        }

        let pinned: Vec<((usize, usize), usize)> = grid
            .iter_fixed(1, 1)
            .unwrap()
            .map(|(coords, &cell)| (coords, cell))
            .collect();
        assert_eq!(pinned, vec![((0, 1), 3), ((1, 1), 4), ((2, 1), 5)]);

        match grid.iter_fixed(1, 2) {
            Err(GridError::OutOfBounds { axis: 1, coord: 2, size: 2 }) => {}
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        };
    }

    #[test]
    fn heterogeneous_axes() {
        let axes = (
            Axis::new("Z", vec![0.0, 1.0]),
            Axis::new("SED", vec!["elliptical".to_string(), "spiral".to_string()]),
            Axis::new("band", vec![1u32, 2, 3]),
        );
        let mut grid: Grid<_, Vec<f64>> = Grid::new(axes).unwrap();
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.axes().1.name(), "SED");

        *grid.get_mut((1, 0, 2)).unwrap() = 4.5;
        assert_eq!(grid[(1, 0, 2)], 4.5);
    }

    #[test]
    fn chunked_backing_store() {
        let mut grid: Grid<_, ChunkedStorage<f64>> = Grid::new(z_ebv_axes()).unwrap();
        assert_eq!(grid.storage().num_cells(), 6);
        *grid.get_mut((1, 1)).unwrap() = 3.5;
        assert_eq!(grid[(1, 1)], 3.5);
        assert_eq!(grid.iter().filter(|&(_, &cell)| cell == 3.5).count(), 1);
    }

    #[test]
    fn from_fill() {
        let grid = Grid::from_fill(z_ebv_axes(), 7.0).unwrap();
        assert!(grid.iter().all(|(_, &cell)| cell == 7.0));
    }
}
