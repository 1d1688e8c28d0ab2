//! The capability contract a backing store must satisfy to hold grid cells.

/// Contract between [`Grid`] and the concrete type holding its cells.
///
/// The container never touches storage internals; everything goes through
/// this trait, so the indexing logic is independent of whether the backing
/// store is a plain contiguous `Vec`, a pooled structure like
/// [`ChunkedStorage`], or anything else.  A store type whose inherent API
/// already matches can implement this directly; otherwise a small adapter
/// implementing these operations is the only code needed.
///
/// Implementations must hand out cells in the same order as the linear
/// offsets defined by [`GridIndexer`]: `cell(k)` is the `k`-th item of
/// `cell_iter()`.
///
/// [`Grid`]: struct.Grid.html
/// [`ChunkedStorage`]: struct.ChunkedStorage.html
/// [`GridIndexer`]: struct.GridIndexer.html
pub trait CellStorage {
    /// The type of one cell.
    type Cell;

    /// Short name of the storage type, used in diagnostics.
    const NAME: &'static str;

    /// Whether grids backed by this storage may be persisted.
    ///
    /// Off unless a storage type explicitly opts in; persistence operations
    /// refuse to run when this is `false`, rather than producing a write
    /// that cannot be faithfully restored.
    const PERSISTABLE: bool = false;

    /// Factory: produce a store holding exactly `len` default-valued cells.
    fn with_len(len: usize) -> Self
    where
        Self: Sized,
        Self::Cell: Default;

    /// Number of cells held.
    fn num_cells(&self) -> usize;

    /// The cell at a linear offset.  Panics if `offset >= num_cells()`.
    fn cell(&self, offset: usize) -> &Self::Cell;

    fn cell_mut(&mut self, offset: usize) -> &mut Self::Cell;

    /// Forward iteration over all cells in offset order.
    fn cell_iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Self::Cell> + 'a>;

    fn cell_iter_mut<'a>(&'a mut self) -> Box<dyn Iterator<Item = &'a mut Self::Cell> + 'a>;
}

/// `Vec` is the default store: contiguous, and the only one that opts into
/// persistence out of the box.
impl<T> CellStorage for Vec<T> {
    type Cell = T;

    const NAME: &'static str = "Vec";
    const PERSISTABLE: bool = true;

    fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        (0..len).map(|_| T::default()).collect()
    }

    fn num_cells(&self) -> usize {
        self.len()
    }

    fn cell(&self, offset: usize) -> &T {
        &self[offset]
    }

    fn cell_mut(&mut self, offset: usize) -> &mut T {
        &mut self[offset]
    }

    fn cell_iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        Box::new(self.iter())
    }

    fn cell_iter_mut<'a>(&'a mut self) -> Box<dyn Iterator<Item = &'a mut T> + 'a> {
        Box::new(self.iter_mut())
    }
}

const CHUNK_LEN: usize = 256;

/// A pooled store that keeps cells in fixed-size chunks instead of one flat
/// allocation.
///
/// Useful for very large grids where a single contiguous allocation is
/// unwelcome, and in tests as a store with no flat memory layout.  It does
/// not opt into persistence (`PERSISTABLE` stays `false`), which makes it
/// the canonical way to exercise the `UnsupportedPersistence` failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkedStorage<T> {
    chunks: Vec<Vec<T>>,
    len: usize,
}

impl<T> ChunkedStorage<T> {
    pub fn from_fill(len: usize, fill: T) -> Self
    where
        T: Clone,
    {
        Self::from_fn(len, |_| fill.clone())
    }

    fn from_fn<F: FnMut(usize) -> T>(len: usize, mut f: F) -> Self {
        let mut chunks = Vec::with_capacity((len + CHUNK_LEN - 1) / CHUNK_LEN);
        let mut start = 0;
        while start < len {
            let stop = (start + CHUNK_LEN).min(len);
            chunks.push((start..stop).map(&mut f).collect());
            start = stop;
        }
        ChunkedStorage { chunks, len }
    }
}

impl<T> CellStorage for ChunkedStorage<T> {
    type Cell = T;

    const NAME: &'static str = "ChunkedStorage";

    fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::from_fn(len, |_| T::default())
    }

    fn num_cells(&self) -> usize {
        self.len
    }

    fn cell(&self, offset: usize) -> &T {
        assert!(offset < self.len, "cell offset out of range");
        &self.chunks[offset / CHUNK_LEN][offset % CHUNK_LEN]
    }

    fn cell_mut(&mut self, offset: usize) -> &mut T {
        assert!(offset < self.len, "cell offset out of range");
        &mut self.chunks[offset / CHUNK_LEN][offset % CHUNK_LEN]
    }

    fn cell_iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        Box::new(self.chunks.iter().flat_map(|chunk| chunk.iter()))
    }

    fn cell_iter_mut<'a>(&'a mut self) -> Box<dyn Iterator<Item = &'a mut T> + 'a> {
        Box::new(self.chunks.iter_mut().flat_map(|chunk| chunk.iter_mut()))
    }
}
