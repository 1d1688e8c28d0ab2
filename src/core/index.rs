use crate::GridError;

/// Converts between multi-dimensional grid coordinates and the index of a
/// flat cell array, and back.
///
/// The mapping assumes the first axis varies the fastest and the last axis
/// the slowest; all coordinates and offsets are zero based.  This type exists
/// mainly to drive the iterators of [`Grid`], but it is part of the public
/// interface and is the recommended way to perform such conversions outside
/// the container as well.
///
/// Both the sizes and the cumulative index factors are fixed at construction.
///
/// [`Grid`]: struct.Grid.html
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridIndexer {
    sizes: Vec<usize>,
    factors: Vec<usize>,
}

impl GridIndexer {
    /// Build an indexer from the ordered sizes of the axes
    /// (axis 0 first, i.e. fastest-varying).
    pub fn from_sizes(sizes: Vec<usize>) -> Self {
        let mut factors = Vec::with_capacity(sizes.len());
        let mut product = 1;
        for &size in &sizes {
            factors.push(product);
            product *= size;
        }
        trace!("grid indexer: sizes {:?} -> factors {:?}", sizes, factors);
        GridIndexer { sizes, factors }
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Per-axis multipliers; `factors()[0] == 1`, and each later factor is
    /// the product of all earlier axis sizes.
    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    pub fn axis_size(&self, axis: usize) -> usize {
        self.sizes[axis]
    }

    /// Total number of cells, i.e. the product of the axis sizes.
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    /// The coordinate along `axis` implied by a linear offset.
    ///
    /// No bounds validation is performed on `offset`; the caller guarantees
    /// it is below `len()`.
    pub fn axis_index(&self, axis: usize, offset: usize) -> usize {
        (offset / self.factors[axis]) % self.sizes[axis]
    }

    /// Combine one coordinate per axis (axis 0 first) into a linear offset.
    ///
    /// **This is the unchecked hot path.**  Coordinate values are not
    /// validated; an out-of-range coordinate produces an offset that may
    /// silently alias a different cell (it cannot read out of bounds, but
    /// the answer is meaningless).  Callers must pre-validate, or use
    /// [`flat_index_checked`] instead.
    ///
    /// Panics if the number of coordinates differs from `rank()`; that is a
    /// programming error, not an input error.
    ///
    /// [`flat_index_checked`]: #method.flat_index_checked
    pub fn flat_index(&self, coords: &[usize]) -> usize {
        assert_eq!(coords.len(), self.rank(), "one coordinate per axis");
        izip!(coords, &self.factors).map(|(&c, &f)| c * f).sum()
    }

    /// Like [`flat_index`], but validates every coordinate against its axis
    /// size before combining.  This is the only conversion entry point that
    /// performs bounds checks.
    ///
    /// [`flat_index`]: #method.flat_index
    pub fn flat_index_checked(&self, coords: &[usize]) -> Result<usize, GridError> {
        assert_eq!(coords.len(), self.rank(), "one coordinate per axis");
        for (axis, (&coord, &size)) in izip!(coords, &self.sizes).enumerate() {
            if coord >= size {
                throw!(GridError::OutOfBounds { axis, coord, size });
            }
        }
        Ok(self.flat_index(coords))
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::GridError;

    #[test]
    fn factor_invariant() {
        let indexer = GridIndexer::from_sizes(vec![3, 2, 5]);
        assert_eq!(indexer.factors(), &[1, 3, 6]);
        assert_eq!(indexer.len(), 30);

        let sizes = vec![4, 1, 7, 2];
        let indexer = GridIndexer::from_sizes(sizes.clone());
        assert_eq!(indexer.factors()[0], 1);
        for i in 1..sizes.len() {
            assert_eq!(indexer.factors()[i], indexer.factors()[i - 1] * sizes[i - 1]);
        }
    }

    // worked example: sizes (3, 2), coordinate (2, 1) -> offset 5
    #[test]
    fn two_by_three() {
        let indexer = GridIndexer::from_sizes(vec![3, 2]);
        assert_eq!(indexer.len(), 6);
        assert_eq!(indexer.factors(), &[1, 3]);
        assert_eq!(indexer.flat_index(&[2, 1]), 5);
        assert_eq!(indexer.axis_index(0, 5), 2);
        assert_eq!(indexer.axis_index(1, 5), 1);
    }

    #[test]
    fn bijection() {
        let indexer = GridIndexer::from_sizes(vec![4, 3, 2]);
        let mut seen = vec![false; indexer.len()];
        for c2 in 0..2 {
            for c1 in 0..3 {
                for c0 in 0..4 {
                    let offset = indexer.flat_index(&[c0, c1, c2]);
                    assert!(offset < indexer.len());
                    assert!(!seen[offset], "offset {} hit twice", offset);
                    seen[offset] = true;

                    assert_eq!(indexer.axis_index(0, offset), c0);
                    assert_eq!(indexer.axis_index(1, offset), c1);
                    assert_eq!(indexer.axis_index(2, offset), c2);
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn random_bijection() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let rank = rng.gen_range(1, 5);
            let sizes: Vec<usize> = (0..rank).map(|_| rng.gen_range(1, 6)).collect();
            let indexer = GridIndexer::from_sizes(sizes.clone());

            for _ in 0..50 {
                let coords: Vec<usize> =
                    sizes.iter().map(|&s| rng.gen_range(0, s)).collect();
                let offset = indexer.flat_index(&coords);
                assert!(offset < indexer.len());
                for (axis, &coord) in coords.iter().enumerate() {
                    assert_eq!(indexer.axis_index(axis, offset), coord);
                }
            }
        }
    }

    #[test]
    fn checked_conversion() {
        let indexer = GridIndexer::from_sizes(vec![3, 2]);

        // never fails in range
        for c1 in 0..2 {
            for c0 in 0..3 {
                let offset = indexer.flat_index_checked(&[c0, c1]).unwrap();
                assert_eq!(offset, indexer.flat_index(&[c0, c1]));
            }
        }

        // fails iff some coordinate is out of range, and names the axis
        match indexer.flat_index_checked(&[3, 0]) {
            Err(GridError::OutOfBounds { axis: 0, coord: 3, size: 3 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        match indexer.flat_index_checked(&[0, 2]) {
            Err(GridError::OutOfBounds { axis: 1, coord: 2, size: 2 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
