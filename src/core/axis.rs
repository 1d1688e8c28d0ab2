use std::ops::Index;
use std::slice;

/// One dimension of a grid: a named, ordered sequence of knot values.
///
/// Knot order is semantic.  The position of a knot in the sequence *is* its
/// coordinate along the axis, so the sequence is never reordered after
/// construction.  The core imposes no ordering constraint on the values
/// themselves; callers that need strictly increasing knots (e.g. physical
/// parameter grids) enforce that externally.
///
/// An axis is immutable once built.  It is usually owned by the [`Grid`]
/// holding it, but is also a perfectly good standalone value (for example
/// during persistence round trips).
///
/// [`Grid`]: struct.Grid.html
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis<T> {
    name: String,
    knots: Vec<T>,
}

impl<T> Axis<T> {
    /// Create an axis from its label and ordered knot sequence.
    pub fn new<S: Into<String>>(name: S, knots: Vec<T>) -> Self {
        Axis { name: name.into(), knots }
    }

    /// The axis label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of knots.  Valid coordinates along this axis are `0..size()`.
    pub fn size(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// The knot at the given coordinate, or `None` past the end.
    pub fn knot(&self, coord: usize) -> Option<&T> {
        self.knots.get(coord)
    }

    pub fn knots(&self) -> &[T] {
        &self.knots
    }

    /// Iterate over the knots in coordinate order.
    ///
    /// The iteration is stable; restarting it yields the same order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.knots.iter()
    }
}

impl<T> Index<usize> for Axis<T> {
    type Output = T;

    fn index(&self, coord: usize) -> &T {
        &self.knots[coord]
    }
}

impl<'a, T> IntoIterator for &'a Axis<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
