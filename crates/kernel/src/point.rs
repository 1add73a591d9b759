//! Point storage using a struct-of-arrays layout.

/// A single point together with its positional index.
///
/// The index is the point's position in the [`PointSet`] it came from and
/// stays stable for the lifetime of a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Position of the point in its set.
    pub index: usize,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// Struct-of-arrays point storage.
///
/// `x[i]` and `y[i]` describe point `i`. Separate coordinate arrays keep the
/// distance loop on two contiguous streams. The arrays are only grown
/// together, so they always have the same length:
///
/// ```compile_fail
/// let points = frnn_kernel::PointSet { x: vec![0.1, 0.2], y: vec![0.1] };
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl PointSet {
    /// Create an empty point set.
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Create an empty point set with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    /// Build a point set from `[x, y]` pairs, preserving order.
    pub fn from_coords(coords: &[[f64; 2]]) -> Self {
        coords.iter().map(|&[x, y]| (x, y)).collect()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// `true` if the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Append a point and return its index.
    pub fn push(&mut self, x: f64, y: f64) -> usize {
        self.x.push(x);
        self.y.push(y);
        self.x.len() - 1
    }

    /// The point at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<Point> {
        Some(Point {
            index,
            x: *self.x.get(index)?,
            y: *self.y.get(index)?,
        })
    }

    /// Iterate over all points in index order.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .enumerate()
            .map(|(index, (&x, &y))| Point { index, x, y })
    }

    /// X coordinates in index order.
    pub fn xs(&self) -> &[f64] {
        &self.x
    }

    /// Y coordinates in index order.
    pub fn ys(&self) -> &[f64] {
        &self.y
    }

    /// Squared Euclidean distance between points `i` and `j`.
    #[inline]
    pub fn squared_distance(&self, i: usize, j: usize) -> f64 {
        let dx = self.x[i] - self.x[j];
        let dy = self.y[i] - self.y[j];
        dx * dx + dy * dy
    }
}

impl FromIterator<(f64, f64)> for PointSet {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut points = PointSet::with_capacity(iter.size_hint().0);
        for (x, y) in iter {
            points.push(x, y);
        }
        points
    }
}
