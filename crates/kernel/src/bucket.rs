//! Point bucketing for the directly-addressed grid.
//!
//! Uses sorted-index + cell-offset arrays rather than one `Vec` per cell:
//! one counting pass, one prefix sum, one scatter. The scatter walks points in
//! index order, so every bucket lists its points in input order.

use crate::domain::Domain;
use crate::error::SearchError;
use crate::point::PointSet;

/// Point indices grouped by cell id for one point set.
#[derive(Debug, Clone)]
pub struct BucketMap {
    domain: Domain,
    /// Cell id of each point (parallel to the point set).
    cell_of_point: Vec<usize>,
    /// Point indices sorted by cell id, stable within a cell.
    sorted_indices: Vec<usize>,
    /// Start offset in `sorted_indices` for each cell; `total_cells + 1` entries.
    cell_offsets: Vec<usize>,
    /// Ids of non-empty cells, ascending.
    occupied: Vec<usize>,
}

impl BucketMap {
    /// Discretize every point of `points` and group indices by cell.
    ///
    /// Fails with [`SearchError::PointOutOfDomain`] on the first point outside
    /// the domain; no partial map is returned.
    pub fn bucketize(domain: &Domain, points: &PointSet) -> Result<Self, SearchError> {
        let n = points.len();
        let total_cells = domain.total_cells();

        // --- 1. Cell id for each point ---
        let mut cell_of_point = Vec::with_capacity(n);
        for point in points.iter() {
            let cell = domain.cell_of(point)?;
            cell_of_point.push(domain.cell_id(cell));
        }

        // --- 2. Count points per cell ---
        let mut counts = vec![0usize; total_cells];
        for &c in &cell_of_point {
            counts[c] += 1;
        }

        // --- 3. Prefix sum to get cell offsets ---
        let mut cell_offsets = Vec::with_capacity(total_cells + 1);
        let mut occupied = Vec::new();
        let mut running = 0;
        for (c, &count) in counts.iter().enumerate() {
            cell_offsets.push(running);
            if count > 0 {
                occupied.push(c);
            }
            running += count;
        }
        cell_offsets.push(running);

        // --- 4. Scatter point indices into sorted order ---
        let mut sorted_indices = vec![0usize; n];
        let mut write_heads = cell_offsets.clone();
        for (i, &c) in cell_of_point.iter().enumerate() {
            sorted_indices[write_heads[c]] = i;
            write_heads[c] += 1;
        }

        Ok(Self {
            domain: *domain,
            cell_of_point,
            sorted_indices,
            cell_offsets,
            occupied,
        })
    }

    /// The domain the points were discretized against.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of points that were bucketed.
    pub fn point_count(&self) -> usize {
        self.cell_of_point.len()
    }

    /// Cell id assigned to point `index`.
    pub fn cell_of_point(&self, index: usize) -> Option<usize> {
        self.cell_of_point.get(index).copied()
    }

    /// Point indices in `cell_id`, in input order. Empty for unknown ids.
    #[inline]
    pub fn bucket(&self, cell_id: usize) -> &[usize] {
        match (self.cell_offsets.get(cell_id), self.cell_offsets.get(cell_id + 1)) {
            (Some(&start), Some(&end)) => &self.sorted_indices[start..end],
            _ => &[],
        }
    }

    /// Ids of cells holding at least one point, ascending.
    pub fn occupied_cells(&self) -> &[usize] {
        &self.occupied
    }
}
