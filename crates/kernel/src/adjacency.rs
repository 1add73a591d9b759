//! Precomputed Moore-neighborhood adjacency between grid cells.
//!
//! Uses offset + flat id arrays rather than a `Vec<Vec<_>>` so the whole
//! table is two allocations, built once per [`Domain`] and shared read-only.

use crate::domain::{Cell, Domain};

/// The eight Moore offsets `(d_row, d_col)` in row-major order.
///
/// Row-major enumeration yields ascending neighbor ids for every cell.
pub(crate) const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Visit the in-domain Moore neighbors of `cell` in ascending id order.
pub(crate) fn for_each_moore_neighbor<F>(cells_per_row: usize, cell: Cell, mut f: F)
where
    F: FnMut(Cell),
{
    let n = cells_per_row as isize;
    for (dr, dc) in MOORE_OFFSETS {
        let row = cell.row as isize + dr;
        let col = cell.col as isize + dc;
        if row < 0 || row >= n || col < 0 || col >= n {
            continue;
        }
        f(Cell {
            row: row as usize,
            col: col as usize,
        });
    }
}

/// Undirected grid-graph adjacency over all cells of a [`Domain`].
///
/// Corner cells have 3 neighbors, edge cells 5, interior cells 8. There is no
/// wraparound, so the relation is symmetric.
#[derive(Debug, Clone)]
pub struct CellAdjacency {
    domain: Domain,
    /// Start offset in `neighbor_ids` for each cell; `total_cells + 1` entries.
    offsets: Vec<usize>,
    /// Neighbor cell ids, grouped by cell and ascending within each group.
    neighbor_ids: Vec<usize>,
}

impl CellAdjacency {
    /// Build the adjacency table for every cell of `domain`. O(total_cells).
    pub fn build(domain: &Domain) -> Self {
        let total_cells = domain.total_cells();
        let per_row = domain.cells_per_row();

        let mut offsets = Vec::with_capacity(total_cells + 1);
        let mut neighbor_ids = Vec::with_capacity(total_cells * MOORE_OFFSETS.len());
        for id in 0..total_cells {
            offsets.push(neighbor_ids.len());
            let cell = Cell {
                row: id / per_row,
                col: id % per_row,
            };
            for_each_moore_neighbor(per_row, cell, |n| neighbor_ids.push(domain.cell_id(n)));
        }
        offsets.push(neighbor_ids.len());

        Self {
            domain: *domain,
            offsets,
            neighbor_ids,
        }
    }

    /// The domain this table was built for.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of cells covered.
    pub fn total_cells(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Neighbor ids of `cell_id` in ascending order, or `None` for an id the
    /// table does not know.
    #[inline]
    pub fn neighbors_of(&self, cell_id: usize) -> Option<&[usize]> {
        let start = *self.offsets.get(cell_id)?;
        let end = *self.offsets.get(cell_id + 1)?;
        Some(&self.neighbor_ids[start..end])
    }

    /// Iterate over `(cell_id, neighbors)` for every cell.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.offsets
            .windows(2)
            .enumerate()
            .map(|(id, w)| (id, &self.neighbor_ids[w[0]..w[1]]))
    }
}
