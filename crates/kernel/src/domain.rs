//! Grid geometry derived from a search radius and a square domain.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::point::Point;

/// Largest grid [`Domain::new`] accepts (4096 x 4096 cells).
pub const MAX_TOTAL_CELLS: usize = 1 << 24;

/// Integer cell coordinates inside a [`Domain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row (discretized y).
    pub row: usize,
    /// Column (discretized x).
    pub col: usize,
}

/// Square domain `[0, domain_size]²` split into cells of side `search_radius`.
///
/// The number of cells per row is `round(domain_size / search_radius)`, so
/// the last row and column absorb any remainder. Every cell but the last is
/// exactly `search_radius` wide; the last one is wider when the ratio rounds
/// down and narrower when it rounds up. Two points within the radius are
/// therefore always in the same or adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    search_radius: f64,
    domain_size: f64,
    cells_per_row: usize,
    total_cells: usize,
}

impl Domain {
    /// Derive the grid for `search_radius` over `[0, domain_size]²`.
    ///
    /// Fails with [`SearchError::InvalidConfiguration`] if the radius is not
    /// positive, the domain is smaller than the radius, either value is not
    /// finite, or the grid would exceed [`MAX_TOTAL_CELLS`].
    pub fn new(search_radius: f64, domain_size: f64) -> Result<Self, SearchError> {
        if !search_radius.is_finite() || !domain_size.is_finite() {
            return Err(SearchError::invalid(format!(
                "search_radius ({search_radius}) and domain_size ({domain_size}) must be finite"
            )));
        }
        if search_radius <= 0.0 {
            return Err(SearchError::invalid(format!(
                "search_radius must be positive, got {search_radius}"
            )));
        }
        if domain_size < search_radius {
            return Err(SearchError::invalid(format!(
                "domain_size ({domain_size}) must be at least search_radius ({search_radius})"
            )));
        }

        let ratio = (domain_size / search_radius).round();
        if ratio > u32::MAX as f64 {
            return Err(SearchError::invalid(format!(
                "{ratio} cells per row is too many"
            )));
        }
        let cells_per_row = (ratio as usize).max(1);
        let total_cells = cells_per_row
            .checked_mul(cells_per_row)
            .ok_or_else(|| SearchError::invalid(format!("{cells_per_row}² cells overflow")))?;
        if total_cells > MAX_TOTAL_CELLS {
            return Err(SearchError::invalid(format!(
                "{cells_per_row}² cells exceeds the limit of {MAX_TOTAL_CELLS}"
            )));
        }

        Ok(Self {
            search_radius,
            domain_size,
            cells_per_row,
            total_cells,
        })
    }

    /// Search radius, which is also the nominal cell side.
    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    /// Side length of the square domain.
    pub fn domain_size(&self) -> f64 {
        self.domain_size
    }

    /// Number of cells along each axis.
    pub fn cells_per_row(&self) -> usize {
        self.cells_per_row
    }

    /// Total number of cells (`cells_per_row²`).
    pub fn total_cells(&self) -> usize {
        self.total_cells
    }

    /// Canonical id of `cell`: `row * cells_per_row + col`.
    #[inline]
    pub fn cell_id(&self, cell: Cell) -> usize {
        cell.row * self.cells_per_row + cell.col
    }

    /// Inverse of [`Domain::cell_id`]; `None` for ids past the last cell.
    #[inline]
    pub fn cell_from_id(&self, id: usize) -> Option<Cell> {
        (id < self.total_cells).then(|| Cell {
            row: id / self.cells_per_row,
            col: id % self.cells_per_row,
        })
    }

    /// Discretize a point into its cell.
    ///
    /// Points on the upper boundary land in the last row/column. Coordinates
    /// below zero, above `domain_size`, or not finite are rejected rather than
    /// clamped.
    pub fn cell_of(&self, point: Point) -> Result<Cell, SearchError> {
        if !self.contains(point.x) || !self.contains(point.y) {
            return Err(SearchError::PointOutOfDomain {
                index: point.index,
                x: point.x,
                y: point.y,
                domain_size: self.domain_size,
            });
        }
        Ok(Cell {
            row: self.discretize(point.y),
            col: self.discretize(point.x),
        })
    }

    #[inline]
    fn contains(&self, coord: f64) -> bool {
        coord.is_finite() && (0.0..=self.domain_size).contains(&coord)
    }

    #[inline]
    fn discretize(&self, coord: f64) -> usize {
        let last = self.cells_per_row - 1;
        ((coord / self.search_radius).floor() as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Point {
        Point { index: 0, x, y }
    }

    #[test]
    fn grid_geometry_from_radius_and_size() {
        // (radius, size) -> cells per row
        let cases = [(0.2, 0.4, 2), (0.4, 1.2, 3), (0.3, 1.2, 4), (0.2, 1.0, 5)];
        for (radius, size, per_row) in cases {
            let domain = Domain::new(radius, size).unwrap();
            assert_eq!(domain.cells_per_row(), per_row, "r={radius}, d={size}");
            assert_eq!(domain.total_cells(), per_row * per_row);
        }
    }

    #[test]
    fn domain_equal_to_radius_has_one_cell() {
        let domain = Domain::new(0.5, 0.5).unwrap();
        assert_eq!(domain.cells_per_row(), 1);
        assert_eq!(domain.cell_of(point(0.5, 0.0)).unwrap(), Cell { row: 0, col: 0 });
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            Domain::new(0.0, 1.0),
            Err(SearchError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Domain::new(-0.2, 1.0),
            Err(SearchError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Domain::new(0.5, 0.4),
            Err(SearchError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Domain::new(f64::NAN, 1.0),
            Err(SearchError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Domain::new(1e-300, 1e300),
            Err(SearchError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn grid_size_is_capped() {
        let domain = Domain::new(1.0, 4096.0).unwrap();
        assert_eq!(domain.total_cells(), MAX_TOTAL_CELLS);

        for (radius, size) in [(1.0, 4097.0), (1e-8, 1.0)] {
            assert!(
                matches!(
                    Domain::new(radius, size),
                    Err(SearchError::InvalidConfiguration { .. })
                ),
                "r={radius}, d={size}"
            );
        }
    }

    #[test]
    fn cell_id_round_trips() {
        let domain = Domain::new(0.2, 1.0).unwrap();
        for id in 0..domain.total_cells() {
            let cell = domain.cell_from_id(id).unwrap();
            assert_eq!(domain.cell_id(cell), id);
        }
        assert!(domain.cell_from_id(25).is_none());
    }

    #[test]
    fn cell_of_uses_column_for_x_and_row_for_y() {
        let domain = Domain::new(0.2, 1.0).unwrap();
        let cell = domain.cell_of(point(0.35, 0.15)).unwrap();
        assert_eq!(cell, Cell { row: 0, col: 1 });
        assert_eq!(domain.cell_id(cell), 1);

        let cell = domain.cell_of(point(0.1, 0.9)).unwrap();
        assert_eq!(cell, Cell { row: 4, col: 0 });
        assert_eq!(domain.cell_id(cell), 20);
    }

    #[test]
    fn upper_boundary_lands_in_last_cell() {
        let domain = Domain::new(0.2, 1.0).unwrap();
        assert_eq!(domain.cell_of(point(1.0, 1.0)).unwrap(), Cell { row: 4, col: 4 });

        // 1.2 / 0.3 is just below 4.0 in binary floating point
        let domain = Domain::new(0.3, 1.2).unwrap();
        assert_eq!(domain.cell_of(point(1.2, 0.0)).unwrap().col, 3);
    }

    #[test]
    fn remainder_is_absorbed_by_last_column() {
        // 1.0 / 0.45 rounds down to 2 cells; x in [0.9, 1.0] would floor to 2
        let domain = Domain::new(0.45, 1.0).unwrap();
        assert_eq!(domain.cells_per_row(), 2);
        assert_eq!(domain.cell_of(point(0.95, 0.0)).unwrap().col, 1);
    }

    #[test]
    fn out_of_domain_points_are_rejected() {
        let domain = Domain::new(0.2, 1.0).unwrap();
        for (x, y) in [(-0.01, 0.5), (0.5, 1.01), (f64::INFINITY, 0.1), (0.1, f64::NAN)] {
            let err = domain.cell_of(Point { index: 7, x, y }).unwrap_err();
            assert!(
                matches!(err, SearchError::PointOutOfDomain { index: 7, .. }),
                "({x}, {y}) -> {err:?}"
            );
        }
    }
}
