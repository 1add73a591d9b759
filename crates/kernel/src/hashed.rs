//! Hashed-grid variant: cells addressed through an integer spatial hash.
//!
//! Cell ids are never used as array indices here. Each cell gets a key
//! `(col * P1) xor (row * P2)`, adjacency and buckets are keyed by that hash,
//! and the canonical pair filter resolves keys back to cell ids through the
//! reverse map. The hash is not injective in general, so the build verifies
//! it over the domain's finite cell range and refuses to continue on a clash.

use rustc_hash::FxHashMap;

use crate::adjacency::for_each_moore_neighbor;
use crate::domain::{Cell, Domain};
use crate::error::SearchError;
use crate::evaluate::{scan_between, scan_within, NeighborRelation, PairRule, PairStats};
use crate::point::PointSet;
use crate::{IndexKind, NeighborIndex};

/// Spatial hash key of a cell.
pub type HashKey = u64;

/// Multiplier applied to the column coordinate.
pub const HASH_PRIME_COL: i64 = 73_856_093;
/// Multiplier applied to the row coordinate.
pub const HASH_PRIME_ROW: i64 = 19_349_663;

/// `(col * P1) xor (row * P2)` with wrapping 64-bit arithmetic.
///
/// Signed inputs so the same key space covers cells left of or below the
/// origin.
#[inline]
pub fn spatial_hash(col: i64, row: i64) -> HashKey {
    (col.wrapping_mul(HASH_PRIME_COL) ^ row.wrapping_mul(HASH_PRIME_ROW)) as HashKey
}

/// Hash-keyed cell adjacency with a verified one-to-one key mapping.
#[derive(Debug, Clone)]
pub struct SpatialHashIndex {
    domain: Domain,
    cell_to_hash: FxHashMap<usize, HashKey>,
    hash_to_cell: FxHashMap<HashKey, usize>,
    adjacency: FxHashMap<HashKey, Vec<HashKey>>,
}

impl SpatialHashIndex {
    /// Build the index for `domain` with [`spatial_hash`].
    pub fn build(domain: &Domain) -> Result<Self, SearchError> {
        Self::build_with_hasher(domain, spatial_hash)
    }

    /// Build the index with a caller-supplied `hasher(col, row)`.
    ///
    /// Fails with [`SearchError::HashCollision`] as soon as two distinct cells
    /// produce the same key.
    pub fn build_with_hasher<H>(domain: &Domain, hasher: H) -> Result<Self, SearchError>
    where
        H: Fn(i64, i64) -> HashKey,
    {
        let total_cells = domain.total_cells();
        let per_row = domain.cells_per_row();

        let mut cell_to_hash = FxHashMap::default();
        let mut hash_to_cell = FxHashMap::default();
        cell_to_hash.reserve(total_cells);
        hash_to_cell.reserve(total_cells);

        for row in 0..per_row {
            for col in 0..per_row {
                let cell = Cell { row, col };
                let id = domain.cell_id(cell);
                let hash = hasher(col as i64, row as i64);
                if let Some(&prev) = hash_to_cell.get(&hash) {
                    return Err(SearchError::HashCollision {
                        hash,
                        first: Cell {
                            row: prev / per_row,
                            col: prev % per_row,
                        },
                        second: cell,
                    });
                }
                hash_to_cell.insert(hash, id);
                cell_to_hash.insert(id, hash);
            }
        }

        let mut adjacency = FxHashMap::default();
        adjacency.reserve(total_cells);
        for (&id, &hash) in &cell_to_hash {
            let cell = Cell {
                row: id / per_row,
                col: id % per_row,
            };
            let mut neighbors = Vec::with_capacity(8);
            for_each_moore_neighbor(per_row, cell, |n| {
                neighbors.push(cell_to_hash[&domain.cell_id(n)]);
            });
            adjacency.insert(hash, neighbors);
        }

        Ok(Self {
            domain: *domain,
            cell_to_hash,
            hash_to_cell,
            adjacency,
        })
    }

    /// The domain this index was built for.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of cells indexed.
    pub fn len(&self) -> usize {
        self.cell_to_hash.len()
    }

    /// `true` if no cells are indexed (never the case for a valid domain).
    pub fn is_empty(&self) -> bool {
        self.cell_to_hash.is_empty()
    }

    /// Key assigned to `cell_id`.
    pub fn hash_of(&self, cell_id: usize) -> Option<HashKey> {
        self.cell_to_hash.get(&cell_id).copied()
    }

    /// Cell id owning `hash`.
    pub fn cell_of(&self, hash: HashKey) -> Option<usize> {
        self.hash_to_cell.get(&hash).copied()
    }

    /// Keys of the cells adjacent to the cell keyed `hash`.
    pub fn neighbors_of(&self, hash: HashKey) -> Option<&[HashKey]> {
        self.adjacency.get(&hash).map(Vec::as_slice)
    }

    /// Group point indices by cell key.
    pub fn bucketize(&self, points: &PointSet) -> Result<HashedBuckets, SearchError> {
        let mut order = Vec::new();
        let mut buckets: FxHashMap<HashKey, Vec<usize>> = FxHashMap::default();

        for point in points.iter() {
            let id = self.domain.cell_id(self.domain.cell_of(point)?);
            let hash = self.hash_of(id).ok_or_else(|| {
                SearchError::inconsistent(format!("cell {id} has no hash key"))
            })?;
            buckets
                .entry(hash)
                .or_insert_with(|| {
                    order.push(hash);
                    Vec::new()
                })
                .push(point.index);
        }

        Ok(HashedBuckets {
            domain: self.domain,
            point_count: points.len(),
            order,
            buckets,
        })
    }

    /// Compute the neighbor relation from hash-keyed buckets.
    ///
    /// Same pair schedule as the direct grid: intra-cell pairs, then each
    /// adjacent cell whose resolved id is greater.
    pub fn evaluate(
        &self,
        buckets: &HashedBuckets,
        points: &PointSet,
        epsilon: f64,
    ) -> Result<NeighborRelation, SearchError> {
        if buckets.domain != self.domain {
            return Err(SearchError::inconsistent(format!(
                "hashed buckets built for {:?}, index built for {:?}",
                buckets.domain, self.domain
            )));
        }
        if buckets.point_count != points.len() {
            return Err(SearchError::inconsistent(format!(
                "hashed buckets hold {} points, point set has {}",
                buckets.point_count,
                points.len()
            )));
        }
        let rule = PairRule::for_domain(&self.domain, epsilon)?;

        let mut relation = NeighborRelation::empty(points.len());
        let mut stats = PairStats {
            occupied_cells: buckets.order.len(),
            ..PairStats::default()
        };
        let mut link = |i: usize, j: usize| relation.link(i, j);

        for &hash in &buckets.order {
            let own = buckets.get(hash);
            let cell_id = self.resolve(hash)?;
            let neighbor_keys = self.neighbors_of(hash).ok_or_else(|| {
                SearchError::inconsistent(format!("key {hash:#x} has no adjacency entry"))
            })?;

            stats.cell_pairs += 1;
            scan_within(own, points, &rule, &mut stats, &mut link);

            for &other_key in neighbor_keys {
                if self.resolve(other_key)? <= cell_id {
                    continue;
                }
                let other = buckets.get(other_key);
                if other.is_empty() {
                    continue;
                }
                stats.cell_pairs += 1;
                scan_between(own, other, points, &rule, &mut stats, &mut link);
            }
        }

        relation.set_stats(stats);
        Ok(relation)
    }

    fn resolve(&self, hash: HashKey) -> Result<usize, SearchError> {
        self.cell_of(hash)
            .ok_or_else(|| SearchError::inconsistent(format!("key {hash:#x} maps to no cell")))
    }
}

/// Point indices grouped by cell key for one point set.
#[derive(Debug, Clone)]
pub struct HashedBuckets {
    domain: Domain,
    point_count: usize,
    /// Keys in the order their first point was seen.
    order: Vec<HashKey>,
    buckets: FxHashMap<HashKey, Vec<usize>>,
}

impl HashedBuckets {
    /// Point indices under `hash`, in input order. Empty for unknown keys.
    pub fn get(&self, hash: HashKey) -> &[usize] {
        self.buckets.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys of non-empty buckets in first-seen order.
    pub fn occupied_keys(&self) -> &[HashKey] {
        &self.order
    }

    /// Number of points that were bucketed.
    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

/// [`NeighborIndex`] over a [`SpatialHashIndex`].
#[derive(Debug, Clone)]
pub struct HashedGrid {
    index: SpatialHashIndex,
    epsilon: f64,
}

impl HashedGrid {
    /// Build the hash index for `domain`.
    pub fn new(domain: &Domain, epsilon: f64) -> Result<Self, SearchError> {
        PairRule::for_domain(domain, epsilon)?;
        Ok(Self {
            index: SpatialHashIndex::build(domain)?,
            epsilon,
        })
    }

    /// Wrap an already-built hash index.
    pub fn from_index(index: SpatialHashIndex, epsilon: f64) -> Self {
        Self { index, epsilon }
    }

    /// The underlying hash index.
    pub fn index(&self) -> &SpatialHashIndex {
        &self.index
    }
}

impl NeighborIndex for HashedGrid {
    fn kind(&self) -> IndexKind {
        IndexKind::HashedGrid
    }

    fn domain(&self) -> &Domain {
        self.index.domain()
    }

    fn search(&self, points: &PointSet) -> Result<NeighborRelation, SearchError> {
        let buckets = self.index.bucketize(points)?;
        self.index.evaluate(&buckets, points, self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::DEFAULT_EPSILON;

    fn unit_domain() -> Domain {
        Domain::new(0.2, 1.0).unwrap()
    }

    #[test]
    fn hash_matches_formula() {
        assert_eq!(spatial_hash(0, 0), 0);
        assert_eq!(spatial_hash(1, 0), 73_856_093);
        assert_eq!(spatial_hash(0, 1), 19_349_663);
        assert_eq!(spatial_hash(2, 3), ((2 * 73_856_093) ^ (3 * 19_349_663)) as u64);
    }

    #[test]
    fn maps_are_mutually_inverse() {
        let index = SpatialHashIndex::build(&unit_domain()).unwrap();
        assert_eq!(index.len(), 25);
        for id in 0..25 {
            let hash = index.hash_of(id).unwrap();
            assert_eq!(index.cell_of(hash), Some(id));
        }
    }

    #[test]
    fn hashed_adjacency_matches_cell_adjacency() {
        let domain = unit_domain();
        let index = SpatialHashIndex::build(&domain).unwrap();
        let direct = crate::adjacency::CellAdjacency::build(&domain);
        for (id, neighbors) in direct.iter() {
            let hash = index.hash_of(id).unwrap();
            let resolved: Vec<usize> = index
                .neighbors_of(hash)
                .unwrap()
                .iter()
                .map(|&h| index.cell_of(h).unwrap())
                .collect();
            assert_eq!(resolved, neighbors, "cell {id}");
        }
    }

    #[test]
    fn collision_fails_the_build() {
        // col + row collides along every anti-diagonal
        let err = SpatialHashIndex::build_with_hasher(&unit_domain(), |col, row| (col + row) as u64)
            .unwrap_err();
        match err {
            SearchError::HashCollision { hash, first, second } => {
                assert_eq!(hash, 1);
                assert_eq!(first, Cell { row: 0, col: 1 });
                assert_eq!(second, Cell { row: 1, col: 0 });
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let index = SpatialHashIndex::build(&unit_domain()).unwrap();
        let points = PointSet::from_coords(&[[0.9, 0.9], [0.1, 0.1], [0.95, 0.85]]);
        let buckets = index.bucketize(&points).unwrap();
        let far = index.hash_of(24).unwrap();
        let origin = index.hash_of(0).unwrap();
        assert_eq!(buckets.occupied_keys(), &[far, origin]);
        assert_eq!(buckets.get(far), &[0, 2]);
        assert_eq!(buckets.get(origin), &[1]);
    }

    #[test]
    fn evaluates_scenario() {
        let grid = HashedGrid::new(&unit_domain(), DEFAULT_EPSILON).unwrap();
        let points = PointSet::from_coords(&[[0.18, 0.2], [0.35, 0.15], [0.4, 0.1]]);
        let relation = grid.search(&points).unwrap();
        assert_eq!(relation.to_sorted_lists(), vec![vec![1], vec![0, 2], vec![1]]);
    }

    #[test]
    fn buckets_from_another_domain_are_rejected() {
        let index = SpatialHashIndex::build(&unit_domain()).unwrap();
        let other = SpatialHashIndex::build(&Domain::new(0.25, 1.25).unwrap()).unwrap();
        let points = PointSet::from_coords(&[[0.1, 0.1]]);
        let buckets = other.bucketize(&points).unwrap();
        let err = index.evaluate(&buckets, &points, DEFAULT_EPSILON).unwrap_err();
        assert!(matches!(err, SearchError::InconsistentIndex { .. }));
    }
}
