//! Fixed-Radius Near-Neighbor Kernel
//!
//! This crate finds, for every point of a 2D point set, all other points
//! within a search radius. It is designed to be side-effect free: it neither
//! logs nor holds global state, and reports its work through [`PairStats`].
//!
//! # Modules
//! - [`domain`] -- Grid geometry (`cells_per_row`, cell discretization).
//! - [`adjacency`] -- Precomputed Moore-neighborhood cell adjacency.
//! - [`bucket`] -- Counting-sort bucketing of points into cells.
//! - [`evaluate`] -- Canonical pair schedule, tolerance rule, neighbor relation.
//! - [`hashed`] -- Hash-addressed variant with collision detection.
//! - [`brute`] -- Exhaustive O(n²) oracle.
//! - [`point`] -- Struct-of-arrays point storage.
//! - [`error`] -- Error taxonomy.

#![warn(missing_docs)]

pub mod adjacency;
pub mod brute;
pub mod bucket;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod hashed;
pub mod point;

use serde::{Deserialize, Serialize};

pub use adjacency::CellAdjacency;
pub use brute::{brute_force, BruteForce};
pub use bucket::BucketMap;
pub use domain::{Cell, Domain, MAX_TOTAL_CELLS};
pub use error::SearchError;
pub use evaluate::{evaluate, NeighborRelation, PairRule, PairStats, DEFAULT_EPSILON};
pub use hashed::{spatial_hash, HashKey, HashedBuckets, HashedGrid, SpatialHashIndex};
pub use point::{Point, PointSet};

// ---------------------------------------------------------------------------
// NeighborIndex trait
// ---------------------------------------------------------------------------

/// Selects a [`NeighborIndex`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexKind {
    /// Exhaustive pairwise comparison.
    BruteForce,
    /// Uniform grid addressed directly by cell id.
    #[default]
    DirectGrid,
    /// Uniform grid addressed through a spatial hash.
    HashedGrid,
}

impl IndexKind {
    /// Every variant, oracle first.
    pub const ALL: [IndexKind; 3] = [
        IndexKind::BruteForce,
        IndexKind::DirectGrid,
        IndexKind::HashedGrid,
    ];

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            IndexKind::BruteForce => "brute-force",
            IndexKind::DirectGrid => "direct-grid",
            IndexKind::HashedGrid => "hashed-grid",
        }
    }
}

/// Trait that all neighbor search strategies implement.
///
/// An index is built once for a [`Domain`] and queried with any number of
/// point sets. Per-query state (buckets, results) is created inside
/// [`NeighborIndex::search`] and owned by the caller afterwards, so an index
/// can be shared read-only across threads.
///
/// 1. Validate and bucket the points
/// 2. Enumerate candidate pairs
/// 3. Apply the shared [`PairRule`]
pub trait NeighborIndex {
    /// Which strategy this is.
    fn kind(&self) -> IndexKind;

    /// The domain the index was built for.
    fn domain(&self) -> &Domain;

    /// Compute the neighbor relation of `points`.
    fn search(&self, points: &PointSet) -> Result<NeighborRelation, SearchError>;
}

// ---------------------------------------------------------------------------
// DirectGrid -- directly addressed uniform grid
// ---------------------------------------------------------------------------

/// Uniform grid whose cell ids index flat arrays.
///
/// The adjacency table is built once here and reused by every query.
#[derive(Debug, Clone)]
pub struct DirectGrid {
    /// Grid geometry.
    domain: Domain,
    /// Moore adjacency for every cell of `domain`.
    adjacency: CellAdjacency,
    /// Acceptance tolerance.
    epsilon: f64,
}

impl DirectGrid {
    /// Build the adjacency table for `domain`.
    pub fn new(domain: &Domain, epsilon: f64) -> Result<Self, SearchError> {
        PairRule::for_domain(domain, epsilon)?;
        Ok(Self {
            domain: *domain,
            adjacency: CellAdjacency::build(domain),
            epsilon,
        })
    }

    /// The prebuilt adjacency table.
    pub fn adjacency(&self) -> &CellAdjacency {
        &self.adjacency
    }

    /// Acceptance tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Bucket `points` for this grid.
    pub fn bucketize(&self, points: &PointSet) -> Result<BucketMap, SearchError> {
        BucketMap::bucketize(&self.domain, points)
    }
}

impl NeighborIndex for DirectGrid {
    fn kind(&self) -> IndexKind {
        IndexKind::DirectGrid
    }

    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn search(&self, points: &PointSet) -> Result<NeighborRelation, SearchError> {
        let buckets = self.bucketize(points)?;
        evaluate(&self.domain, &self.adjacency, &buckets, points, self.epsilon)
    }
}

/// Build the index selected by `kind` for `domain`.
pub fn build_index(
    kind: IndexKind,
    domain: &Domain,
    epsilon: f64,
) -> Result<Box<dyn NeighborIndex + Send + Sync>, SearchError> {
    Ok(match kind {
        IndexKind::BruteForce => Box::new(BruteForce::new(domain, epsilon)?),
        IndexKind::DirectGrid => Box::new(DirectGrid::new(domain, epsilon)?),
        IndexKind::HashedGrid => Box::new(HashedGrid::new(domain, epsilon)?),
    })
}

/// Find all neighbors within `search_radius` for every point.
///
/// Uses the direct grid with [`DEFAULT_EPSILON`]. The result has one entry per
/// point (possibly empty), is symmetric, and never lists a point as its own
/// neighbor.
///
/// # Example
/// ```
/// let relation = frnn_kernel::find_neighbors(
///     &[[0.18, 0.2], [0.35, 0.15], [0.4, 0.1]],
///     0.2,
///     1.0,
/// )?;
/// assert_eq!(relation.to_sorted_lists(), vec![vec![1], vec![0, 2], vec![1]]);
/// # Ok::<(), frnn_kernel::SearchError>(())
/// ```
pub fn find_neighbors(
    points: &[[f64; 2]],
    search_radius: f64,
    domain_size: f64,
) -> Result<NeighborRelation, SearchError> {
    find_neighbors_with(
        IndexKind::DirectGrid,
        points,
        search_radius,
        domain_size,
        DEFAULT_EPSILON,
    )
}

/// [`find_neighbors`] with an explicit strategy and tolerance.
pub fn find_neighbors_with(
    kind: IndexKind,
    points: &[[f64; 2]],
    search_radius: f64,
    domain_size: f64,
    epsilon: f64,
) -> Result<NeighborRelation, SearchError> {
    let domain = Domain::new(search_radius, domain_size)?;
    let index = build_index(kind, &domain, epsilon)?;
    index.search(&PointSet::from_coords(points))
}
