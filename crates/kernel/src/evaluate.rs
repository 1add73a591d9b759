//! Pair evaluation over bucketed points.
//!
//! Every cell is tested against itself and against each adjacent cell with a
//! greater id. Visiting only the "greater" side of each cell pair means every
//! unordered cell pair is scanned exactly once, and every accepted point pair
//! is recorded once in each direction.

use std::collections::BTreeSet;
use std::ops::AddAssign;

use serde::Serialize;

use crate::adjacency::CellAdjacency;
use crate::bucket::BucketMap;
use crate::domain::Domain;
use crate::error::SearchError;
use crate::point::PointSet;

/// Tolerance used when none is configured.
pub const DEFAULT_EPSILON: f64 = 1.0e-7;

/// The neighbor acceptance rule shared by every index variant.
///
/// A pair is accepted iff `d² - r² < epsilon`. With a positive epsilon this
/// admits pairs marginally beyond the radius. Every variant applies this rule
/// to the pairs it visits, but the grids only visit pairs in the same or
/// adjacent cells. All variants agree on every pair with `d <= r`; a pair with
/// `r < d < sqrt(r² + epsilon)` whose cells are two apart is reported by the
/// brute-force oracle only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRule {
    radius_sq: f64,
    epsilon: f64,
}

impl PairRule {
    /// Rule for `search_radius` with tolerance `epsilon`.
    pub fn new(search_radius: f64, epsilon: f64) -> Result<Self, SearchError> {
        if !epsilon.is_finite() {
            return Err(SearchError::invalid(format!(
                "epsilon must be finite, got {epsilon}"
            )));
        }
        Ok(Self {
            radius_sq: search_radius * search_radius,
            epsilon,
        })
    }

    /// Rule for the radius of `domain`.
    pub fn for_domain(domain: &Domain, epsilon: f64) -> Result<Self, SearchError> {
        Self::new(domain.search_radius(), epsilon)
    }

    /// `true` if two points at `squared_distance` are neighbors.
    #[inline]
    pub fn accepts(&self, squared_distance: f64) -> bool {
        squared_distance - self.radius_sq < self.epsilon
    }

    /// Squared search radius.
    pub fn radius_sq(&self) -> f64 {
        self.radius_sq
    }

    /// Acceptance tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

/// Work counters for one evaluation.
///
/// Returned alongside the result instead of being logged from inside the
/// kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PairStats {
    /// Cells holding at least one point.
    pub occupied_cells: usize,
    /// Cell pairs scanned, counting each cell against itself once.
    pub cell_pairs: usize,
    /// Point pairs whose distance was computed.
    pub candidate_pairs: usize,
    /// Point pairs accepted as neighbors.
    pub accepted_pairs: usize,
}

impl AddAssign for PairStats {
    fn add_assign(&mut self, rhs: Self) {
        self.occupied_cells += rhs.occupied_cells;
        self.cell_pairs += rhs.cell_pairs;
        self.candidate_pairs += rhs.candidate_pairs;
        self.accepted_pairs += rhs.accepted_pairs;
    }
}

/// Symmetric, irreflexive neighbor relation over point indices.
///
/// `neighbors_of(i)` lists the neighbors of point `i`; the order inside a list
/// is unspecified, so compare with [`NeighborRelation::to_sets`] or
/// [`NeighborRelation::sorted`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct NeighborRelation {
    neighbors: Vec<Vec<usize>>,
    stats: PairStats,
}

impl NeighborRelation {
    /// A relation over `point_count` points with no pairs.
    pub fn empty(point_count: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); point_count],
            stats: PairStats::default(),
        }
    }

    /// Assemble a relation from accepted `(i, j)` pairs, each listed once.
    ///
    /// Fails with [`SearchError::InconsistentIndex`] if a pair is reflexive or
    /// names a point past `point_count`.
    pub fn from_pairs<I>(point_count: usize, pairs: I, stats: PairStats) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut relation = Self::empty(point_count);
        for (i, j) in pairs {
            if i == j || i >= point_count || j >= point_count {
                return Err(SearchError::inconsistent(format!(
                    "pair ({i}, {j}) is not valid for {point_count} points"
                )));
            }
            relation.link(i, j);
        }
        relation.stats = stats;
        Ok(relation)
    }

    #[inline]
    pub(crate) fn link(&mut self, i: usize, j: usize) {
        self.neighbors[i].push(j);
        self.neighbors[j].push(i);
    }

    pub(crate) fn set_stats(&mut self, stats: PairStats) {
        self.stats = stats;
    }

    /// Number of points covered (one entry per input point).
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// `true` if the relation covers no points.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbors of point `index`; empty for an unknown index.
    pub fn neighbors_of(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(index, neighbors)` for every point.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.neighbors.iter().map(Vec::as_slice).enumerate()
    }

    /// Counters collected while building this relation.
    pub fn stats(&self) -> PairStats {
        self.stats
    }

    /// Number of unordered neighbor pairs.
    pub fn pair_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// The relation with every neighbor list sorted ascending.
    pub fn sorted(mut self) -> Self {
        for list in &mut self.neighbors {
            list.sort_unstable();
        }
        self
    }

    /// Neighbor lists as ordered sets.
    pub fn to_sets(&self) -> Vec<BTreeSet<usize>> {
        self.neighbors
            .iter()
            .map(|list| list.iter().copied().collect())
            .collect()
    }

    /// Neighbor lists, sorted ascending, as plain vectors.
    pub fn to_sorted_lists(&self) -> Vec<Vec<usize>> {
        self.clone().sorted().neighbors
    }

    /// `true` if both relations hold the same neighbor sets.
    pub fn same_neighbors(&self, other: &NeighborRelation) -> bool {
        self.len() == other.len() && self.to_sets() == other.to_sets()
    }

    /// `true` if `j ∈ N(i) ⇔ i ∈ N(j)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        let sets = self.to_sets();
        sets.iter().enumerate().all(|(i, set)| {
            set.iter()
                .all(|&j| sets.get(j).is_some_and(|other| other.contains(&i)))
        })
    }

    /// `true` if no point lists itself.
    pub fn is_irreflexive(&self) -> bool {
        self.iter().all(|(i, list)| !list.contains(&i))
    }
}

/// Check that `domain`, `adjacency` and `buckets` describe the same grid and
/// that `buckets` was built from `points`.
pub fn ensure_consistent(
    domain: &Domain,
    adjacency: &CellAdjacency,
    buckets: &BucketMap,
    points: &PointSet,
) -> Result<(), SearchError> {
    if adjacency.domain() != domain {
        return Err(SearchError::inconsistent(format!(
            "adjacency built for {:?}, evaluating with {:?}",
            adjacency.domain(),
            domain
        )));
    }
    if buckets.domain() != domain {
        return Err(SearchError::inconsistent(format!(
            "buckets built for {:?}, evaluating with {:?}",
            buckets.domain(),
            domain
        )));
    }
    if buckets.point_count() != points.len() {
        return Err(SearchError::inconsistent(format!(
            "buckets hold {} points, point set has {}",
            buckets.point_count(),
            points.len()
        )));
    }
    Ok(())
}

/// Scan one occupied cell: its intra-cell pairs, then every adjacent cell
/// with a greater id. `on_pair(i, j)` is called once per accepted pair.
pub fn scan_cell<F>(
    cell_id: usize,
    adjacency: &CellAdjacency,
    buckets: &BucketMap,
    points: &PointSet,
    rule: &PairRule,
    stats: &mut PairStats,
    mut on_pair: F,
) -> Result<(), SearchError>
where
    F: FnMut(usize, usize),
{
    let neighbor_cells = adjacency.neighbors_of(cell_id).ok_or_else(|| {
        SearchError::inconsistent(format!("cell {cell_id} is not in the adjacency table"))
    })?;
    let own = buckets.bucket(cell_id);

    stats.cell_pairs += 1;
    scan_within(own, points, rule, stats, &mut on_pair);

    for &other_id in neighbor_cells.iter().filter(|&&n| n > cell_id) {
        let other = buckets.bucket(other_id);
        if other.is_empty() {
            continue;
        }
        stats.cell_pairs += 1;
        scan_between(own, other, points, rule, stats, &mut on_pair);
    }
    Ok(())
}

/// Test every unique pair `a[x], a[y]` with `x < y`.
#[inline]
pub(crate) fn scan_within<F>(
    bucket: &[usize],
    points: &PointSet,
    rule: &PairRule,
    stats: &mut PairStats,
    on_pair: &mut F,
) where
    F: FnMut(usize, usize),
{
    for (k, &i) in bucket.iter().enumerate() {
        for &j in &bucket[k + 1..] {
            stats.candidate_pairs += 1;
            if rule.accepts(points.squared_distance(i, j)) {
                stats.accepted_pairs += 1;
                on_pair(i, j);
            }
        }
    }
}

/// Test every point of `a` against every point of `b`.
#[inline]
pub(crate) fn scan_between<F>(
    a: &[usize],
    b: &[usize],
    points: &PointSet,
    rule: &PairRule,
    stats: &mut PairStats,
    on_pair: &mut F,
) where
    F: FnMut(usize, usize),
{
    for &i in a {
        for &j in b {
            stats.candidate_pairs += 1;
            if rule.accepts(points.squared_distance(i, j)) {
                stats.accepted_pairs += 1;
                on_pair(i, j);
            }
        }
    }
}

/// Compute the neighbor relation of `points` from prebuilt grid structures.
pub fn evaluate(
    domain: &Domain,
    adjacency: &CellAdjacency,
    buckets: &BucketMap,
    points: &PointSet,
    epsilon: f64,
) -> Result<NeighborRelation, SearchError> {
    ensure_consistent(domain, adjacency, buckets, points)?;
    let rule = PairRule::for_domain(domain, epsilon)?;

    let mut relation = NeighborRelation::empty(points.len());
    let mut stats = PairStats {
        occupied_cells: buckets.occupied_cells().len(),
        ..PairStats::default()
    };
    for &cell_id in buckets.occupied_cells() {
        scan_cell(cell_id, adjacency, buckets, points, &rule, &mut stats, |i, j| {
            relation.link(i, j)
        })?;
    }
    relation.set_stats(stats);
    Ok(relation)
}
