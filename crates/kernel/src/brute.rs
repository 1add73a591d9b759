//! Exhaustive O(n²) search, used as the correctness oracle.

use crate::domain::Domain;
use crate::error::SearchError;
use crate::evaluate::{scan_within, NeighborRelation, PairRule, PairStats};
use crate::point::PointSet;
use crate::{IndexKind, NeighborIndex};

/// Test every pair `i < j` of `points` with the shared [`PairRule`].
///
/// Points are still validated against `domain` so every index variant fails
/// on the same inputs.
pub fn brute_force(
    domain: &Domain,
    points: &PointSet,
    epsilon: f64,
) -> Result<NeighborRelation, SearchError> {
    for point in points.iter() {
        domain.cell_of(point)?;
    }
    let rule = PairRule::for_domain(domain, epsilon)?;

    let all: Vec<usize> = (0..points.len()).collect();
    let mut relation = NeighborRelation::empty(points.len());
    let mut stats = PairStats::default();
    scan_within(&all, points, &rule, &mut stats, &mut |i, j| relation.link(i, j));
    relation.set_stats(stats);
    Ok(relation)
}

/// [`NeighborIndex`] that skips the grid entirely.
#[derive(Debug, Clone, Copy)]
pub struct BruteForce {
    domain: Domain,
    epsilon: f64,
}

impl BruteForce {
    /// Oracle over `domain` with tolerance `epsilon`.
    pub fn new(domain: &Domain, epsilon: f64) -> Result<Self, SearchError> {
        PairRule::for_domain(domain, epsilon)?;
        Ok(Self {
            domain: *domain,
            epsilon,
        })
    }
}

impl NeighborIndex for BruteForce {
    fn kind(&self) -> IndexKind {
        IndexKind::BruteForce
    }

    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn search(&self, points: &PointSet) -> Result<NeighborRelation, SearchError> {
        brute_force(&self.domain, points, self.epsilon)
    }
}
