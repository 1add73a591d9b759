//! Parallel evaluation of the direct grid
//!
//! Occupied cells are split into contiguous chunks, one per worker. Each
//! worker scans its chunk with the same canonical pair schedule as the
//! sequential evaluator and appends accepted pairs to a private fragment.
//! Fragments are merged in chunk order, so the result is deterministic for a
//! given worker count and equal as sets to the sequential relation.
//!
//! All grid structures are shared read-only; no locking is needed.

use frnn_kernel::evaluate::{ensure_consistent, scan_cell};
use frnn_kernel::{
    BucketMap, CellAdjacency, Domain, NeighborRelation, PairRule, PairStats, PointSet,
    SearchError,
};
use rayon::prelude::*;

/// Accepted pairs and counters produced by one worker.
#[derive(Debug, Default)]
struct Fragment {
    pairs: Vec<(usize, usize)>,
    stats: PairStats,
}

/// Evaluate `buckets` on `pool`, splitting occupied cells across its threads.
pub fn evaluate_parallel(
    pool: &rayon::ThreadPool,
    domain: &Domain,
    adjacency: &CellAdjacency,
    buckets: &BucketMap,
    points: &PointSet,
    epsilon: f64,
) -> Result<NeighborRelation, SearchError> {
    // 1. Same pre-flight checks as the sequential path
    ensure_consistent(domain, adjacency, buckets, points)?;
    let rule = PairRule::for_domain(domain, epsilon)?;

    let occupied = buckets.occupied_cells();
    if occupied.is_empty() {
        return Ok(NeighborRelation::empty(points.len()));
    }

    // 2. Partition occupied cells
    let workers = pool.current_num_threads().max(1);
    let chunk_size = occupied.len().div_ceil(workers);

    // 3. Scan chunks in parallel
    let fragments: Vec<Result<Fragment, SearchError>> = pool.install(|| {
        occupied
            .par_chunks(chunk_size)
            .map(|chunk| -> Result<Fragment, SearchError> {
                let mut pairs = Vec::new();
                let mut stats = PairStats::default();
                for &cell_id in chunk {
                    scan_cell(cell_id, adjacency, buckets, points, &rule, &mut stats, |i, j| {
                        pairs.push((i, j))
                    })?;
                }
                Ok(Fragment { pairs, stats })
            })
            .collect()
    });

    // 4. Merge fragments in chunk order
    let fragments = fragments.into_iter().collect::<Result<Vec<_>, _>>()?;
    let mut stats = PairStats {
        occupied_cells: occupied.len(),
        ..PairStats::default()
    };
    for fragment in &fragments {
        stats += fragment.stats;
    }
    NeighborRelation::from_pairs(
        points.len(),
        fragments.into_iter().flat_map(|f| f.pairs),
        stats,
    )
}
