//! Grid vs. exhaustive search parity.
//!
//! Seeded random point sets are searched with both grid variants and compared
//! against the O(n²) oracle. Any missed or extra pair is a failure.

use frnn_kernel::{
    build_index, Domain, IndexKind, NeighborRelation, PointSet, DEFAULT_EPSILON,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniformly scattered points inside `[0, domain_size]²`.
fn random_points(rng: &mut ChaCha8Rng, n: usize, domain_size: f64) -> PointSet {
    (0..n)
        .map(|_| {
            (
                rng.random_range(0.0..=domain_size),
                rng.random_range(0.0..=domain_size),
            )
        })
        .collect()
}

/// Points clustered around a few centers, clamped into the domain.
fn clustered_points(rng: &mut ChaCha8Rng, n: usize, domain_size: f64, spread: f64) -> PointSet {
    let centers: Vec<(f64, f64)> = (0..4)
        .map(|_| {
            (
                rng.random_range(0.0..=domain_size),
                rng.random_range(0.0..=domain_size),
            )
        })
        .collect();
    (0..n)
        .map(|k| {
            let (cx, cy) = centers[k % centers.len()];
            let x = (cx + rng.random_range(-spread..spread)).clamp(0.0, domain_size);
            let y = (cy + rng.random_range(-spread..spread)).clamp(0.0, domain_size);
            (x, y)
        })
        .collect()
}

fn search(kind: IndexKind, domain: &Domain, points: &PointSet) -> NeighborRelation {
    build_index(kind, domain, DEFAULT_EPSILON)
        .unwrap()
        .search(points)
        .unwrap()
}

fn assert_parity(domain: &Domain, points: &PointSet, label: &str) {
    let oracle = search(IndexKind::BruteForce, domain, points);
    for kind in [IndexKind::DirectGrid, IndexKind::HashedGrid] {
        let relation = search(kind, domain, points);
        assert_eq!(relation.len(), points.len(), "{label}: {} entry count", kind.name());
        assert!(
            relation.same_neighbors(&oracle),
            "{label}: {} disagrees with brute force ({} vs {} pairs)",
            kind.name(),
            relation.pair_count(),
            oracle.pair_count()
        );
        assert!(relation.is_symmetric(), "{label}: {} asymmetric", kind.name());
        assert!(relation.is_irreflexive(), "{label}: {} reflexive", kind.name());
        assert!(
            relation.stats().candidate_pairs <= oracle.stats().candidate_pairs,
            "{label}: {} tested more pairs than brute force",
            kind.name()
        );
    }
}

#[test]
fn uniform_points_match_brute_force() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for &(radius, size) in &[(0.2, 1.0), (0.1, 1.0), (0.05, 1.0), (1.5, 10.0), (0.3, 1.0)] {
        let domain = Domain::new(radius, size).unwrap();
        for &n in &[0usize, 1, 2, 17, 250] {
            let points = random_points(&mut rng, n, size);
            assert_parity(&domain, &points, &format!("r={radius} d={size} n={n}"));
        }
    }
}

#[test]
fn clustered_points_match_brute_force() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let domain = Domain::new(0.1, 1.0).unwrap();
    for &spread in &[0.01, 0.05, 0.15] {
        let points = clustered_points(&mut rng, 400, 1.0, spread);
        assert_parity(&domain, &points, &format!("spread={spread}"));
    }
}

#[test]
fn non_divisible_radius_matches_brute_force() {
    // 1.0 / 0.45 rounds to 2 cells of width 0.45, leaving a clamped strip
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let domain = Domain::new(0.45, 1.0).unwrap();
    assert_eq!(domain.cells_per_row(), 2);
    let points = random_points(&mut rng, 300, 1.0);
    assert_parity(&domain, &points, "r=0.45");
}

#[test]
fn grid_aligned_points_match_brute_force() {
    // 0.15 lattice puts points on cell edges (0.0, 0.6) and a column on the
    // upper boundary; no pair distance falls in the tolerance band above r
    let domain = Domain::new(0.2, 1.0).unwrap();
    let mut points = PointSet::new();
    for i in 0..=6 {
        for j in 0..=6 {
            points.push(i as f64 * 0.15, j as f64 * 0.15);
        }
        points.push(1.0, i as f64 * 0.15);
    }
    assert_parity(&domain, &points, "lattice");
}

#[test]
fn repeated_searches_are_deterministic() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let domain = Domain::new(0.1, 1.0).unwrap();
    let points = random_points(&mut rng, 500, 1.0);
    for kind in IndexKind::ALL {
        let index = build_index(kind, &domain, DEFAULT_EPSILON).unwrap();
        let first = index.search(&points).unwrap();
        let second = index.search(&points).unwrap();
        assert_eq!(
            first.to_sorted_lists(),
            second.to_sorted_lists(),
            "{} not deterministic",
            kind.name()
        );
        assert_eq!(first.stats(), second.stats());
    }
}

#[test]
fn tolerance_band_pairs_two_cells_apart() {
    // d = r + 2e-7 puts d² - r² ≈ 8e-8 under epsilon, but columns 1 and 3
    // are not adjacent so only the exhaustive scan sees the pair
    let domain = Domain::new(0.2, 1.0).unwrap();
    let points = PointSet::from_coords(&[[0.3999999, 0.5], [0.6000001, 0.5]]);
    assert_eq!(domain.cell_of(points.get(0).unwrap()).unwrap().col, 1);
    assert_eq!(domain.cell_of(points.get(1).unwrap()).unwrap().col, 3);

    let expected: [(IndexKind, Vec<Vec<usize>>); 3] = [
        (IndexKind::BruteForce, vec![vec![1], vec![0]]),
        (IndexKind::DirectGrid, vec![vec![], vec![]]),
        (IndexKind::HashedGrid, vec![vec![], vec![]]),
    ];
    for (kind, lists) in expected {
        assert_eq!(search(kind, &domain, &points).to_sorted_lists(), lists, "{}", kind.name());
    }

    for kind in IndexKind::ALL {
        let strict = build_index(kind, &domain, 0.0).unwrap().search(&points).unwrap();
        assert_eq!(strict.pair_count(), 0, "{} with zero epsilon", kind.name());
    }
}
