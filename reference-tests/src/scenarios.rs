//! Built-in reference scenarios
//!
//! Known-answer cases on the unit square with radius 0.2, randomized
//! differential cases against the brute-force oracle, and failure cases.

use crate::{ExpectedFailure, ExpectedResult, PointSource, ReferenceTest};

/// Resolve a path relative to the workspace root (one level up from this crate)
pub fn project_path(relative: &str) -> String {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let project_root = manifest_dir.parent().unwrap_or(manifest_dir);
    project_root.join(relative).to_string_lossy().to_string()
}

/// Checks shared by every known-answer scenario
fn known_answer(neighbors: Vec<Vec<usize>>) -> ExpectedResult {
    ExpectedResult {
        neighbors: Some(neighbors),
        structural: true,
        oracle_agreement: true,
        determinism: true,
        ..ExpectedResult::default()
    }
}

/// Checks shared by every randomized scenario
fn differential(parallel_workers: usize) -> ExpectedResult {
    ExpectedResult {
        structural: true,
        oracle_agreement: true,
        determinism: true,
        parallel_workers: Some(parallel_workers),
        ..ExpectedResult::default()
    }
}

/// One isolated point
pub fn single_point_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Single Point",
        0.2,
        1.0,
        PointSource::Inline(vec![[0.1, 0.9]]),
    );
    test.expected = known_answer(vec![vec![]]);
    test
}

/// Two points about 0.158 apart
pub fn close_pair_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Close Pair",
        0.2,
        1.0,
        PointSource::Inline(vec![[0.6, 0.8], [0.55, 0.65]]),
    );
    test.expected = known_answer(vec![vec![1], vec![0]]);
    test
}

/// Two points about 0.36 apart
pub fn distant_pair_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Distant Pair",
        0.2,
        1.0,
        PointSource::Inline(vec![[0.4, 0.1], [0.7, 0.3]]),
    );
    test.expected = known_answer(vec![vec![], vec![]]);
    test
}

/// A chain where the middle point neighbors both ends
pub fn chain_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Three Point Chain",
        0.2,
        1.0,
        PointSource::Inline(vec![[0.18, 0.2], [0.35, 0.15], [0.4, 0.1]]),
    );
    test.expected = known_answer(vec![vec![1], vec![0, 2], vec![1]]);
    test
}

/// Two separate groups
pub fn five_point_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Five Points",
        0.2,
        1.0,
        PointSource::Inline(vec![
            [0.18, 0.2],
            [0.35, 0.15],
            [0.4, 0.1],
            [0.7, 0.3],
            [0.85, 0.4],
        ]),
    );
    test.expected = known_answer(vec![vec![1], vec![0, 2], vec![1], vec![4], vec![3]]);
    test
}

/// Ten points read from the sample points file
pub fn ten_point_file_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Ten Points (file)",
        0.2,
        1.0,
        PointSource::File(project_path("configs/unit-square-points.json")),
    );
    test.expected = known_answer(vec![
        vec![1],
        vec![0, 2],
        vec![1],
        vec![4],
        vec![3],
        vec![6],
        vec![5],
        vec![8],
        vec![7],
        vec![],
    ]);
    test.expected.pair_count = Some(5);
    test.expected.parallel_workers = Some(2);
    test
}

/// Pairs exactly at the search radius are neighbors
pub fn exact_radius_test() -> ReferenceTest {
    // 3-4-5 triangle scaled to r = 0.5
    let mut test = ReferenceTest::new(
        "Exact Radius",
        0.5,
        1.0,
        PointSource::Inline(vec![[0.0, 0.0], [0.3, 0.4], [1.0, 1.0]]),
    );
    test.expected = known_answer(vec![vec![1], vec![0], vec![]]);
    test
}

/// Points on the domain edges, including the closed upper bound
pub fn boundary_points_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Boundary Points",
        0.2,
        1.0,
        PointSource::Inline(vec![[0.0, 0.0], [1.0, 1.0], [1.0, 0.9], [0.0, 1.0], [0.1, 1.0]]),
    );
    test.expected = known_answer(vec![vec![], vec![2], vec![1], vec![4], vec![3]]);
    test
}

/// Uniform scatter, small cells
pub fn uniform_scatter_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Uniform Scatter",
        0.05,
        1.0,
        PointSource::Uniform {
            seed: 42,
            count: 2_000,
        },
    );
    test.expected = differential(4);
    test
}

/// Dense clusters with many points per cell
pub fn clustered_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Clustered",
        0.1,
        1.0,
        PointSource::Clustered {
            seed: 7,
            count: 1_500,
            clusters: 5,
            spread: 0.08,
        },
    );
    test.expected = differential(3);
    test
}

/// Radius that does not divide the domain evenly
pub fn uneven_grid_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Uneven Grid",
        0.45,
        1.0,
        PointSource::Uniform {
            seed: 3,
            count: 400,
        },
    );
    test.expected = differential(2);
    test
}

/// Large domain with fractional cells per row
pub fn large_domain_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Large Domain",
        1.5,
        100.0,
        PointSource::Uniform {
            seed: 1234,
            count: 3_000,
        },
    );
    test.expected = differential(8);
    test
}

/// A point just outside the domain fails every index
pub fn out_of_domain_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Out of Domain",
        0.2,
        1.0,
        PointSource::Inline(vec![[0.5, 0.5], [0.2, 0.3], [1.0000001, 0.5]]),
    );
    test.expected.failure = Some(ExpectedFailure::PointOutOfDomain { index: 2 });
    test
}

/// Radius larger than the domain is rejected
pub fn invalid_radius_test() -> ReferenceTest {
    let mut test = ReferenceTest::new(
        "Invalid Radius",
        2.0,
        1.0,
        PointSource::Inline(vec![[0.5, 0.5]]),
    );
    test.expected.failure = Some(ExpectedFailure::InvalidConfiguration);
    test
}

/// Get all reference tests
pub fn all_tests() -> Vec<ReferenceTest> {
    vec![
        single_point_test(),
        close_pair_test(),
        distant_pair_test(),
        chain_test(),
        five_point_test(),
        ten_point_file_test(),
        exact_radius_test(),
        boundary_points_test(),
        uniform_scatter_test(),
        clustered_test(),
        uneven_grid_test(),
        large_domain_test(),
        out_of_domain_test(),
        invalid_radius_test(),
    ]
}
