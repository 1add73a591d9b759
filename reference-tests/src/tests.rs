//! Reference test integration tests
//!
//! These tests run the reference scenarios via cargo test, plus checks that
//! the validators themselves catch wrong answers.

use crate::scenarios::*;
use crate::{ExpectedFailure, ExpectedResult, PointSource, ReferenceTest, TestResult};

fn run_and_report(test: ReferenceTest) -> TestResult {
    let result = test.run().expect("Reference test setup failed");
    result.print_summary();
    result
}

fn assert_passes(test: ReferenceTest) {
    let result = run_and_report(test);
    for check in &result.checks {
        assert!(
            check.passed,
            "{}: check '{}' failed: {:?}",
            result.name, check.name, check.message
        );
    }
    assert!(result.passed, "{} should pass", result.name);
}

#[test]
fn test_single_point() {
    assert_passes(single_point_test());
}

#[test]
fn test_close_pair() {
    assert_passes(close_pair_test());
}

#[test]
fn test_distant_pair() {
    assert_passes(distant_pair_test());
}

#[test]
fn test_three_point_chain() {
    assert_passes(chain_test());
}

#[test]
fn test_five_points() {
    assert_passes(five_point_test());
}

#[test]
fn test_ten_points_from_file() {
    let result = run_and_report(ten_point_file_test());
    assert!(result.passed);
    assert_eq!(result.point_count, 10);
    assert_eq!(result.pair_count, 5);
}

#[test]
fn test_exact_radius() {
    assert_passes(exact_radius_test());
}

#[test]
fn test_boundary_points() {
    assert_passes(boundary_points_test());
}

#[test]
fn test_uniform_scatter() {
    assert_passes(uniform_scatter_test());
}

#[test]
fn test_clustered() {
    assert_passes(clustered_test());
}

#[test]
fn test_uneven_grid() {
    assert_passes(uneven_grid_test());
}

#[test]
fn test_large_domain() {
    assert_passes(large_domain_test());
}

#[test]
fn test_out_of_domain() {
    let result = run_and_report(out_of_domain_test());
    assert!(result.passed);
    assert_eq!(result.checks.len(), 3);
    assert!(result.stats.is_none());
}

#[test]
fn test_invalid_radius() {
    assert_passes(invalid_radius_test());
}

#[test]
fn test_wrong_expectation_is_caught() {
    let mut test = chain_test();
    test.expected.neighbors = Some(vec![vec![1], vec![0], vec![]]);
    let result = run_and_report(test);
    assert!(!result.passed);
    let failed: Vec<_> = result.checks.iter().filter(|c| !c.passed).collect();
    // one per index strategy
    assert_eq!(failed.len(), 3);
    assert!(failed[0]
        .message
        .as_deref()
        .is_some_and(|m| m.contains("point 1")));
}

#[test]
fn test_unexpected_success_is_caught() {
    let mut test = close_pair_test();
    test.expected = ExpectedResult {
        failure: Some(ExpectedFailure::PointOutOfDomain { index: 0 }),
        ..ExpectedResult::default()
    };
    let result = run_and_report(test);
    assert!(!result.passed);
}

#[test]
fn test_no_checks_does_not_pass() {
    let test = ReferenceTest::new("Empty", 0.2, 1.0, PointSource::Inline(vec![]));
    assert!(!run_and_report(test).passed);
}

#[test]
fn test_missing_points_file_is_a_setup_error() {
    let test = ReferenceTest::new(
        "Missing File",
        0.2,
        1.0,
        PointSource::File(project_path("configs/does-not-exist.json")),
    );
    assert!(test.run().is_err());
}

#[test]
fn test_random_sources_are_reproducible() {
    let source = PointSource::Clustered {
        seed: 5,
        count: 100,
        clusters: 3,
        spread: 0.05,
    };
    let a = source.materialize(1.0).unwrap();
    let b = source.materialize(1.0).unwrap();
    assert_eq!(a.xs(), b.xs());
    assert_eq!(a.ys(), b.ys());
    assert!(a.iter().all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
}

#[test]
fn test_all_tests_registered() {
    let names: Vec<String> = all_tests().into_iter().map(|t| t.name).collect();
    assert_eq!(names.len(), 14);
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), names.len(), "duplicate scenario names");
}
