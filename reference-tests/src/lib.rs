//! Reference test framework for neighbor search validation
//!
//! This crate runs known-answer and randomized scenarios through every index
//! strategy and checks the results against exact expectations, the
//! brute-force oracle, and the structural properties every neighbor relation
//! must have.

#[cfg(test)]
mod tests;

pub mod scenarios;

use std::time::{Duration, Instant};

use frnn_kernel::{IndexKind, NeighborRelation, PairStats, PointSet, SearchError, DEFAULT_EPSILON};
use frnn_orchestrator::{load_points, OrchestratorError, SearchConfig, SearchRunner};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Where a reference test gets its points
#[derive(Debug, Clone)]
pub enum PointSource {
    /// Literal coordinates
    Inline(Vec<[f64; 2]>),
    /// JSON points file
    File(String),
    /// Uniform scatter over the whole domain
    Uniform {
        /// RNG seed
        seed: u64,
        /// Number of points
        count: usize,
    },
    /// Points grouped around random centers
    Clustered {
        /// RNG seed
        seed: u64,
        /// Number of points
        count: usize,
        /// Number of cluster centers
        clusters: usize,
        /// Maximum offset from a center along each axis
        spread: f64,
    },
}

impl PointSource {
    /// Produce the point set for a domain of side `domain_size`
    pub fn materialize(&self, domain_size: f64) -> Result<PointSet, OrchestratorError> {
        match self {
            PointSource::Inline(coords) => Ok(PointSet::from_coords(coords)),
            PointSource::File(path) => load_points(path),
            PointSource::Uniform { seed, count } => {
                let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                Ok((0..*count)
                    .map(|_| {
                        (
                            rng.random_range(0.0..=domain_size),
                            rng.random_range(0.0..=domain_size),
                        )
                    })
                    .collect())
            }
            PointSource::Clustered {
                seed,
                count,
                clusters,
                spread,
            } => {
                let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                let centers: Vec<(f64, f64)> = (0..(*clusters).max(1))
                    .map(|_| {
                        (
                            rng.random_range(0.0..=domain_size),
                            rng.random_range(0.0..=domain_size),
                        )
                    })
                    .collect();
                Ok((0..*count)
                    .map(|k| {
                        let (cx, cy) = centers[k % centers.len()];
                        let dx = rng.random_range(-spread..=*spread);
                        let dy = rng.random_range(-spread..=*spread);
                        (
                            (cx + dx).clamp(0.0, domain_size),
                            (cy + dy).clamp(0.0, domain_size),
                        )
                    })
                    .collect())
            }
        }
    }
}

/// Failure a reference test expects every index to report
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedFailure {
    /// Radius and domain size cannot form a grid
    InvalidConfiguration,
    /// The point at `index` lies outside the domain
    PointOutOfDomain {
        /// Offending point
        index: usize,
    },
}

/// Expected result criteria for a reference test
#[derive(Debug, Clone, Default)]
pub struct ExpectedResult {
    /// Exact neighbor lists, sorted ascending, one per point
    pub neighbors: Option<Vec<Vec<usize>>>,
    /// Exact number of unordered neighbor pairs
    pub pair_count: Option<usize>,
    /// Every index must satisfy symmetry and irreflexivity
    pub structural: bool,
    /// Grid indexes must agree with the brute-force oracle
    pub oracle_agreement: bool,
    /// Repeated queries must give identical sorted lists
    pub determinism: bool,
    /// Parallel direct grid with this many workers must match sequential
    pub parallel_workers: Option<usize>,
    /// The search must fail this way instead of producing a relation
    pub failure: Option<ExpectedFailure>,
}

/// Result of running a reference test
#[derive(Debug)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Whether test passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Number of points searched
    pub point_count: usize,
    /// Neighbor pairs found by the direct grid
    pub pair_count: usize,
    /// Direct grid statistics
    pub stats: Option<PairStats>,
    /// Wall time for all searches of this test
    pub elapsed: Duration,
}

/// Result of an individual validation check
#[derive(Debug)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    fn pass(name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message,
        }
    }

    fn fail(name: impl Into<String>, message: String) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: Some(message),
        }
    }
}

/// A reference test case
#[derive(Debug, Clone)]
pub struct ReferenceTest {
    /// Test name
    pub name: String,
    /// Neighbor search radius
    pub search_radius: f64,
    /// Side length of the square domain
    pub domain_size: f64,
    /// Acceptance tolerance
    pub epsilon: f64,
    /// Input points
    pub points: PointSource,
    /// Expected results to validate
    pub expected: ExpectedResult,
}

impl ReferenceTest {
    /// A test on `points` with the default tolerance and no expectations yet
    pub fn new(name: &str, search_radius: f64, domain_size: f64, points: PointSource) -> Self {
        Self {
            name: name.to_string(),
            search_radius,
            domain_size,
            epsilon: DEFAULT_EPSILON,
            points,
            expected: ExpectedResult::default(),
        }
    }

    /// Search configuration for one index strategy
    fn config(&self, index: IndexKind, workers: Option<usize>) -> SearchConfig {
        SearchConfig {
            name: self.name.clone(),
            index,
            search_radius: self.search_radius,
            domain_size: self.domain_size,
            epsilon: self.epsilon,
            workers,
            points_file: None,
        }
    }

    /// Run one search, building a fresh runner
    fn search(
        &self,
        index: IndexKind,
        workers: Option<usize>,
        points: &PointSet,
    ) -> Result<NeighborRelation, OrchestratorError> {
        SearchRunner::new(&self.config(index, workers))?.run(points)
    }

    /// Run the reference test and return results
    ///
    /// Errors are reserved for setup failures (unreadable point files); search
    /// failures become failed checks.
    pub fn run(&self) -> Result<TestResult, OrchestratorError> {
        tracing::info!("Running reference test: {}", self.name);
        let start = Instant::now();

        let points = self.points.materialize(self.domain_size)?;
        tracing::info!(
            "Initialized: {} points, r={}, domain={}",
            points.len(),
            self.search_radius,
            self.domain_size
        );

        let mut checks = Vec::new();

        // Expected failures short-circuit everything else
        if let Some(ref failure) = self.expected.failure {
            for kind in IndexKind::ALL {
                checks.push(validate_failure(kind, failure, self.search(kind, None, &points)));
            }
            return Ok(self.finish(checks, points.len(), None, start));
        }

        // Run every index strategy once
        let mut relations = Vec::with_capacity(IndexKind::ALL.len());
        for kind in IndexKind::ALL {
            match self.search(kind, None, &points) {
                Ok(relation) => relations.push((kind, relation)),
                Err(e) => checks.push(CheckResult::fail(
                    format!("Search ({})", kind.name()),
                    e.to_string(),
                )),
            }
        }

        // Check exact neighbor lists
        if let Some(ref expected) = self.expected.neighbors {
            for (kind, relation) in &relations {
                checks.push(validate_neighbors(*kind, relation, expected));
            }
        }

        // Check pair count
        if let Some(expected) = self.expected.pair_count {
            for (kind, relation) in &relations {
                checks.push(validate_pair_count(*kind, relation, expected));
            }
        }

        // Check symmetry and irreflexivity
        if self.expected.structural {
            for (kind, relation) in &relations {
                checks.push(validate_structure(*kind, relation));
            }
        }

        // Check agreement with brute force
        if self.expected.oracle_agreement {
            if let Some((_, oracle)) = relations.iter().find(|(k, _)| *k == IndexKind::BruteForce) {
                for (kind, relation) in relations.iter().filter(|(k, _)| *k != IndexKind::BruteForce) {
                    checks.push(validate_oracle(*kind, relation, oracle));
                }
            }
        }

        let direct = relations
            .iter()
            .find(|(k, _)| *k == IndexKind::DirectGrid)
            .map(|(_, r)| r);

        // Check determinism
        if self.expected.determinism {
            if let Some(first) = direct {
                let second = self.search(IndexKind::DirectGrid, None, &points);
                checks.push(validate_determinism(first, second));
            }
        }

        // Check parallel evaluation
        if let (Some(workers), Some(sequential)) = (self.expected.parallel_workers, direct) {
            let parallel = self.search(IndexKind::DirectGrid, Some(workers), &points);
            checks.push(validate_parallel(workers, sequential, parallel));
        }

        let stats = direct.map(|r| r.stats());
        Ok(self.finish(checks, points.len(), stats, start))
    }

    fn finish(
        &self,
        checks: Vec<CheckResult>,
        point_count: usize,
        stats: Option<PairStats>,
        start: Instant,
    ) -> TestResult {
        let passed = !checks.is_empty() && checks.iter().all(|c| c.passed);
        let elapsed = start.elapsed();
        tracing::info!(
            "Reference test {} {} in {:.3}s",
            self.name,
            if passed { "passed" } else { "failed" },
            elapsed.as_secs_f64()
        );
        TestResult {
            name: self.name.clone(),
            passed,
            checks,
            point_count,
            pair_count: stats.map(|s| s.accepted_pairs).unwrap_or(0),
            stats,
            elapsed,
        }
    }
}

/// Validate that the search failed the expected way
fn validate_failure(
    kind: IndexKind,
    expected: &ExpectedFailure,
    outcome: Result<NeighborRelation, OrchestratorError>,
) -> CheckResult {
    let name = format!("Expected Failure ({})", kind.name());
    let matched = match (&outcome, expected) {
        (
            Err(OrchestratorError::Search(SearchError::InvalidConfiguration { .. })),
            ExpectedFailure::InvalidConfiguration,
        ) => true,
        (
            Err(OrchestratorError::Search(SearchError::PointOutOfDomain { index, .. })),
            ExpectedFailure::PointOutOfDomain { index: want },
        ) => index == want,
        _ => false,
    };

    match outcome {
        Err(e) if matched => CheckResult::pass(name, Some(e.to_string())),
        Err(e) => CheckResult::fail(name, format!("Expected {expected:?}, got error: {e}")),
        Ok(relation) => CheckResult::fail(
            name,
            format!(
                "Expected {expected:?}, got a relation with {} pairs",
                relation.pair_count()
            ),
        ),
    }
}

/// Validate exact neighbor lists
fn validate_neighbors(
    kind: IndexKind,
    relation: &NeighborRelation,
    expected: &[Vec<usize>],
) -> CheckResult {
    let name = format!("Neighbors ({})", kind.name());
    let actual = relation.to_sorted_lists();
    if actual == expected {
        return CheckResult::pass(name, None);
    }
    if actual.len() != expected.len() {
        return CheckResult::fail(
            name,
            format!("Expected {} entries, got {}", expected.len(), actual.len()),
        );
    }
    let mismatches: Vec<String> = actual
        .iter()
        .zip(expected)
        .enumerate()
        .filter(|(_, (a, e))| a != e)
        .map(|(i, (a, e))| format!("point {i}: expected {e:?}, got {a:?}"))
        .collect();
    CheckResult::fail(name, mismatches.join("; "))
}

/// Validate the number of unordered pairs
fn validate_pair_count(kind: IndexKind, relation: &NeighborRelation, expected: usize) -> CheckResult {
    let name = format!("Pair Count ({})", kind.name());
    let actual = relation.pair_count();
    if actual == expected {
        CheckResult::pass(name, Some(format!("{actual} pairs")))
    } else {
        CheckResult::fail(name, format!("Expected {expected} pairs, got {actual}"))
    }
}

/// Validate symmetry and irreflexivity
fn validate_structure(kind: IndexKind, relation: &NeighborRelation) -> CheckResult {
    let name = format!("Structure ({})", kind.name());
    let symmetric = relation.is_symmetric();
    let irreflexive = relation.is_irreflexive();

    if symmetric && irreflexive {
        CheckResult::pass(name, None)
    } else {
        let mut issues = Vec::new();
        if !symmetric {
            issues.push("not symmetric");
        }
        if !irreflexive {
            issues.push("lists a point as its own neighbor");
        }
        CheckResult::fail(name, issues.join(", "))
    }
}

/// Validate agreement with the brute-force oracle
fn validate_oracle(
    kind: IndexKind,
    relation: &NeighborRelation,
    oracle: &NeighborRelation,
) -> CheckResult {
    let name = format!("Oracle Agreement ({})", kind.name());
    if relation.same_neighbors(oracle) {
        let tested = relation.stats().candidate_pairs;
        let exhaustive = oracle.stats().candidate_pairs.max(1);
        return CheckResult::pass(
            name,
            Some(format!(
                "{} pairs, {:.1}% of exhaustive candidates tested",
                relation.pair_count(),
                100.0 * tested as f64 / exhaustive as f64
            )),
        );
    }

    let actual = relation.to_sets();
    let expected = oracle.to_sets();
    let mut missing = 0;
    let mut extra = 0;
    for (a, e) in actual.iter().zip(&expected) {
        missing += e.difference(a).count();
        extra += a.difference(e).count();
    }
    CheckResult::fail(
        name,
        format!("{missing} missing and {extra} extra neighbor entries vs brute force"),
    )
}

/// Validate that a repeated query gives the same answer
fn validate_determinism(
    first: &NeighborRelation,
    second: Result<NeighborRelation, OrchestratorError>,
) -> CheckResult {
    let name = "Determinism";
    match second {
        Ok(second) if second.to_sorted_lists() == first.to_sorted_lists() => {
            CheckResult::pass(name, None)
        }
        Ok(_) => CheckResult::fail(name, "Repeated query changed the result".to_string()),
        Err(e) => CheckResult::fail(name, format!("Repeated query failed: {e}")),
    }
}

/// Validate parallel evaluation against the sequential direct grid
fn validate_parallel(
    workers: usize,
    sequential: &NeighborRelation,
    parallel: Result<NeighborRelation, OrchestratorError>,
) -> CheckResult {
    let name = format!("Parallel ({workers} workers)");
    match parallel {
        Ok(parallel) if parallel.same_neighbors(sequential) => {
            if parallel.stats() == sequential.stats() {
                CheckResult::pass(name, None)
            } else {
                CheckResult::fail(
                    name,
                    format!(
                        "Same neighbors but stats differ: {:?} vs {:?}",
                        parallel.stats(),
                        sequential.stats()
                    ),
                )
            }
        }
        Ok(parallel) => CheckResult::fail(
            name,
            format!(
                "Expected {} pairs, got {}",
                sequential.pair_count(),
                parallel.pair_count()
            ),
        ),
        Err(e) => CheckResult::fail(name, format!("Parallel query failed: {e}")),
    }
}

impl TestResult {
    /// Print a summary of the test result
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Test: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("Status: {}", if self.passed { "PASSED" } else { "FAILED" });
        println!("Points: {}", self.point_count);
        println!("Elapsed: {:.3} s", self.elapsed.as_secs_f64());
        if let Some(stats) = self.stats {
            println!("\nDirect Grid Statistics:");
            println!("  Occupied cells: {}", stats.occupied_cells);
            println!("  Cell pairs scanned: {}", stats.cell_pairs);
            println!("  Candidate pairs: {}", stats.candidate_pairs);
            println!("  Accepted pairs: {}", stats.accepted_pairs);
        }
        println!("\nValidation Checks:");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            print!("  [{}] {}", status, check.name);
            if let Some(ref msg) = check.message {
                print!(" - {}", msg);
            }
            println!();
        }
        println!("{}", "=".repeat(80));
    }
}
