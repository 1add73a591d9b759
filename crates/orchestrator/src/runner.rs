//! Search runner with query lifecycle
//!
//! This module provides the `SearchRunner`, which builds an index once from a
//! [`SearchConfig`] and then answers any number of queries against it,
//! keeping per-query statistics for status reporting.

use std::time::{Duration, Instant};

use frnn_kernel::{
    build_index, DirectGrid, Domain, IndexKind, NeighborIndex, NeighborRelation, PairStats,
    PointSet,
};

use crate::config::SearchConfig;
use crate::error::OrchestratorError;
use crate::parallel::evaluate_parallel;

/// How queries are executed.
enum Engine {
    /// Any index, evaluated on the calling thread
    Sequential(Box<dyn NeighborIndex + Send + Sync>),
    /// Direct grid, occupied cells split across a dedicated pool
    Parallel {
        grid: DirectGrid,
        pool: rayon::ThreadPool,
    },
}

/// Snapshot of a runner's progress
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerStatus {
    /// Search name from the configuration
    pub name: String,
    /// Index strategy in use
    pub index: IndexKind,
    /// Worker threads, 1 when sequential
    pub workers: usize,
    /// Number of successful queries
    pub queries_run: u64,
    /// Statistics of the most recent successful query
    pub last_stats: Option<PairStats>,
    /// Wall time of the most recent successful query
    pub last_duration: Option<Duration>,
}

/// Handle for running neighbor queries against a prebuilt index
pub struct SearchRunner {
    name: String,
    domain: Domain,
    engine: Engine,
    /// Points loaded alongside the configuration, if any
    points: Option<PointSet>,
    queries_run: u64,
    last_stats: Option<PairStats>,
    last_duration: Option<Duration>,
}

impl SearchRunner {
    /// Build the index described by `config`
    ///
    /// With `workers` set, a rayon pool of that size is created and the direct
    /// grid is evaluated in parallel; otherwise the configured index runs
    /// sequentially.
    pub fn new(config: &SearchConfig) -> Result<Self, OrchestratorError> {
        config.validate()?;
        let domain = config.domain()?;

        let engine = match config.workers {
            Some(workers) => {
                tracing::info!("Building direct grid with {} workers", workers);
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("frnn-worker-{i}"))
                    .build()?;
                Engine::Parallel {
                    grid: DirectGrid::new(&domain, config.epsilon)?,
                    pool,
                }
            }
            None => {
                tracing::info!("Building {} index", config.index.name());
                Engine::Sequential(build_index(config.index, &domain, config.epsilon)?)
            }
        };

        tracing::info!(
            "Index ready: {} cells per row, {} cells, radius {}",
            domain.cells_per_row(),
            domain.total_cells(),
            domain.search_radius()
        );

        Ok(Self {
            name: config.name.clone(),
            domain,
            engine,
            points: None,
            queries_run: 0,
            last_stats: None,
            last_duration: None,
        })
    }

    /// Attach a point set to be searched by [`SearchRunner::run_loaded`]
    pub fn with_points(mut self, points: PointSet) -> Self {
        self.points = Some(points);
        self
    }

    /// Search name from the configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid geometry of the index
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Index strategy in use
    pub fn kind(&self) -> IndexKind {
        match &self.engine {
            Engine::Sequential(index) => index.kind(),
            Engine::Parallel { grid, .. } => grid.kind(),
        }
    }

    /// Worker threads used per query
    pub fn workers(&self) -> usize {
        match &self.engine {
            Engine::Sequential(_) => 1,
            Engine::Parallel { pool, .. } => pool.current_num_threads(),
        }
    }

    /// Points attached with [`SearchRunner::with_points`]
    pub fn points(&self) -> Option<&PointSet> {
        self.points.as_ref()
    }

    /// Current progress snapshot
    pub fn status(&self) -> RunnerStatus {
        RunnerStatus {
            name: self.name.clone(),
            index: self.kind(),
            workers: self.workers(),
            queries_run: self.queries_run,
            last_stats: self.last_stats,
            last_duration: self.last_duration,
        }
    }

    /// Compute the neighbor relation of `points`
    ///
    /// A failed query leaves the runner's counters untouched.
    pub fn run(&mut self, points: &PointSet) -> Result<NeighborRelation, OrchestratorError> {
        let start = Instant::now();

        let relation = match &self.engine {
            Engine::Sequential(index) => index.search(points)?,
            Engine::Parallel { grid, pool } => {
                let buckets = grid.bucketize(points)?;
                evaluate_parallel(
                    pool,
                    &self.domain,
                    grid.adjacency(),
                    &buckets,
                    points,
                    grid.epsilon(),
                )?
            }
        };

        let elapsed = start.elapsed();
        let stats = relation.stats();
        self.queries_run += 1;
        self.last_stats = Some(stats);
        self.last_duration = Some(elapsed);

        tracing::debug!(
            "Query {}: {} points, {} occupied cells, {} cell pairs, {}/{} pairs accepted, {:.3}ms",
            self.queries_run,
            points.len(),
            stats.occupied_cells,
            stats.cell_pairs,
            stats.accepted_pairs,
            stats.candidate_pairs,
            elapsed.as_secs_f64() * 1000.0
        );

        Ok(relation)
    }

    /// Search the attached point set
    pub fn run_loaded(&mut self) -> Result<NeighborRelation, OrchestratorError> {
        let points = self.points.take().ok_or_else(|| {
            OrchestratorError::invalid(format!("search '{}' has no points loaded", self.name))
        })?;
        let result = self.run(&points);
        self.points = Some(points);
        result
    }
}
