//! Orchestration Layer
//!
//! This crate wraps the neighbor search kernel for applications:
//! - JSON configuration parsing and validation
//! - Point file loading
//! - Search runner with query lifecycle and statistics
//! - Parallel evaluation of the direct grid on a rayon pool

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod parallel;
pub mod points;
pub mod runner;

pub use config::SearchConfig;
pub use error::OrchestratorError;
pub use parallel::evaluate_parallel;
pub use points::load_points;
pub use runner::{RunnerStatus, SearchRunner};

use std::path::Path;

/// Create a ready-to-query search from a configuration file
///
/// This function performs the full setup pipeline:
/// 1. Load and validate the configuration
/// 2. Build the index (and worker pool, if requested)
/// 3. Load the points file, if the configuration names one
///
/// # Arguments
/// * `config_path` - Path to the JSON configuration file
///
/// # Returns
/// A `SearchRunner` ready to be queried, or an error if setup fails
///
/// # Example
/// ```no_run
/// use frnn_orchestrator::create_search;
///
/// let mut runner = create_search("configs/unit-square.json")?;
/// let relation = runner.run_loaded()?;
/// println!("{} neighbor pairs", relation.pair_count());
/// # Ok::<(), frnn_orchestrator::OrchestratorError>(())
/// ```
pub fn create_search(config_path: impl AsRef<Path>) -> Result<SearchRunner, OrchestratorError> {
    let config_path = config_path.as_ref();
    tracing::info!("Creating search from config: {}", config_path.display());

    // 1. Load and validate configuration
    let config = SearchConfig::load(config_path)?;
    tracing::info!("Configuration loaded: {}", config.name);

    // 2. Build the index
    let runner = SearchRunner::new(&config)?;

    // 3. Resolve points file relative to config file directory
    let Some(points_file) = &config.points_file else {
        tracing::info!("Search ready, no points file configured");
        return Ok(runner);
    };
    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let points_path = config_dir.join(points_file);

    tracing::info!("Loading points: {}", points_path.display());
    let points = load_points(&points_path)?;
    tracing::info!("Loaded {} points", points.len());

    Ok(runner.with_points(points))
}
