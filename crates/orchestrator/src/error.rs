//! Error type for configuration loading and query execution.

use std::path::PathBuf;

use frnn_kernel::SearchError;
use thiserror::Error;

/// Everything that can go wrong between a config file and a neighbor relation.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A config or points file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A config or points file is not valid JSON for its schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but describes an unusable search.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The kernel rejected the domain, the index build, or the points.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The worker pool for parallel evaluation could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl OrchestratorError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}
