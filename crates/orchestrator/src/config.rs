//! Configuration parsing and validation for neighbor searches

use std::fs;
use std::path::Path;

use frnn_kernel::{Domain, IndexKind, DEFAULT_EPSILON};
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Main search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Human-readable search name
    pub name: String,
    /// Which index strategy to build
    #[serde(default)]
    pub index: IndexKind,
    /// Neighbor search radius (also the grid cell width)
    pub search_radius: f64,
    /// Side length of the square domain `[0, domain_size]²`
    pub domain_size: f64,
    /// Acceptance tolerance for `d² - r² < epsilon`
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Worker threads for parallel evaluation; sequential when absent
    #[serde(default)]
    pub workers: Option<usize>,
    /// Optional JSON points file, relative to the config file
    #[serde(default)]
    pub points_file: Option<String>,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

impl SearchConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| OrchestratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: SearchConfig =
            serde_json::from_str(&contents).map_err(|source| OrchestratorError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        // Radius and domain size must form a usable grid
        self.domain()?;

        // Check tolerance
        if !self.epsilon.is_finite() {
            return Err(OrchestratorError::invalid("epsilon must be finite"));
        }

        // Check worker count
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(OrchestratorError::invalid("workers must be at least 1"));
            }
            if self.index != IndexKind::DirectGrid {
                return Err(OrchestratorError::invalid(format!(
                    "parallel evaluation requires the direct grid, got {}",
                    self.index.name()
                )));
            }
        }

        // Check points file
        if let Some(points_file) = &self.points_file {
            if points_file.trim().is_empty() {
                return Err(OrchestratorError::invalid("points_file must not be empty"));
            }
        }

        Ok(())
    }

    /// Grid geometry described by this configuration
    pub fn domain(&self) -> Result<Domain, OrchestratorError> {
        Ok(Domain::new(self.search_radius, self.domain_size)?)
    }
}
