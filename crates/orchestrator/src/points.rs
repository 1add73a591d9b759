//! Point file loading.
//!
//! A points file is a JSON array of `[x, y]` pairs; a point's index is its
//! position in the array.

use std::fs;
use std::path::Path;

use frnn_kernel::PointSet;

use crate::error::OrchestratorError;

/// Read a JSON points file into a [`PointSet`].
///
/// Coordinates are not checked against any domain here; that happens when a
/// search buckets the points.
pub fn load_points(path: impl AsRef<Path>) -> Result<PointSet, OrchestratorError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| OrchestratorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_points(&contents).map_err(|source| OrchestratorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the JSON body of a points file.
pub fn parse_points(json: &str) -> Result<PointSet, serde_json::Error> {
    let coords: Vec<[f64; 2]> = serde_json::from_str(json)?;
    Ok(PointSet::from_coords(&coords))
}
