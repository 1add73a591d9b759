//! Sample configuration files
//!
//! Every file under `configs/` must load, validate, and build a runner; the
//! unit-square searches must reproduce the known ten-point answer.

use std::path::PathBuf;

use frnn_kernel::IndexKind;
use frnn_orchestrator::{create_search, OrchestratorError, SearchConfig};

/// Absolute path of a file in the workspace `configs/` directory
fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs")
        .join(name)
}

fn ten_point_answer() -> Vec<Vec<usize>> {
    vec![
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
    ]
}

#[test]
fn test_unit_square_configs_reproduce_ten_points() {
    for (file, kind, workers) in [
        ("unit-square.json", IndexKind::DirectGrid, 1),
        ("unit-square-hashed.json", IndexKind::HashedGrid, 1),
        ("unit-square-parallel.json", IndexKind::DirectGrid, 4),
    ] {
        let mut runner = create_search(config_path(file)).unwrap();
        assert_eq!(runner.kind(), kind, "{file}");
        assert_eq!(runner.workers(), workers, "{file}");
        assert_eq!(runner.points().map(|p| p.len()), Some(10), "{file}");

        let relation = runner.run_loaded().unwrap();
        assert_eq!(relation.to_sorted_lists(), ten_point_answer(), "{file}");
    }
}

#[test]
fn test_large_domain_config() {
    let config = SearchConfig::load(config_path("large-domain.json")).unwrap();
    assert_eq!(config.index, IndexKind::DirectGrid);
    assert_eq!(config.workers, Some(8));

    let domain = config.domain().unwrap();
    assert_eq!(domain.cells_per_row(), 67);

    let mut runner = create_search(config_path("large-domain.json")).unwrap();
    assert!(runner.points().is_none());
    assert!(matches!(runner.run_loaded(), Err(OrchestratorError::Invalid(_))));
}

#[test]
fn test_missing_points_file_is_reported() {
    let dir = std::env::temp_dir().join(format!("frnn-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("dangling.json");
    std::fs::write(
        &path,
        r#"{ "name": "dangling", "search_radius": 0.2, "domain_size": 1.0, "points_file": "nope.json" }"#,
    )
    .unwrap();

    let err = create_search(&path).err().unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
    assert!(matches!(err, OrchestratorError::Io { .. }), "{err}");
}
