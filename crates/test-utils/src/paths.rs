//! Paths and scratch directories for tests.

use std::path::PathBuf;

/// Returns the workspace root directory (two levels above this crate).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path of a configuration file shipped in `config/`.
pub fn config_path(name: &str) -> PathBuf {
    workspace_root().join("config").join(name)
}

/// Creates a temporary directory for maps and downloads.
///
/// Removed when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    temp_test_dir_with_prefix("station_plots_")
}

/// Creates a temporary directory with a specific prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_shipped_plotter_config_exists() {
        assert!(config_path("plotter.yaml").is_file());
    }

    #[test]
    fn test_temp_test_dir_with_prefix() {
        let dir = temp_test_dir_with_prefix("metar_plot_");
        assert!(dir.path().exists());
        assert!(dir.path().to_string_lossy().contains("metar_plot_"));
    }
}
