//! Path utilities for platter configuration files

use std::path::PathBuf;

/// Get the platter configuration directory
///
/// Returns: `<config dir>/platter` (e.g. `~/.config/platter` on Linux)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("platter")
}

/// Get the default config file path for a given file name
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_platter() {
        assert!(default_config_dir().ends_with("platter"));
    }

    #[test]
    fn test_config_path_includes_filename() {
        let path = default_config_path("scratch.yaml");
        assert!(path.ends_with("platter/scratch.yaml"));
    }
}
