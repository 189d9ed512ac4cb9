//! YAML persistence for configuration structs
//!
//! Reading never fails: a missing or malformed file falls back to
//! `T::default()`.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read `path` as YAML, or defaults if it is missing or unreadable
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No config at {:?}, using defaults", path);
            return T::default();
        }
        Err(e) => {
            log::warn!("Cannot read {:?} ({}), using defaults", path, e);
            return T::default();
        }
    };

    serde_yaml::from_str(&contents).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed config {:?}: {}", path, e);
        T::default()
    })
}

/// Write `config` to `path` as YAML, creating missing directories
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Serializing config")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Creating {:?}", dir))?;
    }
    std::fs::write(path, yaml).with_context(|| format!("Writing {:?}", path))?;
    log::info!("Saved config to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RateSource, ScratchConfig};

    #[test]
    fn test_load_nonexistent_returns_default() {
        let config: ScratchConfig = load_config(Path::new("/nonexistent/path/scratch.yaml"));
        assert_eq!(config, ScratchConfig::default());
    }

    #[test]
    fn test_load_garbage_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.yaml");
        std::fs::write(&path, "buffer_seconds: [not, a, number]").unwrap();

        let config: ScratchConfig = load_config(&path);
        assert_eq!(config, ScratchConfig::default());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scratch.yaml");

        let config = ScratchConfig {
            buffer_seconds: 12.5,
            fade_samples: 96,
            rate_source: RateSource::Lane,
            ..Default::default()
        };

        save_config(&config, &path).unwrap();
        let loaded: ScratchConfig = load_config(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.yaml");
        std::fs::write(&path, "smoothing_ms: 2.0\nrate_source: lane\n").unwrap();

        let config: ScratchConfig = load_config(&path);
        assert_eq!(config.smoothing_ms, 2.0);
        assert_eq!(config.rate_source, RateSource::Lane);
        assert_eq!(config.fade_samples, ScratchConfig::default().fade_samples);
    }
}
