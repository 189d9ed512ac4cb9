//! Configuration for the scratch engine
//!
//! - Generic YAML config loading/saving
//! - Default config locations
//! - [`ScratchConfig`]: buffer length, smoothing, fade and telemetry settings
//!
//! # Usage
//!
//! ```ignore
//! use platter_core::config::{default_config_path, load_config, ScratchConfig};
//!
//! let config: ScratchConfig = load_config(&default_config_path("scratch.yaml"));
//! let config = config.validated();
//! ```

mod io;
mod paths;
mod scratch;

pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path};
pub use scratch::{
    RateSource, ScratchConfig, DEFAULT_BUFFER_SECONDS, DEFAULT_DEAD_ZONE, DEFAULT_FADE_SAMPLES,
    DEFAULT_SMOOTHING_MS, DEFAULT_TELEMETRY_INTERVAL_MS, MIN_BUFFER_FRAMES,
};

/// Default config file name
pub const CONFIG_FILENAME: &str = "scratch.yaml";
