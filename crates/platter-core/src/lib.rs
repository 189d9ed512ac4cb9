//! Platter Core - Turntable scratch emulation engine
//!
//! Captures a deck's program signal into a ring buffer and plays it back at
//! any signed rate, the way a hand moves a record under the needle.

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use error::{ScratchError, ScratchResult};
pub use types::*;
