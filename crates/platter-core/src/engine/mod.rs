//! Scratch engine - capture, playback and the control plane
//!
//! - Ring buffer: fixed-length per-deck record of the live signal
//! - Capture unit: transparent tap writing the program signal into the ring
//! - Playback unit: variable-rate Hermite scrubber over the ring
//! - Rate smoother and zero-crossing fader used by playback
//! - ScratchEngine: owns the buffers and routes control messages

mod capture;
mod command;
mod engine;
mod fader;
mod interpolate;
mod playback;
mod ring;
mod smoother;
mod store;

pub use capture::*;
pub use command::*;
pub use engine::*;
pub use fader::*;
pub use interpolate::*;
pub use playback::*;
pub use ring::*;
pub use smoother::*;
pub use store::*;
