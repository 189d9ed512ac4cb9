//! Scratch engine configuration
//!
//! Buffer duration, smoothing time constant and fade length are fixed per
//! engine instance. They are read once when a deck is attached and never
//! negotiated per call.

use serde::{Deserialize, Serialize};

/// Default rolling window held by each deck
pub const DEFAULT_BUFFER_SECONDS: f64 = 45.0;

/// Default one-pole time constant for rate smoothing (milliseconds)
pub const DEFAULT_SMOOTHING_MS: f64 = 5.0;

/// Default zero-crossing fade length (~1ms at 48kHz)
pub const DEFAULT_FADE_SAMPLES: u32 = 48;

/// Default dead zone around zero for rate sign classification
pub const DEFAULT_DEAD_ZONE: f64 = 0.001;

/// Default telemetry period in audio time (milliseconds)
pub const DEFAULT_TELEMETRY_INTERVAL_MS: f64 = 50.0;

/// Smallest ring buffer we will allocate (the Hermite kernel spans 4 frames)
pub const MIN_BUFFER_FRAMES: usize = 4;

/// Which input drives the playback target rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// `SetRate` control messages drive the target; rate lanes are ignored
    #[default]
    Messages,
    /// A per-sample rate lane drives the target; `SetRate` messages are ignored
    Lane,
}

impl RateSource {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Messages => "Control messages",
            Self::Lane => "Sample-accurate lane",
        }
    }
}

/// Scratch engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Duration of the rolling capture window in seconds
    pub buffer_seconds: f64,
    /// Rate smoothing time constant in milliseconds (0 disables smoothing)
    pub smoothing_ms: f64,
    /// Length of the direction-reversal fade in samples (0 disables the fade)
    pub fade_samples: u32,
    /// Rates with magnitude at or below this count as stopped
    pub dead_zone: f64,
    /// How often each unit reports its cursor, in milliseconds of audio
    pub telemetry_interval_ms: f64,
    /// Authoritative rate input
    pub rate_source: RateSource,
    /// Capacity of each app → unit command queue
    pub command_queue_capacity: usize,
    /// Capacity of each unit → app telemetry queue
    pub telemetry_queue_capacity: usize,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            buffer_seconds: DEFAULT_BUFFER_SECONDS,
            smoothing_ms: DEFAULT_SMOOTHING_MS,
            fade_samples: DEFAULT_FADE_SAMPLES,
            dead_zone: DEFAULT_DEAD_ZONE,
            telemetry_interval_ms: DEFAULT_TELEMETRY_INTERVAL_MS,
            rate_source: RateSource::default(),
            command_queue_capacity: 64,
            telemetry_queue_capacity: 256,
        }
    }
}

/// Replace a non-finite value with the default, then clamp into range
fn sanitize(name: &str, value: f64, default: f64, min: f64, max: f64) -> f64 {
    let fixed = if value.is_finite() { value.clamp(min, max) } else { default };
    if fixed != value {
        log::warn!("ScratchConfig: {} = {} out of range, using {}", name, value, fixed);
    }
    fixed
}

impl ScratchConfig {
    /// Return a copy with every field clamped to a usable range
    pub fn validated(&self) -> Self {
        let fade_samples = self.fade_samples.min(48_000);
        if fade_samples != self.fade_samples {
            log::warn!("ScratchConfig: fade_samples = {} too long, using {}", self.fade_samples, fade_samples);
        }

        Self {
            buffer_seconds: sanitize("buffer_seconds", self.buffer_seconds, DEFAULT_BUFFER_SECONDS, 0.1, 600.0),
            smoothing_ms: sanitize("smoothing_ms", self.smoothing_ms, DEFAULT_SMOOTHING_MS, 0.0, 1000.0),
            fade_samples,
            dead_zone: sanitize("dead_zone", self.dead_zone, DEFAULT_DEAD_ZONE, 0.0, 0.5),
            telemetry_interval_ms: sanitize(
                "telemetry_interval_ms",
                self.telemetry_interval_ms,
                DEFAULT_TELEMETRY_INTERVAL_MS,
                1.0,
                10_000.0,
            ),
            rate_source: self.rate_source,
            command_queue_capacity: self.command_queue_capacity.max(1),
            telemetry_queue_capacity: self.telemetry_queue_capacity.max(1),
        }
    }

    /// Ring buffer capacity in frames for the given sample rate
    pub fn buffer_frames(&self, sample_rate: u32) -> usize {
        let frames = (sample_rate as f64 * self.buffer_seconds).round() as usize;
        frames.max(MIN_BUFFER_FRAMES)
    }

    /// One-pole coefficient `1 - exp(-1 / (tau * sample_rate))`
    ///
    /// A zero time constant yields 1.0 (the smoothed rate follows the target
    /// immediately).
    pub fn smoothing_alpha(&self, sample_rate: u32) -> f64 {
        let tau = self.smoothing_ms / 1000.0;
        if tau <= 0.0 || sample_rate == 0 {
            return 1.0;
        }
        1.0 - (-1.0 / (tau * sample_rate as f64)).exp()
    }

    /// Telemetry period in frames for the given sample rate (at least 1)
    pub fn telemetry_interval_frames(&self, sample_rate: u32) -> u32 {
        ((sample_rate as f64 * self.telemetry_interval_ms / 1000.0).round() as u32).max(1)
    }
}
