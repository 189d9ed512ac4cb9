//! Playback unit - scrubs a deck's ring buffer at an arbitrary signed rate
//!
//! Emulates a hand on a vinyl record: the read cursor moves forward, stops or
//! runs backwards at whatever rate the gesture layer commands, with
//! fractional positions resolved by cubic Hermite interpolation.
//!
//! ## Per-sample pipeline (while active)
//!
//! 1. Advance the one-pole rate smoother
//! 2. Feed the smoothed rate to the zero-crossing fader
//! 3. Move the read cursor by the smoothed rate and wrap it into the buffer
//! 4. Interpolate 4 neighbouring frames around the cursor
//! 5. Apply the fade gain
//!
//! Every step is O(1) with no allocation, whatever the rate.
//!
//! ## Rate input
//!
//! [`RateSource::Messages`]: `SetRate` drives the target and any rate lane is
//! ignored. [`RateSource::Lane`]: the lane passed to
//! [`process_with_rate_lane`](PlaybackUnit::process_with_rate_lane) drives the
//! target, `SetRate` is ignored, and blocks without lane values hold the last
//! one. Start, snap and stop work the same in both modes.

use crate::config::{RateSource, ScratchConfig};
use crate::types::{frames_mut, DeckId, Sample, StereoSample};

use super::command::{PlaybackCommand, Telemetry};
use super::fader::ZeroCrossingFader;
use super::interpolate::hermite_stereo;
use super::ring::{wrap_position, RingReader};
use super::smoother::RateSmoother;

/// Playback state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not scrubbing, output is silence
    #[default]
    Idle,
    /// Scrubbing the buffer
    Active,
}

/// Per-deck scratch playback processor (runs on the audio thread)
pub struct PlaybackUnit {
    deck: DeckId,
    reader: RingReader,
    commands: rtrb::Consumer<PlaybackCommand>,
    telemetry: rtrb::Producer<Telemetry>,
    state: PlaybackState,
    /// Fractional frame index, always in `[0, capacity)`
    read_cursor: f64,
    /// Cursor at the last start, for the stop report
    start_position: f64,
    smoother: RateSmoother,
    fader: ZeroCrossingFader,
    rate_source: RateSource,
    telemetry_interval: u32,
    frames_since_report: u32,
}

impl PlaybackUnit {
    pub fn new(
        reader: RingReader,
        commands: rtrb::Consumer<PlaybackCommand>,
        telemetry: rtrb::Producer<Telemetry>,
        config: &ScratchConfig,
    ) -> Self {
        let config = config.validated();
        let sample_rate = reader.ring().sample_rate();

        Self {
            deck: reader.ring().deck(),
            reader,
            commands,
            telemetry,
            state: PlaybackState::Idle,
            read_cursor: 0.0,
            start_position: 0.0,
            smoother: RateSmoother::new(config.smoothing_alpha(sample_rate)),
            fader: ZeroCrossingFader::new(config.fade_samples, config.dead_zone),
            rate_source: config.rate_source,
            telemetry_interval: config.telemetry_interval_frames(sample_rate),
            frames_since_report: 0,
        }
    }

    pub fn deck(&self) -> DeckId {
        self.deck
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == PlaybackState::Active
    }

    /// Current read cursor in frames
    pub fn read_position(&self) -> f64 {
        self.read_cursor
    }

    /// Cursor recorded at the last start
    pub fn start_position(&self) -> f64 {
        self.start_position
    }

    pub fn target_rate(&self) -> f64 {
        self.smoother.target()
    }

    pub fn smoothed_rate(&self) -> f64 {
        self.smoother.smoothed()
    }

    pub fn rate_source(&self) -> RateSource {
        self.rate_source
    }

    // ─────────────────────────────────────────────────────────────
    // State transitions
    // ─────────────────────────────────────────────────────────────

    /// Idle → Active at `position`, rate snapped to `rate` (no ramp-in)
    ///
    /// Non-finite arguments are ignored and the current state kept.
    pub fn start(&mut self, position: f64, rate: f64) {
        if !position.is_finite() || !rate.is_finite() {
            return;
        }
        self.read_cursor = wrap_position(position, self.reader.capacity());
        self.start_position = self.read_cursor;
        self.smoother.snap(rate);
        self.fader.reset(rate);
        self.frames_since_report = 0;
        self.state = PlaybackState::Active;
    }

    /// Start at the capture side's current write cursor
    pub fn start_from_write(&mut self, rate: f64) {
        let position = self.reader.write_position() as f64;
        self.start(position, rate);
    }

    /// Update the target rate (ignored when a rate lane is authoritative)
    pub fn set_rate(&mut self, rate: f64) {
        if self.rate_source == RateSource::Messages && rate.is_finite() {
            self.smoother.set_target(rate);
        }
    }

    /// Set target and smoothed rate together
    pub fn snap_rate(&mut self, rate: f64) {
        if rate.is_finite() {
            self.smoother.snap(rate);
        }
    }

    /// Active → Idle, returning the frames traversed since start
    ///
    /// Computed as `(start - cursor) mod capacity`, rounded. Any running fade
    /// is abandoned. Returns 0 if already idle.
    pub fn stop(&mut self) -> u64 {
        if self.state == PlaybackState::Idle {
            return 0;
        }
        self.state = PlaybackState::Idle;
        self.fader.cancel();

        let capacity = self.reader.capacity() as f64;
        let delta = (self.start_position - self.read_cursor).rem_euclid(capacity).round();
        (delta as u64) % self.reader.capacity() as u64
    }

    fn process_commands(&mut self) {
        while let Ok(cmd) = self.commands.pop() {
            match cmd {
                PlaybackCommand::Start { position, rate } => self.start(position, rate),
                PlaybackCommand::StartFromWrite { rate } => self.start_from_write(rate),
                PlaybackCommand::SetRate { rate } => self.set_rate(rate),
                PlaybackCommand::SnapRate { rate } => self.snap_rate(rate),
                PlaybackCommand::Stop => {
                    let frames_traversed = self.stop();
                    let _ = self.telemetry.push(Telemetry::Stopped {
                        deck: self.deck,
                        frames_traversed,
                    });
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Audio processing
    // ─────────────────────────────────────────────────────────────

    /// Render one block driven by control messages
    pub fn process(&mut self, output: &mut [StereoSample]) {
        self.render(output, None);
    }

    /// Render one block with a per-sample rate lane
    ///
    /// The lane only takes effect under [`RateSource::Lane`]. Samples past the
    /// end of the lane, and non-finite lane values, hold the previous target.
    pub fn process_with_rate_lane(&mut self, output: &mut [StereoSample], lane: &[f32]) {
        let lane = match self.rate_source {
            RateSource::Lane => Some(lane),
            RateSource::Messages => None,
        };
        self.render(output, lane);
    }

    /// Interleaved [L, R, L, R, ...] variant of [`process`](Self::process)
    pub fn process_interleaved(&mut self, output: &mut [Sample]) {
        if output.len() % 2 == 1 {
            output[output.len() - 1] = 0.0;
        }
        self.render(frames_mut(output), None);
    }

    /// Interleaved variant of [`process_with_rate_lane`](Self::process_with_rate_lane)
    pub fn process_interleaved_with_rate_lane(&mut self, output: &mut [Sample], lane: &[f32]) {
        if output.len() % 2 == 1 {
            output[output.len() - 1] = 0.0;
        }
        self.process_with_rate_lane(frames_mut(output), lane);
    }

    fn render(&mut self, output: &mut [StereoSample], lane: Option<&[f32]>) {
        self.process_commands();

        if self.state == PlaybackState::Idle {
            output.fill(StereoSample::silence());
            return;
        }

        let capacity = self.reader.capacity();

        for (i, out) in output.iter_mut().enumerate() {
            if let Some(&lane_rate) = lane.and_then(|l| l.get(i)) {
                if lane_rate.is_finite() {
                    self.smoother.set_target(lane_rate as f64);
                }
            }

            let rate = self.smoother.next_sample();
            let gain = self.fader.next_gain(rate);

            self.read_cursor = wrap_position(self.read_cursor + rate, capacity);

            let floor = self.read_cursor.floor();
            let t = (self.read_cursor - floor) as f32;
            let index = floor as i64;

            let sample = hermite_stereo(
                self.reader.read_frame(index - 1),
                self.reader.read_frame(index),
                self.reader.read_frame(index + 1),
                self.reader.read_frame(index + 2),
                t,
            );

            *out = sample * gain;
        }

        self.report(output.len());
    }

    fn report(&mut self, frames: usize) {
        self.frames_since_report = self.frames_since_report.saturating_add(frames as u32);
        if self.frames_since_report < self.telemetry_interval {
            return;
        }
        self.frames_since_report %= self.telemetry_interval;

        let _ = self.telemetry.push(Telemetry::ReadPos {
            deck: self.deck,
            position: self.read_cursor,
            target_rate: self.smoother.target(),
            smoothed_rate: self.smoother.smoothed(),
        });
    }
}
