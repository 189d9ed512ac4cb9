//! Capture unit - records the live program signal into a deck's ring buffer
//!
//! Sits transparently in the audio graph: every block is forwarded unchanged
//! while a copy is written at the write cursor. When frozen, the cursor stops
//! and the buffer becomes a fixed record that playback can still scrub.

use crate::types::{frames, DeckId, Sample, StereoSample};

use super::command::{CaptureCommand, Telemetry};
use super::ring::RingWriter;

/// Per-deck capture processor (runs on the audio thread)
pub struct CaptureUnit {
    deck: DeckId,
    writer: RingWriter,
    commands: rtrb::Consumer<CaptureCommand>,
    telemetry: rtrb::Producer<Telemetry>,
    /// Frames between `WritePos` reports
    telemetry_interval: u32,
    frames_since_report: u32,
}

impl CaptureUnit {
    pub fn new(
        writer: RingWriter,
        commands: rtrb::Consumer<CaptureCommand>,
        telemetry: rtrb::Producer<Telemetry>,
        telemetry_interval: u32,
    ) -> Self {
        Self {
            deck: writer.ring().deck(),
            writer,
            commands,
            telemetry,
            telemetry_interval: telemetry_interval.max(1),
            frames_since_report: 0,
        }
    }

    pub fn deck(&self) -> DeckId {
        self.deck
    }

    /// Current write cursor
    pub fn write_position(&self) -> usize {
        self.writer.write_position()
    }

    pub fn is_frozen(&self) -> bool {
        self.writer.is_frozen()
    }

    /// Apply pending freeze/unfreeze commands
    fn process_commands(&mut self) {
        while let Ok(cmd) = self.commands.pop() {
            match cmd {
                CaptureCommand::Freeze => self.writer.set_frozen(true),
                CaptureCommand::Unfreeze => self.writer.set_frozen(false),
            }
        }
    }

    /// Record a block without forwarding it
    pub fn capture(&mut self, input: &[StereoSample]) {
        self.process_commands();

        if !self.writer.is_frozen() && !input.is_empty() {
            let capacity = self.writer.capacity();
            let mut cursor = self.writer.write_position();
            for sample in input {
                self.writer.write_frame(cursor as i64, *sample);
                cursor += 1;
                if cursor == capacity {
                    cursor = 0;
                }
            }
            self.writer.publish_write_position(cursor);
        }

        self.report(input.len());
    }

    /// Record `input` and forward it unchanged to `output`
    ///
    /// If `output` is longer than `input` the tail is silenced.
    pub fn process(&mut self, input: &[StereoSample], output: &mut [StereoSample]) {
        self.capture(input);

        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        output[n..].fill(StereoSample::silence());
    }

    /// Interleaved [L, R, L, R, ...] variant of [`process`](Self::process)
    ///
    /// A trailing odd sample is passed through but not recorded.
    pub fn process_interleaved(&mut self, input: &[Sample], output: &mut [Sample]) {
        self.capture(frames(input));

        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        output[n..].fill(0.0);
    }

    /// Interleaved in-place variant: records the block and leaves it untouched
    pub fn process_interleaved_in_place(&mut self, block: &mut [Sample]) {
        self.capture(frames(block));
    }

    fn report(&mut self, frames: usize) {
        self.frames_since_report = self.frames_since_report.saturating_add(frames as u32);
        if self.frames_since_report < self.telemetry_interval {
            return;
        }
        self.frames_since_report %= self.telemetry_interval;

        // Fire-and-forget: a full queue just drops this report
        let _ = self.telemetry.push(Telemetry::WritePos {
            deck: self.deck,
            position: self.writer.write_position(),
            frozen: self.writer.is_frozen(),
        });
    }
}
