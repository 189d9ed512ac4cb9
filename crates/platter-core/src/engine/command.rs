//! Lock-free control channel between the app and the scratch units
//!
//! The app thread pushes commands into bounded `rtrb` ringbuffers; each unit
//! drains its queue at the top of every audio block, never blocking. Units
//! report back through a second queue per unit (telemetry), which is
//! fire-and-forget: when the app falls behind, reports are dropped.
//!
//! # Real-Time Safety
//!
//! - **No allocations**: queues are allocated when a deck is attached
//! - **Wait-free**: push and pop are O(1) and never block
//! - **Single-producer single-consumer**: one app-side sender per unit
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = ScratchEngine::new(ScratchConfig::default());
//! let (mut capture, mut playback) = engine.attach_deck(DeckId::new(0), 48_000)?;
//!
//! // App thread
//! engine.send(DeckId::new(0), ControlMessage::StartFromWrite { rate: 0.0 })?;
//! engine.send(DeckId::new(0), ControlMessage::SetRate { rate: -1.0 })?;
//!
//! // Audio thread
//! capture.process(&input, &mut passthrough);
//! playback.process(&mut output);
//! ```

use crate::types::DeckId;

/// Deck-addressed message from the app, routed by [`ScratchEngine::send`]
///
/// [`ScratchEngine::send`]: super::ScratchEngine::send
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    // ─────────────────────────────────────────────────────────────
    // Capture
    // ─────────────────────────────────────────────────────────────
    /// Stop advancing the write cursor (buffer becomes a fixed record)
    Freeze,
    /// Resume capturing
    Unfreeze,

    // ─────────────────────────────────────────────────────────────
    // Playback
    // ─────────────────────────────────────────────────────────────
    /// Begin scrubbing at `position` with the rate snapped to `rate`
    Start { position: f64, rate: f64 },
    /// Begin scrubbing at the deck's current write cursor
    StartFromWrite { rate: f64 },
    /// Update the target rate; the smoothed rate glides toward it
    SetRate { rate: f64 },
    /// Set target and smoothed rate together (no glide)
    SnapRate { rate: f64 },
    /// Return to idle; replies with [`Telemetry::Stopped`]
    Stop,
}

impl ControlMessage {
    /// Whether this message is handled by the capture unit
    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Freeze | Self::Unfreeze)
    }
}

/// Commands consumed by a [`CaptureUnit`](super::CaptureUnit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    Freeze,
    Unfreeze,
}

/// Commands consumed by a [`PlaybackUnit`](super::PlaybackUnit)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Start { position: f64, rate: f64 },
    StartFromWrite { rate: f64 },
    SetRate { rate: f64 },
    SnapRate { rate: f64 },
    Stop,
}

/// Periodic reports from the units back to the app
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Telemetry {
    /// Capture cursor report
    WritePos {
        deck: DeckId,
        position: usize,
        frozen: bool,
    },
    /// Playback cursor and rate report (only while scrubbing)
    ReadPos {
        deck: DeckId,
        position: f64,
        target_rate: f64,
        smoothed_rate: f64,
    },
    /// Reply to `Stop`: frames between start position and final read cursor
    Stopped { deck: DeckId, frames_traversed: u64 },
}

impl Telemetry {
    /// Deck the report came from
    pub fn deck(&self) -> DeckId {
        match self {
            Self::WritePos { deck, .. } | Self::ReadPos { deck, .. } | Self::Stopped { deck, .. } => *deck,
        }
    }
}

/// Split a deck-addressed message into the unit-level command
pub(crate) enum Routed {
    Capture(CaptureCommand),
    Playback(PlaybackCommand),
}

impl From<ControlMessage> for Routed {
    fn from(message: ControlMessage) -> Self {
        match message {
            ControlMessage::Freeze => Routed::Capture(CaptureCommand::Freeze),
            ControlMessage::Unfreeze => Routed::Capture(CaptureCommand::Unfreeze),
            ControlMessage::Start { position, rate } => {
                Routed::Playback(PlaybackCommand::Start { position, rate })
            }
            ControlMessage::StartFromWrite { rate } => {
                Routed::Playback(PlaybackCommand::StartFromWrite { rate })
            }
            ControlMessage::SetRate { rate } => Routed::Playback(PlaybackCommand::SetRate { rate }),
            ControlMessage::SnapRate { rate } => Routed::Playback(PlaybackCommand::SnapRate { rate }),
            ControlMessage::Stop => Routed::Playback(PlaybackCommand::Stop),
        }
    }
}

/// Create an app → unit command queue of the given capacity
pub fn command_channel<T>(capacity: usize) -> (rtrb::Producer<T>, rtrb::Consumer<T>) {
    rtrb::RingBuffer::new(capacity.max(1))
}

/// Create a unit → app telemetry queue of the given capacity
pub fn telemetry_channel(capacity: usize) -> (rtrb::Producer<Telemetry>, rtrb::Consumer<Telemetry>) {
    rtrb::RingBuffer::new(capacity.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_channel_roundtrip() {
        let (mut tx, mut rx) = command_channel::<PlaybackCommand>(4);
        tx.push(PlaybackCommand::SetRate { rate: -0.5 }).unwrap();

        let cmd = rx.pop().unwrap();
        assert_eq!(cmd, PlaybackCommand::SetRate { rate: -0.5 });
        assert!(rx.pop().is_err());
    }

    #[test]
    fn test_channel_bounded() {
        let (mut tx, _rx) = command_channel::<CaptureCommand>(2);
        assert!(tx.push(CaptureCommand::Freeze).is_ok());
        assert!(tx.push(CaptureCommand::Unfreeze).is_ok());
        assert!(tx.push(CaptureCommand::Freeze).is_err());
    }

    #[test]
    fn test_routing() {
        assert!(ControlMessage::Freeze.is_capture());
        assert!(!ControlMessage::Stop.is_capture());

        assert!(matches!(
            Routed::from(ControlMessage::Unfreeze),
            Routed::Capture(CaptureCommand::Unfreeze)
        ));
        assert!(matches!(
            Routed::from(ControlMessage::Start { position: 3.0, rate: 1.0 }),
            Routed::Playback(PlaybackCommand::Start { position, rate }) if position == 3.0 && rate == 1.0
        ));
        assert!(matches!(
            Routed::from(ControlMessage::SnapRate { rate: 2.0 }),
            Routed::Playback(PlaybackCommand::SnapRate { rate }) if rate == 2.0
        ));
    }

    #[test]
    fn test_telemetry_deck() {
        let t = Telemetry::Stopped {
            deck: DeckId::new(2),
            frames_traversed: 10,
        };
        assert_eq!(t.deck(), DeckId::new(2));
    }

    #[test]
    fn test_message_sizes() {
        // Queue slots stay within a cache line
        assert!(std::mem::size_of::<PlaybackCommand>() <= 24);
        assert!(std::mem::size_of::<Telemetry>() <= 48);
    }
}
