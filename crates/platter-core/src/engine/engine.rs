//! Scratch engine - owns the deck buffers and the app side of every queue
//!
//! Lives on the control thread. It hands out capture and playback units for
//! the host to drive from its audio callbacks, routes deck-addressed
//! [`ControlMessage`]s to the right unit and collects their telemetry.

use std::sync::Arc;

use crate::config::ScratchConfig;
use crate::error::{ScratchError, ScratchResult};
use crate::types::{DeckId, MAX_DECKS};

use super::capture::CaptureUnit;
use super::command::{
    command_channel, telemetry_channel, CaptureCommand, ControlMessage, PlaybackCommand, Routed,
    Telemetry,
};
use super::playback::PlaybackUnit;
use super::ring::RingBuffer;
use super::store::RingBufferStore;

/// App-side endpoints for one unit
struct UnitLink<C> {
    commands: rtrb::Producer<C>,
    telemetry: rtrb::Consumer<Telemetry>,
}

impl<C> UnitLink<C> {
    /// Whether the unit on the other end has been dropped
    fn is_detached(&self) -> bool {
        self.commands.is_abandoned()
    }
}

#[derive(Default)]
struct DeckLinks {
    capture: Option<UnitLink<CaptureCommand>>,
    playback: Option<UnitLink<PlaybackCommand>>,
}

/// Owner of all scratch decks
pub struct ScratchEngine {
    config: ScratchConfig,
    store: RingBufferStore,
    links: [DeckLinks; MAX_DECKS],
}

impl ScratchEngine {
    /// Create an engine; no buffers are allocated until a deck is attached
    pub fn new(config: ScratchConfig) -> Self {
        let config = config.validated();
        Self {
            store: RingBufferStore::new(&config),
            config,
            links: std::array::from_fn(|_| DeckLinks::default()),
        }
    }

    pub fn config(&self) -> &ScratchConfig {
        &self.config
    }

    /// Deck buffer arena
    pub fn store(&self) -> &RingBufferStore {
        &self.store
    }

    /// Shared buffer for a deck, if created
    pub fn ring(&self, deck: DeckId) -> Option<&Arc<RingBuffer>> {
        self.store.get(deck)
    }

    fn links_mut(&mut self, deck: DeckId) -> ScratchResult<&mut DeckLinks> {
        self.links
            .get_mut(deck.index())
            .ok_or(ScratchError::DeckOutOfRange {
                deck: deck.index(),
                max: MAX_DECKS - 1,
            })
    }

    /// Create the capture unit for `deck`, allocating its buffer if needed
    ///
    /// Fails with [`ScratchError::WriterInUse`] while a previous capture unit
    /// for this deck is still alive.
    pub fn attach_capture(&mut self, deck: DeckId, sample_rate: u32) -> ScratchResult<CaptureUnit> {
        let ring = self.store.get_or_create(deck, sample_rate)?;
        let writer = ring.claim_writer().ok_or(ScratchError::WriterInUse(deck))?;

        let (tx, rx) = command_channel(self.config.command_queue_capacity);
        let (ttx, trx) = telemetry_channel(self.config.telemetry_queue_capacity);
        let interval = self.config.telemetry_interval_frames(sample_rate);

        self.links_mut(deck)?.capture = Some(UnitLink {
            commands: tx,
            telemetry: trx,
        });
        log::info!("Attached capture unit to {} ({}Hz)", deck, sample_rate);
        Ok(CaptureUnit::new(writer, rx, ttx, interval))
    }

    /// Create the playback unit for `deck`, allocating its buffer if needed
    ///
    /// A deck that was never captured plays silence.
    pub fn attach_playback(&mut self, deck: DeckId, sample_rate: u32) -> ScratchResult<PlaybackUnit> {
        let ring = self.store.get_or_create(deck, sample_rate)?;
        let reader = ring.claim_reader().ok_or(ScratchError::ReaderInUse(deck))?;

        let (tx, rx) = command_channel(self.config.command_queue_capacity);
        let (ttx, trx) = telemetry_channel(self.config.telemetry_queue_capacity);

        self.links_mut(deck)?.playback = Some(UnitLink {
            commands: tx,
            telemetry: trx,
        });
        log::info!(
            "Attached playback unit to {} ({}Hz, rate source: {})",
            deck,
            sample_rate,
            self.config.rate_source.display_name()
        );
        Ok(PlaybackUnit::new(reader, rx, ttx, &self.config))
    }

    /// Attach both units for a deck
    pub fn attach_deck(&mut self, deck: DeckId, sample_rate: u32) -> ScratchResult<(CaptureUnit, PlaybackUnit)> {
        let capture = self.attach_capture(deck, sample_rate)?;
        let playback = self.attach_playback(deck, sample_rate)?;
        Ok((capture, playback))
    }

    /// Drop the app-side endpoints for a deck (its buffer is kept)
    pub fn detach_deck(&mut self, deck: DeckId) {
        if let Some(links) = self.links.get_mut(deck.index()) {
            *links = DeckLinks::default();
            log::info!("Detached {}", deck);
        }
    }

    /// Replace a deck's buffer with a fresh one at a new sample rate
    ///
    /// The deck's units must have been dropped first.
    pub fn recreate_deck(&mut self, deck: DeckId, sample_rate: u32) -> ScratchResult<()> {
        self.store.recreate(deck, sample_rate)?;
        self.detach_deck(deck);
        Ok(())
    }

    /// Route a control message to the deck's capture or playback unit
    ///
    /// Never blocks. Fails with [`ScratchError::QueueFull`] if the unit has not
    /// drained its queue, or [`ScratchError::DeckNotAttached`] if no live unit
    /// handles this message.
    pub fn send(&mut self, deck: DeckId, message: ControlMessage) -> ScratchResult<()> {
        let links = self.links_mut(deck)?;

        match Routed::from(message) {
            Routed::Capture(cmd) => match links.capture.as_mut() {
                Some(link) if !link.is_detached() => link
                    .commands
                    .push(cmd)
                    .map_err(|_| ScratchError::QueueFull { deck }),
                _ => Err(ScratchError::DeckNotAttached(deck)),
            },
            Routed::Playback(cmd) => match links.playback.as_mut() {
                Some(link) if !link.is_detached() => link
                    .commands
                    .push(cmd)
                    .map_err(|_| ScratchError::QueueFull { deck }),
                _ => Err(ScratchError::DeckNotAttached(deck)),
            },
        }
    }

    /// Append all pending telemetry from every deck to `out`
    pub fn drain_telemetry_into(&mut self, out: &mut Vec<Telemetry>) {
        for links in &mut self.links {
            if let Some(link) = links.capture.as_mut() {
                while let Ok(t) = link.telemetry.pop() {
                    out.push(t);
                }
            }
            if let Some(link) = links.playback.as_mut() {
                while let Ok(t) = link.telemetry.pop() {
                    out.push(t);
                }
            }
        }
    }

    /// Collect all pending telemetry from every deck
    pub fn drain_telemetry(&mut self) -> Vec<Telemetry> {
        let mut out = Vec::new();
        self.drain_telemetry_into(&mut out);
        out
    }

    /// Current write cursor of a deck (lock-free peek, may be stale)
    pub fn write_position(&self, deck: DeckId) -> Option<usize> {
        self.store.get(deck).map(|ring| ring.write_position())
    }

    /// Whether a deck's capture is frozen (lock-free peek)
    pub fn is_frozen(&self, deck: DeckId) -> Option<bool> {
        self.store.get(deck).map(|ring| ring.is_frozen())
    }
}

impl Default for ScratchEngine {
    fn default() -> Self {
        Self::new(ScratchConfig::default())
    }
}
