//! Per-deck ring buffer arena
//!
//! Buffers are created lazily the first time a deck is used and then live as
//! long as the store. All allocation happens here, on the control thread,
//! before any unit touches the buffer from an audio callback.

use std::sync::Arc;

use crate::config::ScratchConfig;
use crate::error::{ScratchError, ScratchResult};
use crate::types::{DeckId, MAX_DECKS};

use super::ring::RingBuffer;

/// Arena of per-deck ring buffers addressed by [`DeckId`]
pub struct RingBufferStore {
    config: ScratchConfig,
    buffers: [Option<Arc<RingBuffer>>; MAX_DECKS],
}

impl RingBufferStore {
    /// Create an empty store; buffer sizes follow `config.buffer_seconds`
    pub fn new(config: &ScratchConfig) -> Self {
        Self {
            config: config.validated(),
            buffers: std::array::from_fn(|_| None),
        }
    }

    fn slot(deck: DeckId) -> ScratchResult<usize> {
        if deck.index() < MAX_DECKS {
            Ok(deck.index())
        } else {
            Err(ScratchError::DeckOutOfRange {
                deck: deck.index(),
                max: MAX_DECKS - 1,
            })
        }
    }

    /// Get the buffer for `deck`, allocating it on first use
    ///
    /// Subsequent calls with the same sample rate return the same buffer.
    /// A different sample rate is rejected with
    /// [`ScratchError::SampleRateMismatch`]; use [`recreate`](Self::recreate)
    /// to resize-and-clear after a device change.
    pub fn get_or_create(&mut self, deck: DeckId, sample_rate: u32) -> ScratchResult<Arc<RingBuffer>> {
        let slot = Self::slot(deck)?;
        if sample_rate == 0 {
            return Err(ScratchError::InvalidSampleRate(sample_rate));
        }

        if let Some(existing) = &self.buffers[slot] {
            if existing.sample_rate() != sample_rate {
                log::warn!(
                    "Refusing to reuse {} buffer at {}Hz (allocated at {}Hz)",
                    deck,
                    sample_rate,
                    existing.sample_rate()
                );
                return Err(ScratchError::SampleRateMismatch {
                    deck,
                    existing: existing.sample_rate(),
                    requested: sample_rate,
                });
            }
            return Ok(Arc::clone(existing));
        }

        let ring = Arc::new(self.allocate(deck, sample_rate));
        self.buffers[slot] = Some(Arc::clone(&ring));
        Ok(ring)
    }

    /// Replace a deck's buffer with a fresh, silent one at `sample_rate`
    ///
    /// Fails while a capture or playback unit still holds the old buffer.
    pub fn recreate(&mut self, deck: DeckId, sample_rate: u32) -> ScratchResult<Arc<RingBuffer>> {
        let slot = Self::slot(deck)?;
        if sample_rate == 0 {
            return Err(ScratchError::InvalidSampleRate(sample_rate));
        }

        if let Some(existing) = &self.buffers[slot] {
            if existing.has_writer() {
                return Err(ScratchError::WriterInUse(deck));
            }
            if existing.has_reader() {
                return Err(ScratchError::ReaderInUse(deck));
            }
        }

        let ring = Arc::new(self.allocate(deck, sample_rate));
        self.buffers[slot] = Some(Arc::clone(&ring));
        Ok(ring)
    }

    /// Get the buffer for `deck` if it has been created
    pub fn get(&self, deck: DeckId) -> Option<&Arc<RingBuffer>> {
        self.buffers.get(deck.index()).and_then(Option::as_ref)
    }

    /// Iterate over created buffers
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RingBuffer>> {
        self.buffers.iter().flatten()
    }

    fn allocate(&self, deck: DeckId, sample_rate: u32) -> RingBuffer {
        let ring = RingBuffer::new(deck, self.config.buffer_frames(sample_rate), sample_rate);
        log::info!(
            "Allocated {} ring buffer: {} frames ({:.1}s @ {}Hz)",
            deck,
            ring.capacity(),
            ring.duration_seconds(),
            sample_rate
        );
        ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ScratchConfig {
        ScratchConfig {
            buffer_seconds: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_lazy_creation_sizes_buffer() {
        let mut store = RingBufferStore::new(&small_config());
        assert!(store.get(DeckId::new(0)).is_none());

        let ring = store.get_or_create(DeckId::new(0), 48_000).unwrap();
        assert_eq!(ring.capacity(), 24_000);
        assert_eq!(ring.sample_rate(), 48_000);
        assert!(store.get(DeckId::new(0)).is_some());
        assert_eq!(store.iter().count(), 1);
    }

    #[test]
    fn test_same_rate_returns_same_buffer() {
        let mut store = RingBufferStore::new(&small_config());
        let a = store.get_or_create(DeckId::new(2), 44_100).unwrap();
        let b = store.get_or_create(DeckId::new(2), 44_100).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = store.get_or_create(DeckId::new(3), 44_100).unwrap();
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[test]
    fn test_rate_mismatch_rejected() {
        let mut store = RingBufferStore::new(&small_config());
        store.get_or_create(DeckId::new(0), 48_000).unwrap();

        let err = store.get_or_create(DeckId::new(0), 44_100).unwrap_err();
        assert_eq!(
            err,
            ScratchError::SampleRateMismatch {
                deck: DeckId::new(0),
                existing: 48_000,
                requested: 44_100,
            }
        );
    }

    #[test]
    fn test_invalid_requests() {
        let mut store = RingBufferStore::new(&small_config());
        assert_eq!(
            store.get_or_create(DeckId::new(0), 0).unwrap_err(),
            ScratchError::InvalidSampleRate(0)
        );
        assert!(matches!(
            store.get_or_create(DeckId::from_raw(MAX_DECKS), 48_000),
            Err(ScratchError::DeckOutOfRange { .. })
        ));
    }

    #[test]
    fn test_recreate_clears_and_resizes() {
        let mut store = RingBufferStore::new(&small_config());
        let old = store.get_or_create(DeckId::new(0), 48_000).unwrap();
        {
            let writer = old.claim_writer().unwrap();
            writer.write_frame(10, crate::types::StereoSample::mono(0.5));

            // Still claimed: refuse to pull the buffer out from under capture
            assert_eq!(
                store.recreate(DeckId::new(0), 44_100).unwrap_err(),
                ScratchError::WriterInUse(DeckId::new(0))
            );
        }

        let fresh = store.recreate(DeckId::new(0), 44_100).unwrap();
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert_eq!(fresh.capacity(), 22_050);
        assert_eq!(fresh.read(10, 0), 0.0);
        assert!(Arc::ptr_eq(store.get(DeckId::new(0)).unwrap(), &fresh));
    }
}
