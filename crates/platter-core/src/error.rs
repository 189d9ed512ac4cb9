//! Scratch engine error types
//!
//! Only the non-real-time side (deck attach, control sends) can fail.
//! The per-block `process` entry points never return errors.

use thiserror::Error;

use crate::types::DeckId;

/// Errors that can occur while setting up or controlling decks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScratchError {
    /// Deck index is beyond the deck arena
    #[error("Deck index {deck} out of range (max {max})")]
    DeckOutOfRange { deck: usize, max: usize },

    /// Sample rate of zero
    #[error("Invalid sample rate: {0}Hz")]
    InvalidSampleRate(u32),

    /// A buffer already exists for this deck at another sample rate
    #[error("Sample rate mismatch on {deck}: buffer={existing}Hz, requested={requested}Hz")]
    SampleRateMismatch {
        deck: DeckId,
        existing: u32,
        requested: u32,
    },

    /// A capture unit for this deck is still alive
    #[error("Capture writer already attached to {0}")]
    WriterInUse(DeckId),

    /// A playback unit for this deck is still alive
    #[error("Playback reader already attached to {0}")]
    ReaderInUse(DeckId),

    /// Control message for a deck with no attached units
    #[error("No units attached to {0}")]
    DeckNotAttached(DeckId),

    /// Bounded control queue is full
    #[error("Control queue full for {deck}")]
    QueueFull { deck: DeckId },
}

/// Result type for scratch engine operations
pub type ScratchResult<T> = Result<T, ScratchError>;
