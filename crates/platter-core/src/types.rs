//! Common types for Platter
//!
//! Fundamental audio types shared by the capture and playback sides of the
//! scratch engine.

/// Default sample rate (48kHz - standard professional audio rate)
/// The actual rate is supplied by the host when a deck is attached.
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Maximum number of independently scratchable decks
pub const MAX_DECKS: usize = 8;

/// Audio sample type
pub type Sample = f32;

/// A single stereo sample (left and right channels)
///
/// Uses `#[repr(C)]` to ensure predictable memory layout: [left, right].
/// This enables zero-copy conversion between `&[StereoSample]` and `&[f32]`
/// (interleaved format) using bytemuck.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    /// Create a new stereo sample
    #[inline]
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    /// Create a silent stereo sample
    #[inline]
    pub fn silence() -> Self {
        Self::default()
    }

    /// Create a mono sample (same value in both channels)
    #[inline]
    pub fn mono(value: Sample) -> Self {
        Self { left: value, right: value }
    }
}

impl std::ops::Mul<Sample> for StereoSample {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Sample) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
        }
    }
}

/// View an interleaved block [L, R, L, R, ...] as stereo frames
///
/// A trailing odd sample is not part of any frame and is left out.
#[inline]
pub fn frames(interleaved: &[Sample]) -> &[StereoSample] {
    let whole = interleaved.len() & !1;
    bytemuck::cast_slice(&interleaved[..whole])
}

/// Mutable variant of [`frames`]
#[inline]
pub fn frames_mut(interleaved: &mut [Sample]) -> &mut [StereoSample] {
    let whole = interleaved.len() & !1;
    bytemuck::cast_slice_mut(&mut interleaved[..whole])
}

/// Deck identifier (0..MAX_DECKS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeckId(pub usize);

impl DeckId {
    /// Create a new deck ID (panics if >= MAX_DECKS)
    pub fn new(id: usize) -> Self {
        assert!(id < MAX_DECKS, "Deck ID must be less than {}", MAX_DECKS);
        Self(id)
    }

    /// Create a deck ID without range checking
    ///
    /// Used where an out-of-range id should surface as an error instead of a panic.
    pub const fn from_raw(id: usize) -> Self {
        Self(id)
    }

    /// Get the deck index
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }

    /// Get the deck number (1-based, for display)
    pub fn display_number(&self) -> usize {
        self.0 + 1
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deck {}", self.display_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_sample_scale() {
        let a = StereoSample::new(1.0, 2.0);
        let scaled = a * 0.5;
        assert_eq!(scaled.left, 0.5);
        assert_eq!(scaled.right, 1.0);
    }

    #[test]
    fn test_interleaved_view() {
        let interleaved = [1.0, 2.0, 3.0, 4.0, 5.0];
        let view = frames(&interleaved);

        assert_eq!(view.len(), 2);
        assert_eq!(view[0], StereoSample::new(1.0, 2.0));
        assert_eq!(view[1], StereoSample::new(3.0, 4.0));
    }

    #[test]
    fn test_interleaved_view_mut() {
        let mut interleaved = [0.0; 4];
        frames_mut(&mut interleaved)[1] = StereoSample::new(0.25, -0.25);
        assert_eq!(interleaved, [0.0, 0.0, 0.25, -0.25]);
    }

    #[test]
    fn test_deck_display() {
        assert_eq!(DeckId::new(0).to_string(), "deck 1");
        assert_eq!(DeckId::new(3).index(), 3);
    }

    #[test]
    #[should_panic]
    fn test_deck_id_out_of_range_panics() {
        DeckId::new(MAX_DECKS);
    }
}
