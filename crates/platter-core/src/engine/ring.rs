//! Shared circular sample store
//!
//! One [`RingBuffer`] per deck holds a fixed rolling window of interleaved
//! stereo frames. Capture and playback run on real-time threads and share it
//! without locks:
//!
//! - Samples are stored as `f32` bit patterns in `AtomicU32` cells and accessed
//!   with `Relaxed` ordering. A reader that races a writer sees either the old
//!   or the new sample, never a torn value.
//! - The write cursor is published with `Release` after a block is written and
//!   read with `Acquire`, so a reader that observes a cursor also observes the
//!   samples behind it.
//!
//! Access goes through two narrow handles. [`RingWriter`] is the only way to
//! store samples or move the write cursor; [`RingReader`] can only look. Each
//! buffer hands out at most one of each at a time, and a handle gives its claim
//! back when dropped so units can detach and re-attach without losing audio.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::types::{DeckId, Sample, StereoSample};

/// Wrap any frame index into `[0, capacity)`
///
/// Negative and over-range indices are folded with Euclidean remainder, so
/// `wrap_index(k) == wrap_index(k + capacity)` for every `k`.
#[inline]
pub fn wrap_index(frame: i64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    frame.rem_euclid(capacity as i64) as usize
}

/// Wrap a fractional frame position into `[0, capacity)`
///
/// Constant time for any finite input. Non-finite input maps to 0.
#[inline]
pub fn wrap_position(position: f64, capacity: usize) -> f64 {
    if !position.is_finite() {
        return 0.0;
    }
    let cap = capacity as f64;
    let wrapped = position.rem_euclid(cap);
    // rem_euclid can round up to exactly `cap` for tiny negative inputs
    if wrapped >= cap {
        0.0
    } else {
        wrapped
    }
}

/// Fixed-capacity circular store of stereo frames
pub struct RingBuffer {
    deck: DeckId,
    /// Interleaved [L, R, L, R, ...] sample bits, `capacity * 2` cells
    samples: Box<[AtomicU32]>,
    capacity: usize,
    sample_rate: u32,
    write_cursor: AtomicUsize,
    frozen: AtomicBool,
    writer_claimed: AtomicBool,
    reader_claimed: AtomicBool,
}

impl RingBuffer {
    /// Allocate a zero-filled buffer of `capacity` frames
    ///
    /// Allocates; never call from an audio callback.
    pub fn new(deck: DeckId, capacity: usize, sample_rate: u32) -> Self {
        let capacity = capacity.max(1);
        let samples = (0..capacity * 2)
            .map(|_| AtomicU32::new(0.0f32.to_bits()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            deck,
            samples,
            capacity,
            sample_rate,
            write_cursor: AtomicUsize::new(0),
            frozen: AtomicBool::new(false),
            writer_claimed: AtomicBool::new(false),
            reader_claimed: AtomicBool::new(false),
        }
    }

    /// Deck this buffer belongs to
    pub fn deck(&self) -> DeckId {
        self.deck
    }

    /// Capacity in frames
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sample rate the buffer was sized for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration of the rolling window in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.capacity as f64 / self.sample_rate.max(1) as f64
    }

    /// Read one channel of one frame (index wrapped)
    #[inline]
    pub fn read(&self, frame: i64, channel: usize) -> Sample {
        let cell = wrap_index(frame, self.capacity) * 2 + (channel & 1);
        f32::from_bits(self.samples[cell].load(Ordering::Relaxed))
    }

    /// Read a full stereo frame (index wrapped)
    #[inline]
    pub fn read_frame(&self, frame: i64) -> StereoSample {
        let cell = wrap_index(frame, self.capacity) * 2;
        StereoSample {
            left: f32::from_bits(self.samples[cell].load(Ordering::Relaxed)),
            right: f32::from_bits(self.samples[cell + 1].load(Ordering::Relaxed)),
        }
    }

    #[inline]
    fn write(&self, frame: i64, channel: usize, value: Sample) {
        let cell = wrap_index(frame, self.capacity) * 2 + (channel & 1);
        self.samples[cell].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Current write cursor (lock-free, may be up to one block stale)
    #[inline]
    pub fn write_position(&self) -> usize {
        self.write_cursor.load(Ordering::Acquire)
    }

    /// Whether capture is currently frozen (lock-free)
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Relaxed)
    }

    /// Whether a writer handle is alive
    pub fn has_writer(&self) -> bool {
        self.writer_claimed.load(Ordering::Acquire)
    }

    /// Whether a reader handle is alive
    pub fn has_reader(&self) -> bool {
        self.reader_claimed.load(Ordering::Acquire)
    }

    /// Claim the single writer handle
    ///
    /// Returns `None` while another [`RingWriter`] for this buffer is alive.
    pub fn claim_writer(self: &Arc<Self>) -> Option<RingWriter> {
        self.writer_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RingWriter { ring: Arc::clone(self) })
    }

    /// Claim the single reader handle
    ///
    /// Returns `None` while another [`RingReader`] for this buffer is alive.
    pub fn claim_reader(self: &Arc<Self>) -> Option<RingReader> {
        self.reader_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RingReader { ring: Arc::clone(self) })
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("deck", &self.deck)
            .field("capacity", &self.capacity)
            .field("sample_rate", &self.sample_rate)
            .field("write_cursor", &self.write_position())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// Exclusive write access to a deck's ring buffer (owned by capture)
pub struct RingWriter {
    ring: Arc<RingBuffer>,
}

impl RingWriter {
    /// Shared buffer behind this handle
    pub fn ring(&self) -> &Arc<RingBuffer> {
        &self.ring
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }

    /// Store one channel of one frame (index wrapped)
    #[inline]
    pub fn write(&self, frame: i64, channel: usize, value: Sample) {
        self.ring.write(frame, channel, value);
    }

    /// Store a full stereo frame (index wrapped)
    #[inline]
    pub fn write_frame(&self, frame: i64, sample: StereoSample) {
        self.ring.write(frame, 0, sample.left);
        self.ring.write(frame, 1, sample.right);
    }

    /// Current write cursor
    #[inline]
    pub fn write_position(&self) -> usize {
        // Only this handle stores the cursor, so Relaxed sees our own writes
        self.ring.write_cursor.load(Ordering::Relaxed)
    }

    /// Publish a new write cursor (wrapped into range)
    #[inline]
    pub fn publish_write_position(&self, position: usize) {
        self.ring
            .write_cursor
            .store(position % self.ring.capacity, Ordering::Release);
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.ring.is_frozen()
    }

    #[inline]
    pub fn set_frozen(&self, frozen: bool) {
        self.ring.frozen.store(frozen, Ordering::Relaxed);
    }
}

impl Drop for RingWriter {
    fn drop(&mut self) {
        self.ring.writer_claimed.store(false, Ordering::Release);
    }
}

/// Read-only access to a deck's ring buffer (owned by playback)
pub struct RingReader {
    ring: Arc<RingBuffer>,
}

impl RingReader {
    /// Shared buffer behind this handle
    pub fn ring(&self) -> &Arc<RingBuffer> {
        &self.ring
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }

    #[inline]
    pub fn read(&self, frame: i64, channel: usize) -> Sample {
        self.ring.read(frame, channel)
    }

    #[inline]
    pub fn read_frame(&self, frame: i64) -> StereoSample {
        self.ring.read_frame(frame)
    }

    #[inline]
    pub fn write_position(&self) -> usize {
        self.ring.write_position()
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.ring.is_frozen()
    }
}

impl Drop for RingReader {
    fn drop(&mut self) {
        self.ring.reader_claimed.store(false, Ordering::Release);
    }
}
