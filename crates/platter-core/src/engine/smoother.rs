//! One-pole rate smoothing
//!
//! Turns step-wise rate commands into a per-sample rate without audible
//! jumps: `smoothed += (target - smoothed) * alpha` every sample, with
//! `alpha = 1 - exp(-1 / (tau * sample_rate))`.
//!
//! The filter state is only reset by [`RateSmoother::snap`], never by a new
//! target. Rates are held within [`MAX_RATE`] so the filter arithmetic can
//! never overflow into NaN.

/// Largest accepted rate magnitude (frames per frame)
pub const MAX_RATE: f64 = 1.0e15;

#[inline]
fn bounded(rate: f64) -> f64 {
    rate.clamp(-MAX_RATE, MAX_RATE)
}

/// Exponential rate smoother
#[derive(Debug, Clone)]
pub struct RateSmoother {
    target: f64,
    smoothed: f64,
    alpha: f64,
}

impl RateSmoother {
    /// Create a smoother at rest (target and smoothed rate 0)
    pub fn new(alpha: f64) -> Self {
        Self {
            target: 0.0,
            smoothed: 0.0,
            alpha: if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 },
        }
    }

    /// Set a new target; the smoothed rate glides toward it
    ///
    /// NaN is ignored; anything else is clamped to `±MAX_RATE`.
    #[inline]
    pub fn set_target(&mut self, rate: f64) {
        if !rate.is_nan() {
            self.target = bounded(rate);
        }
    }

    /// Set target and smoothed rate together (no glide)
    #[inline]
    pub fn snap(&mut self, rate: f64) {
        if !rate.is_nan() {
            self.target = bounded(rate);
            self.smoothed = self.target;
        }
    }

    /// Advance one sample and return the smoothed rate
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let next = self.smoothed + (self.target - self.smoothed) * self.alpha;
        if next.is_finite() {
            self.smoothed = next;
        }
        self.smoothed
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScratchConfig;

    fn smoother() -> RateSmoother {
        RateSmoother::new(ScratchConfig::default().smoothing_alpha(48_000))
    }

    #[test]
    fn test_snap_is_immediate() {
        let mut s = smoother();
        s.snap(-1.5);
        assert_eq!(s.smoothed(), -1.5);
        assert_eq!(s.next_sample(), -1.5);
    }

    #[test]
    fn test_glides_without_jumping() {
        let mut s = smoother();
        s.snap(1.0);
        s.set_target(-1.0);

        let first = s.next_sample();
        assert!((first - -1.0).abs() < (1.0f64 - -1.0).abs());
        assert!(first > 0.9, "single step should be small, got {}", first);

        // Monotonic approach
        let mut last = first;
        for _ in 0..100 {
            let next = s.next_sample();
            assert!(next < last);
            last = next;
        }
    }

    #[test]
    fn test_converges_within_a_few_time_constants() {
        let mut s = smoother();
        s.set_target(1.0);
        // 5 tau = 1200 samples at 48kHz, 5ms
        for _ in 0..1200 {
            s.next_sample();
        }
        assert!((s.smoothed() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_alpha_one_follows_target() {
        let mut s = RateSmoother::new(1.0);
        s.set_target(0.3);
        assert_eq!(s.next_sample(), 0.3);
    }

    #[test]
    fn test_extreme_targets_stay_finite() {
        let mut s = RateSmoother::new(1.0);
        s.set_target(f64::MAX);
        assert_eq!(s.next_sample(), MAX_RATE);

        s.set_target(-f64::MAX);
        assert_eq!(s.next_sample(), -MAX_RATE);

        s.set_target(f64::NAN);
        assert_eq!(s.target(), -MAX_RATE);

        s.set_target(1.0);
        assert_eq!(s.next_sample(), 1.0);

        s.snap(f64::INFINITY);
        assert_eq!(s.smoothed(), MAX_RATE);
    }

    #[test]
    fn test_bad_alpha_sanitized() {
        assert_eq!(RateSmoother::new(f64::NAN).alpha(), 1.0);
        assert_eq!(RateSmoother::new(2.0).alpha(), 1.0);
        assert_eq!(RateSmoother::new(-0.5).alpha(), 0.0);
    }
}
