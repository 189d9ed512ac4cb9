//! Zero-crossing fade
//!
//! When playback direction reverses, the read cursor turns around over buffer
//! content that does not line up with what was just played, which clicks.
//! A short linear gain ramp from 0 to 1 masks the discontinuity.
//!
//! Sign is classified into {-1, 0, +1} with a dead zone so a rate hovering
//! around zero does not chatter. Reversal is measured against the last
//! non-zero sign, so passing through the dead zone still counts.

/// Direction-reversal fade state
#[derive(Debug, Clone)]
pub struct ZeroCrossingFader {
    /// Fade length in samples (0 disables the fade)
    length: u32,
    /// Samples left in the current fade
    countdown: u32,
    /// Last non-zero direction (0 until the first movement)
    last_sign: i8,
    dead_zone: f64,
}

/// Classify a rate as -1, 0 or +1 using a symmetric dead zone
#[inline]
pub fn rate_sign(rate: f64, dead_zone: f64) -> i8 {
    if rate > dead_zone {
        1
    } else if rate < -dead_zone {
        -1
    } else {
        0
    }
}

impl ZeroCrossingFader {
    pub fn new(length: u32, dead_zone: f64) -> Self {
        Self {
            length,
            countdown: 0,
            last_sign: 0,
            dead_zone,
        }
    }

    /// Forget any running fade and adopt `rate`'s direction
    ///
    /// Called on start so entering a scratch never triggers a fade.
    pub fn reset(&mut self, rate: f64) {
        self.countdown = 0;
        self.last_sign = rate_sign(rate, self.dead_zone);
    }

    /// Drop the running fade (treated as already complete)
    pub fn cancel(&mut self) {
        self.countdown = 0;
    }

    /// Feed this sample's smoothed rate and get the gain to apply
    #[inline]
    pub fn next_gain(&mut self, rate: f64) -> f32 {
        let sign = rate_sign(rate, self.dead_zone);
        if sign != 0 {
            if self.last_sign != 0 && sign != self.last_sign {
                self.countdown = self.length;
            }
            self.last_sign = sign;
        }

        if self.countdown == 0 {
            return 1.0;
        }
        let gain = 1.0 - self.countdown as f32 / self.length as f32;
        self.countdown -= 1;
        gain
    }
}
