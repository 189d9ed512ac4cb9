//! Cubic Hermite interpolation
//!
//! Scratch rates sweep continuously through very slow speeds, where linear
//! interpolation turns into audible stair-stepping. The 4-point, 3rd-order
//! Hermite (Catmull-Rom) kernel is smooth there and cheap enough to run per
//! sample per channel.

use crate::types::{Sample, StereoSample};

/// Interpolate between `y1` and `y2`
///
/// `y0..y3` are the samples at offsets -1, 0, +1, +2 from the floor position
/// and `t` is the fractional offset in `[0, 1)`. At `t = 0` the result is
/// exactly `y1`.
#[inline]
pub fn hermite(y0: Sample, y1: Sample, y2: Sample, y3: Sample, t: Sample) -> Sample {
    let c0 = y1;
    let c1 = 0.5 * (y2 - y0);
    let c2 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
    let c3 = 0.5 * (y3 - y0) + 1.5 * (y1 - y2);
    ((c3 * t + c2) * t + c1) * t + c0
}

/// [`hermite`] applied to both channels
#[inline]
pub fn hermite_stereo(
    s0: StereoSample,
    s1: StereoSample,
    s2: StereoSample,
    s3: StereoSample,
    t: Sample,
) -> StereoSample {
    StereoSample {
        left: hermite(s0.left, s1.left, s2.left, s3.left, t),
        right: hermite(s0.right, s1.right, s2.right, s3.right, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_zero_returns_y1() {
        assert_eq!(hermite(0.0, 0.25, 0.5, 0.75, 0.0), 0.25);
        assert_eq!(hermite(9.0, -3.0, 4.0, 1.0, 0.0), -3.0);
    }

    #[test]
    fn test_approaches_y2() {
        let y = hermite(0.1, -0.4, 0.8, 0.3, 0.999_999);
        assert!((y - 0.8).abs() < 1e-4, "Got {}", y);
    }

    #[test]
    fn test_reproduces_lines_and_parabolas() {
        // Catmull-Rom is exact for polynomials up to degree 2
        for i in 0..10 {
            let t = i as f32 / 10.0;
            let line = hermite(-1.0, 0.0, 1.0, 2.0, t);
            assert!((line - t).abs() < 1e-6);

            let f = |x: f32| 0.5 * x * x - x + 0.25;
            let para = hermite(f(-1.0), f(0.0), f(1.0), f(2.0), t);
            assert!((para - f(t)).abs() < 1e-5, "t={} got {} want {}", t, para, f(t));
        }
    }

    #[test]
    fn test_midpoint_of_constant() {
        assert!((hermite(0.3, 0.3, 0.3, 0.3, 0.5) - 0.3).abs() < 1e-7);
    }

    #[test]
    fn test_stereo_channels_independent() {
        let out = hermite_stereo(
            StereoSample::new(0.0, 1.0),
            StereoSample::new(0.25, 1.0),
            StereoSample::new(0.5, 1.0),
            StereoSample::new(0.75, 1.0),
            0.5,
        );
        assert!((out.left - 0.375).abs() < 1e-6);
        assert!((out.right - 1.0).abs() < 1e-6);
    }
}
