// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time test and the color ramp that turns its result into
//! a pixel.  Everything else in the crate exists to call `iterations`
//! as many times as possible, as quickly as possible.

use num::Complex;

/// The largest packed 0xRRGGBB value; the color of points that never
/// escape.
pub const WHITE: u32 = 0x00FF_FFFF;

/// Counts how many times `z = z * z + c` can be applied before the
/// orbit leaves the circle of radius 2, giving up at `limit`.  The
/// orbit starts at `c` itself rather than at the origin, so a point
/// already outside the circle scores zero.  A result of `limit` means
/// "never escaped", i.e. the point is treated as part of the set.
#[inline]
pub fn iterations(c: Complex<f64>, limit: usize) -> usize {
    let mut z = c;
    let mut count = 0;
    while z.norm_sqr() <= 4.0 && count < limit {
        z = z * z + c;
        count += 1;
    }
    count
}

/// Scales an iteration count linearly onto the gray ramp
/// `0..=0xFFFFFF`.
#[inline]
pub fn color(iterations: usize, limit: usize) -> u32 {
    if limit == 0 {
        return 0;
    }
    (f64::from(WHITE) * iterations as f64 / limit as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(iterations(Complex::new(0.0, 0.0), 1000), 1000);
    }

    #[test]
    fn far_point_escapes_immediately() {
        assert_eq!(iterations(Complex::new(2.0, 2.0), 1), 0);
        assert_eq!(iterations(Complex::new(2.0, 2.0), 5000), 0);
    }

    #[test]
    fn boundary_point_is_still_inside_the_radius() {
        // |c| == 2 is not yet escaped; the first step takes it to 6.
        assert_eq!(iterations(Complex::new(-2.0, 0.0), 50), 50);
        assert_eq!(iterations(Complex::new(2.0, 0.0), 50), 1);
    }

    #[test]
    fn results_stay_within_the_limit() {
        let limit = 64;
        for i in 0..40 {
            for j in 0..40 {
                let c = Complex::new(-2.5 + i as f64 * 0.1, -2.0 + j as f64 * 0.1);
                let n = iterations(c, limit);
                assert!(n <= limit, "{} exceeded {} at {}", n, limit, c);
            }
        }
    }

    #[test]
    fn limit_reached_only_by_bounded_orbits() {
        // Inside the main cardioid.
        assert_eq!(iterations(Complex::new(-0.1, 0.1), 500), 500);
        // Just outside: escapes, so strictly under the limit.
        assert!(iterations(Complex::new(0.5, 0.5), 500) < 500);
    }

    #[test]
    fn zero_limit_means_no_work() {
        assert_eq!(iterations(Complex::new(0.0, 0.0), 0), 0);
    }

    #[test]
    fn color_ramp_endpoints() {
        assert_eq!(color(0, 1000), 0);
        assert_eq!(color(1000, 1000), WHITE);
        assert_eq!(color(1, 1), WHITE);
        assert_eq!(color(0, 0), 0);
    }

    #[test]
    fn color_ramp_is_monotonic() {
        let limit = 777;
        let mut last = 0;
        for n in 0..=limit {
            let c = color(n, limit);
            assert!(c >= last);
            assert!(c <= WHITE);
            last = c;
        }
    }

    #[test]
    fn color_ramp_floors() {
        // 0xFFFFFF / 2 = 8388607.5
        assert_eq!(color(1, 2), 8_388_607);
    }
}
