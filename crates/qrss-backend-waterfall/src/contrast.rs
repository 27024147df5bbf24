//! Contrast policies: magnitude -> pixel.

use qrss_spec::ContrastPolicy;

use crate::raster::Rgb16;
use crate::stats::Statistics;

/// Full-scale channel value.
pub const MAX_INTENSITY: u16 = u16::MAX;

const BLACK: Rgb16 = [0, 0, 0];

/// A contrast policy resolved against one session's statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContrastMap {
    /// Grayscale stretch of `[floor, floor + span]` to full range.
    Midpoint { floor: f64, span: f64 },
    /// Three σ-wide bands starting at `start`, driving green, red and blue.
    Banded { start: f64, sigma: f64 },
    /// No spread in the data; everything is black.
    Flat,
}

/// Clamp `x` to `[0, 1]` and scale to a channel value, truncating.
fn channel(x: f64) -> u16 {
    (x.clamp(0.0, 1.0) * MAX_INTENSITY as f64) as u16
}

impl ContrastMap {
    /// Resolve `policy` for `stats`.
    ///
    /// Degenerate statistics (no values, `max` not above the midpoint
    /// floor, or zero standard deviation) resolve to [`ContrastMap::Flat`].
    pub fn resolve(policy: ContrastPolicy, stats: &Statistics) -> Self {
        if stats.is_empty() {
            return ContrastMap::Flat;
        }
        match policy {
            ContrastPolicy::Midpoint => {
                let floor = (stats.min + stats.mean()) / 2.0;
                let span = stats.max - floor;
                if span > 0.0 && span.is_finite() {
                    ContrastMap::Midpoint { floor, span }
                } else {
                    ContrastMap::Flat
                }
            }
            ContrastPolicy::Banded => {
                let sigma = stats.std_dev();
                if sigma > 0.0 && sigma.is_finite() {
                    ContrastMap::Banded {
                        start: stats.mean() + sigma,
                        sigma,
                    }
                } else {
                    ContrastMap::Flat
                }
            }
        }
    }

    /// Color of one magnitude.
    pub fn pixel(&self, value: f64) -> Rgb16 {
        match *self {
            ContrastMap::Midpoint { floor, span } => {
                let c = channel((value - floor) / span);
                [c, c, c]
            }
            ContrastMap::Banded { start, sigma } => {
                let green = channel((value - start) / sigma);
                let red = channel((value - start - sigma) / sigma);
                let blue = channel((value - start - 2.0 * sigma) / sigma / 3.0);
                [red, green, blue]
            }
            ContrastMap::Flat => BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(values: &[f64]) -> Statistics {
        let mut s = Statistics::new();
        s.extend(values);
        s
    }

    #[test]
    fn test_midpoint_floor_and_max() {
        // min 0, mean 4, floor 2, max 10.
        let s = stats(&[0.0, 2.0, 4.0, 4.0, 10.0]);
        let map = ContrastMap::resolve(ContrastPolicy::Midpoint, &s);
        assert_eq!(map, ContrastMap::Midpoint { floor: 2.0, span: 8.0 });
        assert_eq!(map.pixel(0.0), [0, 0, 0]);
        assert_eq!(map.pixel(2.0), [0, 0, 0]);
        assert_eq!(map.pixel(10.0), [MAX_INTENSITY; 3]);
        assert_eq!(map.pixel(6.0), [32767; 3]);
    }

    #[test]
    fn test_banded_ramp() {
        // mean 3, sample sigma 3: bands start at 6, 9 and 12.
        let s = stats(&[0.0, 3.0, 6.0]);
        let map = ContrastMap::resolve(ContrastPolicy::Banded, &s);
        assert_eq!(map, ContrastMap::Banded { start: 6.0, sigma: 3.0 });
        let (start, sigma) = (6.0, 3.0);

        assert_eq!(map.pixel(start), [0, 0, 0]);
        // Top of band 1: full green, no red yet.
        assert_eq!(map.pixel(start + sigma), [0, MAX_INTENSITY, 0]);
        // Top of band 2: yellow.
        assert_eq!(map.pixel(start + 2.0 * sigma), [MAX_INTENSITY, MAX_INTENSITY, 0]);
        // Top of band 3: blue at a third.
        assert_eq!(
            map.pixel(start + 3.0 * sigma),
            [MAX_INTENSITY, MAX_INTENSITY, MAX_INTENSITY / 3]
        );
        // Far above: every channel clamps.
        assert_eq!(map.pixel(start + 100.0 * sigma), [MAX_INTENSITY, MAX_INTENSITY, MAX_INTENSITY]);
    }

    #[test]
    fn test_flat_input_is_dark() {
        let s = stats(&[0.0; 64]);
        for policy in [ContrastPolicy::Midpoint, ContrastPolicy::Banded] {
            let map = ContrastMap::resolve(policy, &s);
            assert_eq!(map, ContrastMap::Flat);
            assert_eq!(map.pixel(0.0), [0, 0, 0]);
        }
        assert_eq!(
            ContrastMap::resolve(ContrastPolicy::Midpoint, &Statistics::new()),
            ContrastMap::Flat
        );
    }
}
