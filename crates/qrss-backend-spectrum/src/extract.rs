//! Region-of-interest selection and magnitude conversion.

use std::ops::Deref;

use qrss_spec::{ConfigError, MagnitudePolicy, Region, TransformConfig};
use rustfft::num_complex::Complex;

/// Upper clamp of the log policy, keeps near-silent bins from saturating.
pub const LOG_MAGNITUDE_CEILING: f64 = 65000.0;

/// Display magnitudes of one frame, lowest frequency first.
///
/// Values are non-negative and there is exactly one per bin of the
/// region of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeColumn(Vec<f64>);

impl MagnitudeColumn {
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Index of the largest magnitude; the first one wins ties.
    pub fn peak(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in self.0.iter().enumerate() {
            if best.map_or(true, |(_, b)| v > b) {
                best = Some((i, v));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl From<Vec<f64>> for MagnitudeColumn {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl Deref for MagnitudeColumn {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Picks the region of interest out of a spectrum.
#[derive(Debug, Clone)]
pub struct SpectralExtractor {
    region: Region,
    policy: MagnitudePolicy,
    frame_size: usize,
}

impl SpectralExtractor {
    /// Build an extractor, rejecting configurations whose region is empty
    /// or falls outside `[0, frame_size / 2)`.
    pub fn new(config: &TransformConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            region: config.region()?,
            policy: config.magnitude,
            frame_size: config.frame_size(),
        })
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn policy(&self) -> MagnitudePolicy {
        self.policy
    }

    /// Convert `spectrum[lo..hi]` into display magnitudes.
    pub fn extract(&self, spectrum: &[Complex<f64>]) -> MagnitudeColumn {
        debug_assert_eq!(spectrum.len(), self.frame_size);
        let bins = self.region.lo..self.region.hi;

        let values = match self.policy {
            MagnitudePolicy::Log => bins.map(|b| log_magnitude(spectrum[b].norm())).collect(),
            MagnitudePolicy::SymmetricSqrt => bins
                .map(|b| {
                    let mirror = (self.frame_size - b) % self.frame_size;
                    (spectrum[b].norm().sqrt() + spectrum[mirror].norm().sqrt()) / 2.0
                })
                .collect(),
        };
        MagnitudeColumn(values)
    }
}

/// `1000 * log10(abs)` clamped to `[0, LOG_MAGNITUDE_CEILING]`.
fn log_magnitude(abs: f64) -> f64 {
    let v = 1000.0 * abs.log10();
    if v.is_nan() || v < 0.0 {
        0.0
    } else {
        v.min(LOG_MAGNITUDE_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum_with(n: usize, bins: &[(usize, f64)]) -> Vec<Complex<f64>> {
        let mut s = vec![Complex::new(0.0, 0.0); n];
        for &(b, v) in bins {
            s[b] = Complex::new(v, 0.0);
        }
        s
    }

    fn config(policy: MagnitudePolicy) -> TransformConfig {
        TransformConfig {
            fft_bits: 10,
            center_hz: 1000,
            bandwidth_hz: 300,
            magnitude: policy,
            ..TransformConfig::default()
        }
    }

    #[test]
    fn test_log_policy_values() {
        let extractor = SpectralExtractor::new(&config(MagnitudePolicy::Log)).unwrap();
        let region = extractor.region();
        let spectrum = spectrum_with(1024, &[(region.lo, 100.0), (region.lo + 1, 0.5)]);
        let column = extractor.extract(&spectrum);

        assert_eq!(column.len(), region.len());
        assert!((column[0] - 2000.0).abs() < 1e-9);
        // Below one and exactly zero both clamp to zero.
        assert_eq!(column[1], 0.0);
        assert_eq!(column[2], 0.0);
    }

    #[test]
    fn test_log_policy_ceiling() {
        assert_eq!(log_magnitude(1e300), LOG_MAGNITUDE_CEILING);
        assert_eq!(log_magnitude(f64::INFINITY), LOG_MAGNITUDE_CEILING);
        assert_eq!(log_magnitude(0.0), 0.0);
    }

    #[test]
    fn test_sqrt_policy_averages_mirror() {
        let extractor = SpectralExtractor::new(&config(MagnitudePolicy::SymmetricSqrt)).unwrap();
        let lo = extractor.region().lo;
        let spectrum = spectrum_with(1024, &[(lo, 16.0), (1024 - lo, 4.0)]);
        let column = extractor.extract(&spectrum);
        assert!((column[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_length_is_stable() {
        for policy in [MagnitudePolicy::Log, MagnitudePolicy::SymmetricSqrt] {
            let extractor = SpectralExtractor::new(&config(policy)).unwrap();
            let a = extractor.extract(&spectrum_with(1024, &[]));
            let b = extractor.extract(&spectrum_with(1024, &[(80, 1.0)]));
            assert_eq!(a.len(), b.len());
            assert_eq!(a.len(), extractor.region().len());
        }
    }

    #[test]
    fn test_rejects_bad_region() {
        let bad = TransformConfig {
            center_hz: 50,
            ..config(MagnitudePolicy::Log)
        };
        assert!(SpectralExtractor::new(&bad).is_err());
    }

    #[test]
    fn test_peak() {
        let column = MagnitudeColumn::from(vec![1.0, 5.0, 3.0, 5.0]);
        assert_eq!(column.peak(), Some(1));
        assert_eq!(MagnitudeColumn::from(Vec::new()).peak(), None);
    }
}
