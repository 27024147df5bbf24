//! Edge tapering and DC removal.

use std::f64::consts::PI;

use qrss_spec::TransformConfig;

/// Shapes a frame before the transform.
///
/// The first and last `ramp_len` samples are multiplied by a raised
/// cosine that starts at 0 and rises toward 1; the middle of the frame
/// passes through unchanged. With `dc_removal` the mean of the tapered
/// frame is then subtracted from every sample.
#[derive(Debug, Clone)]
pub struct Windower {
    ramp: Vec<f64>,
    dc_removal: bool,
    shaped: Vec<f64>,
}

impl Windower {
    pub fn new(config: &TransformConfig) -> Self {
        Self::with_ramp(config.ramp_len(), config.dc_removal)
    }

    /// Build a windower with an explicit ramp length.
    pub fn with_ramp(ramp_len: usize, dc_removal: bool) -> Self {
        let ramp = (0..ramp_len)
            .map(|i| 0.5 * (1.0 - (PI * i as f64 / ramp_len as f64).cos()))
            .collect();
        Self {
            ramp,
            dc_removal,
            shaped: Vec::new(),
        }
    }

    pub fn ramp_len(&self) -> usize {
        self.ramp.len()
    }

    pub fn dc_removal(&self) -> bool {
        self.dc_removal
    }

    /// Taper `frame` into an internal buffer and return it.
    ///
    /// Frames shorter than two ramps only get as much ramp as fits.
    pub fn shape(&mut self, frame: &[f64]) -> &[f64] {
        self.shaped.clear();
        self.shaped.extend_from_slice(frame);

        let n = self.shaped.len();
        let ramp = self.ramp.len().min(n / 2);
        for (i, w) in self.ramp[..ramp].iter().enumerate() {
            self.shaped[i] *= w;
            self.shaped[n - 1 - i] *= w;
        }

        if self.dc_removal && n > 0 {
            let mean = self.shaped.iter().sum::<f64>() / n as f64;
            for s in &mut self.shaped {
                *s -= mean;
            }
        }

        &self.shaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_passes_through() {
        let config = TransformConfig {
            fft_bits: 10,
            dc_removal: false,
            ..TransformConfig::default()
        };
        let frame: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.37).sin() * 1000.0).collect();
        let mut windower = Windower::new(&config);
        let ramp = windower.ramp_len();
        assert_eq!(ramp, 120);

        let shaped = windower.shape(&frame);
        assert_eq!(&shaped[ramp..1024 - ramp], &frame[ramp..1024 - ramp]);
        assert_eq!(shaped[0], 0.0);
        assert_eq!(shaped[1023], 0.0);
    }

    #[test]
    fn test_ramp_is_monotonic_and_symmetric() {
        let frame = vec![1.0; 64];
        let mut windower = Windower::with_ramp(16, false);
        let shaped = windower.shape(&frame).to_vec();
        for i in 1..16 {
            assert!(shaped[i] > shaped[i - 1]);
            assert_eq!(shaped[i], shaped[63 - i]);
        }
        assert!(shaped[15] < 1.0);
        assert_eq!(shaped[16], 1.0);
    }

    #[test]
    fn test_dc_removal_zeroes_mean() {
        let frame: Vec<f64> = (0..256).map(|i| 500.0 + (i % 7) as f64).collect();
        let mut windower = Windower::with_ramp(20, true);
        let shaped = windower.shape(&frame);
        let mean = shaped.iter().sum::<f64>() / shaped.len() as f64;
        assert!(mean.abs() < 1e-9);
    }

    #[test]
    fn test_dc_removal_is_optional() {
        let frame = vec![500.0; 256];
        let mut windower = Windower::with_ramp(20, false);
        let shaped = windower.shape(&frame);
        assert_eq!(shaped[128], 500.0);
    }

    #[test]
    fn test_ramp_clipped_for_tiny_frames() {
        let mut windower = Windower::with_ramp(10, false);
        let shaped = windower.shape(&[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(shaped[0], 0.0);
        assert_eq!(shaped[3], 0.0);
    }
}
