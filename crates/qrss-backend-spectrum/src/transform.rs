//! The discrete Fourier transform seam.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Real-input forward transform.
///
/// Implementations return a spectrum with exactly as many bins as the
/// input frame has samples.
pub trait SpectralTransform: Send {
    fn forward(&mut self, frame: &[f64]) -> &[Complex<f64>];
}

/// rustfft-backed transform for a fixed frame size.
pub struct FftTransform {
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl FftTransform {
    /// Plan a forward FFT of `size` points.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
        }
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }
}

impl std::fmt::Debug for FftTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftTransform")
            .field("size", &self.buffer.len())
            .finish()
    }
}

impl SpectralTransform for FftTransform {
    fn forward(&mut self, frame: &[f64]) -> &[Complex<f64>] {
        debug_assert_eq!(frame.len(), self.buffer.len());
        for (slot, &s) in self.buffer.iter_mut().zip(frame) {
            *slot = Complex::new(s, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        &self.buffer
    }
}
