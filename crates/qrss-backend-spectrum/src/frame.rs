//! Overlapping frame buffer and the blocking sample-source seam.

use qrss_spec::TransformConfig;

/// A blocking source of audio samples.
pub trait SampleSource {
    /// Write the next samples into `out`, blocking until at least one is
    /// available.
    ///
    /// Returns the number of samples written. `0` means the stream has
    /// ended and will not produce more.
    fn read(&mut self, out: &mut [f64]) -> usize;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read(&mut self, out: &mut [f64]) -> usize {
        (**self).read(out)
    }
}

/// Adapts any `i16` iterator into a [`SampleSource`].
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator<Item = i16>> IterSource<I> {
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator<Item = i16>> SampleSource for IterSource<I> {
    fn read(&mut self, out: &mut [f64]) -> usize {
        let mut n = 0;
        for slot in out.iter_mut() {
            match self.iter.next() {
                Some(s) => {
                    *slot = s as f64;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }
}

/// Result of one [`FrameBuffer::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Samples taken from the source in this load.
    pub fresh: usize,
    /// The source ended before the frame was full; the rest is zeros.
    pub end_of_stream: bool,
}

/// Fixed-length analysis window with overlap carry-over.
///
/// Each cycle is [`shift`](Self::shift) followed by [`load`](Self::load):
/// the last `retained` samples move to the front and the remaining
/// `len - retained` positions are refilled from the source.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    samples: Vec<f64>,
    retained: usize,
}

impl FrameBuffer {
    /// Allocate a zeroed buffer sized from `config`.
    pub fn new(config: &TransformConfig) -> Self {
        Self::with_size(config.frame_size(), config.retained())
    }

    /// Allocate a zeroed buffer of `len` samples, carrying `retained` over.
    ///
    /// Every cycle must take at least one fresh sample, so `retained` is
    /// clamped to `len - 1`.
    pub fn with_size(len: usize, retained: usize) -> Self {
        Self {
            samples: vec![0.0; len],
            retained: retained.min(len.saturating_sub(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples carried from one frame into the next.
    pub fn retained(&self) -> usize {
        self.retained
    }

    /// Current frame contents.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Move the overlapping tail to the front of the buffer.
    pub fn shift(&mut self) {
        let len = self.samples.len();
        self.samples.copy_within(len - self.retained.., 0);
    }

    /// Refill everything after the carried-over samples from `source`.
    ///
    /// Blocks in `source` until the frame is full or the source ends; on
    /// end of stream the unfilled positions are zeroed.
    pub fn load<S: SampleSource + ?Sized>(&mut self, source: &mut S) -> LoadOutcome {
        let region = &mut self.samples[self.retained..];
        let mut filled = 0;
        let mut end_of_stream = false;

        while filled < region.len() {
            let n = source.read(&mut region[filled..]);
            if n == 0 {
                end_of_stream = true;
                break;
            }
            filled += n;
        }
        region[filled..].fill(0.0);

        LoadOutcome {
            fresh: filled,
            end_of_stream,
        }
    }
}
