//! The framing -> windowing -> transform -> extraction chain.

use qrss_spec::{ConfigError, Region, TransformConfig};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::extract::{MagnitudeColumn, SpectralExtractor};
use crate::frame::{FrameBuffer, SampleSource};
use crate::transform::{FftTransform, SpectralTransform};
use crate::window::Windower;

/// Errors that prevent a pipeline from starting.
#[derive(Debug, Error)]
pub enum SpectrumError {
    #[error("invalid transform configuration: {}", join_errors(.0))]
    Config(Vec<ConfigError>),

    #[error("pipeline thread failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One session's spectral pipeline.
///
/// Owns its frame buffer and transform; nothing is shared between
/// pipelines.
pub struct Pipeline {
    frame: FrameBuffer,
    windower: Windower,
    transform: Box<dyn SpectralTransform>,
    extractor: SpectralExtractor,
    finished: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("frame_size", &self.frame.len())
            .field("region", &self.extractor.region())
            .field("finished", &self.finished)
            .finish()
    }
}

impl Pipeline {
    /// Validate `config` and build a pipeline around a rustfft transform.
    ///
    /// Nothing is planned or allocated for a rejected configuration.
    pub fn new(config: &TransformConfig) -> Result<Self, SpectrumError> {
        config.validate().map_err(SpectrumError::Config)?;
        let transform = Box::new(FftTransform::new(config.frame_size()));
        Self::assemble(config, transform)
    }

    /// Build a pipeline around a caller-provided transform.
    pub fn with_transform(
        config: &TransformConfig,
        transform: Box<dyn SpectralTransform>,
    ) -> Result<Self, SpectrumError> {
        config.validate().map_err(SpectrumError::Config)?;
        Self::assemble(config, transform)
    }

    fn assemble(
        config: &TransformConfig,
        transform: Box<dyn SpectralTransform>,
    ) -> Result<Self, SpectrumError> {
        let extractor =
            SpectralExtractor::new(config).map_err(|e| SpectrumError::Config(vec![e]))?;
        Ok(Self {
            frame: FrameBuffer::new(config),
            windower: Windower::new(config),
            transform,
            extractor,
            finished: false,
        })
    }

    pub fn region(&self) -> Region {
        self.extractor.region()
    }

    /// Run one shift/load/shape/transform/extract cycle.
    ///
    /// Returns `None` once the source has ended. The frame that hits the
    /// end of stream is still analyzed if it got any fresh samples; a frame
    /// with no fresh samples is not.
    pub fn next_column<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Option<MagnitudeColumn> {
        if self.finished {
            return None;
        }

        self.frame.shift();
        let outcome = self.frame.load(source);
        if outcome.end_of_stream {
            self.finished = true;
        }
        if outcome.fresh == 0 {
            return None;
        }

        let shaped = self.windower.shape(self.frame.samples());
        let spectrum = self.transform.forward(shaped);
        Some(self.extractor.extract(spectrum))
    }

    /// Drain `source`, handing each column to `sink` until the source ends
    /// or `sink` returns `false`. Returns the number of columns produced.
    pub fn run<S, F>(&mut self, source: &mut S, mut sink: F) -> usize
    where
        S: SampleSource + ?Sized,
        F: FnMut(MagnitudeColumn) -> bool,
    {
        let mut produced = 0;
        while let Some(column) = self.next_column(source) {
            produced += 1;
            if !sink(column) {
                break;
            }
        }
        produced
    }
}

/// Running pipeline: the column queue plus the worker's join handle.
#[derive(Debug)]
pub struct PipelineHandle {
    /// Columns in production order; closes when the source ends.
    pub columns: mpsc::Receiver<MagnitudeColumn>,
    /// Resolves to the number of columns produced.
    pub worker: JoinHandle<usize>,
}

/// Run a pipeline on a blocking thread behind a bounded column queue.
///
/// The worker blocks when `capacity` columns are waiting, which holds the
/// sample intake back in turn. Dropping the receiver stops the worker
/// after its current frame.
///
/// Must be called from within a tokio runtime.
pub fn spawn_pipeline<S>(
    config: &TransformConfig,
    mut source: S,
    capacity: usize,
) -> Result<PipelineHandle, SpectrumError>
where
    S: SampleSource + Send + 'static,
{
    let mut pipeline = Pipeline::new(config)?;
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let worker = tokio::task::spawn_blocking(move || {
        let produced = pipeline.run(&mut source, |column| tx.blocking_send(column).is_ok());
        tracing::debug!(columns = produced, "spectral pipeline drained");
        produced
    });

    Ok(PipelineHandle {
        columns: rx,
        worker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::IterSource;
    use qrss_spec::MagnitudePolicy;
    use std::f64::consts::PI;

    fn config(policy: MagnitudePolicy) -> TransformConfig {
        TransformConfig {
            rate: 12000,
            fft_bits: 12,
            overlap: 0.5,
            center_hz: 1000,
            bandwidth_hz: 300,
            dc_removal: true,
            magnitude: policy,
            ..TransformConfig::default()
        }
    }

    fn tone(freq: f64, rate: u32, seconds: f64) -> IterSource<impl Iterator<Item = i16>> {
        let n = (rate as f64 * seconds) as usize;
        IterSource::new(
            (0..n).map(move |i| (8000.0 * (2.0 * PI * freq * i as f64 / rate as f64).sin()) as i16),
        )
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        for policy in [MagnitudePolicy::Log, MagnitudePolicy::SymmetricSqrt] {
            let cfg = config(policy);
            for freq in [900.0, 1000.0, 1111.0] {
                let mut pipeline = Pipeline::new(&cfg).unwrap();
                let region = pipeline.region();
                let mut source = tone(freq, cfg.rate, 2.0);

                // Skip the first frame, which still holds the initial zeros.
                pipeline.next_column(&mut source).unwrap();
                let column = pipeline.next_column(&mut source).unwrap();
                let peak = column.peak().unwrap();
                let peak_hz = region.frequency_of(peak, &cfg);
                assert!(
                    (peak_hz - freq).abs() <= cfg.bin_hz(),
                    "{policy}: peak {peak_hz} Hz for a {freq} Hz tone"
                );
            }
        }
    }

    #[test]
    fn test_column_count_follows_hop() {
        let cfg = config(MagnitudePolicy::Log);
        let mut pipeline = Pipeline::new(&cfg).unwrap();
        // Exactly 10 hops of fresh samples.
        let mut source = IterSource::new(std::iter::repeat(0i16).take(cfg.hop() * 10));
        let produced = pipeline.run(&mut source, |_| true);
        assert_eq!(produced, 10);
        assert!(pipeline.next_column(&mut source).is_none());
    }

    #[test]
    fn test_partial_last_frame_is_analyzed() {
        let cfg = config(MagnitudePolicy::Log);
        let mut pipeline = Pipeline::new(&cfg).unwrap();
        let mut source = IterSource::new(std::iter::repeat(1i16).take(cfg.hop() * 3 + 5));
        assert_eq!(pipeline.run(&mut source, |_| true), 4);
    }

    #[test]
    fn test_empty_stream_yields_no_columns() {
        let cfg = config(MagnitudePolicy::Log);
        let mut pipeline = Pipeline::new(&cfg).unwrap();
        let mut source = IterSource::new(std::iter::empty::<i16>());
        assert!(pipeline.next_column(&mut source).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = TransformConfig {
            overlap: 1.5,
            ..config(MagnitudePolicy::Log)
        };
        let err = Pipeline::new(&cfg).unwrap_err();
        assert!(err.to_string().contains("overlap 1.5"));
    }

    #[test]
    fn test_out_of_range_frame_bits_rejected() {
        for fft_bits in [0, 7, 21, 30, 64, u32::MAX] {
            let cfg = TransformConfig {
                fft_bits,
                ..config(MagnitudePolicy::Log)
            };
            match Pipeline::new(&cfg) {
                Err(SpectrumError::Config(errors)) => {
                    assert!(errors.contains(&ConfigError::FrameBits(fft_bits)));
                }
                other => panic!("fft_bits {fft_bits}: expected a config error, got {other:?}"),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawned_pipeline_preserves_order() {
        let cfg = TransformConfig {
            overlap: 0.0,
            dc_removal: false,
            ..config(MagnitudePolicy::Log)
        };
        let hop = cfg.hop();
        // Silent frames followed by one frame of tone.
        let samples: Vec<i16> = (0..hop * 4)
            .map(|i| {
                if i >= hop * 3 {
                    (3000.0 * (2.0 * PI * 1000.0 * i as f64 / 12000.0).sin()) as i16
                } else {
                    0
                }
            })
            .collect();
        let mut handle =
            spawn_pipeline(&cfg, IterSource::new(samples.into_iter()), 1).unwrap();

        let mut columns = Vec::new();
        while let Some(column) = handle.columns.recv().await {
            columns.push(column);
        }
        assert_eq!(handle.worker.await.unwrap(), 4);
        assert_eq!(columns.len(), 4);
        assert!(columns[0].iter().all(|&v| v == 0.0));
        assert!(columns[3].iter().any(|&v| v > 0.0));
    }
}
