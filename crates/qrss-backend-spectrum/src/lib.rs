//! QRSS Spectral Pipeline
//!
//! Turns a stream of 16-bit audio samples into a stream of magnitude
//! columns, one per overlapping analysis frame:
//!
//! ```text
//! samples -> FrameBuffer -> Windower -> SpectralTransform -> SpectralExtractor -> MagnitudeColumn
//! ```
//!
//! - [`FrameBuffer`] keeps the overlapping window and refills it each cycle.
//! - [`Windower`] tapers the frame edges and optionally removes DC.
//! - [`FftTransform`] is the rustfft-backed [`SpectralTransform`].
//! - [`SpectralExtractor`] selects the region of interest and converts
//!   bins with the configured [`MagnitudePolicy`](qrss_spec::MagnitudePolicy).
//! - [`Pipeline`] chains them; [`spawn_pipeline`] runs a pipeline on a
//!   blocking thread behind a bounded column queue.
//!
//! # Example
//!
//! ```
//! use qrss_backend_spectrum::{IterSource, Pipeline};
//! use qrss_spec::TransformConfig;
//!
//! let config = TransformConfig { fft_bits: 10, ..TransformConfig::default() };
//! let mut source = IterSource::new(std::iter::repeat(0i16).take(12000));
//! let mut pipeline = Pipeline::new(&config).unwrap();
//!
//! let mut columns = 0;
//! while let Some(column) = pipeline.next_column(&mut source) {
//!     assert_eq!(column.len(), pipeline.region().len());
//!     columns += 1;
//! }
//! assert!(columns > 0);
//! ```

pub mod extract;
pub mod frame;
pub mod pipeline;
pub mod transform;
pub mod window;

pub use extract::{MagnitudeColumn, SpectralExtractor, LOG_MAGNITUDE_CEILING};
pub use frame::{FrameBuffer, IterSource, LoadOutcome, SampleSource};
pub use pipeline::{spawn_pipeline, Pipeline, PipelineHandle, SpectrumError};
pub use transform::{FftTransform, SpectralTransform};
pub use window::Windower;
