//! QRSS Sample Intake
//!
//! Everything that produces audio samples for the spectral pipeline:
//!
//! - [`Intake`]: opens a time-bounded live stream for one band
//! - [`KiwiIntake`]: KiwiSDR receiver over WebSocket
//! - [`SilenceIntake`] and [`ToneIntake`]: generated sources
//! - [`read_wav`] and [`read_raw`]: offline files
//!
//! Live intakes feed a bounded [`SampleStream`] from an async task; the
//! stream implements [`SampleSource`](qrss_backend_spectrum::SampleSource)
//! and is read from a blocking worker thread.

pub mod error;
pub mod file;
pub mod kiwi;
pub mod stream;
pub mod synthetic;

use std::time::Duration;

use qrss_spec::Band;

pub use error::IntakeError;
pub use file::{read_raw, read_wav, WavAudio, DEFAULT_WAV_RATES};
pub use kiwi::{KiwiIntake, TuningOptions};
pub use stream::{Capture, SampleStream, SAMPLE_QUEUE_PACKETS};
pub use synthetic::{SilenceIntake, ToneIntake};

/// A source of live audio for one band.
pub trait Intake: Send + Sync {
    /// Start receiving audio for `band` for `duration`.
    ///
    /// Must be called from inside a tokio runtime; the feeding task is
    /// spawned onto it. The returned stream may end early.
    fn open(&self, band: &Band, duration: Duration) -> Result<Capture, IntakeError>;
}
