//! Configuration error types.

use thiserror::Error;

use crate::transform::{MAX_FFT_BITS, MIN_FFT_BITS};

/// A configuration problem detected before any scheduler starts.
///
/// Validation collects every error it can find rather than stopping at the
/// first one, so the caller usually receives a `Vec<ConfigError>`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A band tuple did not have exactly five fields.
    #[error("band {index}: expected 5 fields label:host:base:center:bw, got {found} in {tuple:?}")]
    BandFieldCount {
        index: usize,
        tuple: String,
        found: usize,
    },

    /// A numeric band field failed to parse.
    #[error("band {index}: {field} {value:?} is not an integer")]
    BandNumber {
        index: usize,
        field: &'static str,
        value: String,
    },

    /// A band label is empty or would escape the spool directory.
    #[error("band {index}: label {label:?} is not a safe file name")]
    UnsafeLabel { index: usize, label: String },

    /// A band host is empty.
    #[error("band {index}: empty receiver host")]
    EmptyHost { index: usize },

    /// Two bands share a label and would write to the same files.
    #[error("duplicate band label {0:?}")]
    DuplicateLabel(String),

    /// No bands were configured.
    #[error("no bands configured")]
    NoBands,

    /// The sample rate is zero.
    #[error("sample rate must be positive")]
    SampleRate,

    /// Overlap fraction outside `[0, 1)`.
    #[error("overlap {0} must be in [0, 1)")]
    Overlap(f64),

    /// Frame size exponent outside the supported range.
    #[error("frame size exponent {0} outside [{MIN_FFT_BITS}, {MAX_FFT_BITS}]")]
    FrameBits(u32),

    /// Bandwidth of interest is not positive.
    #[error("bandwidth {0} Hz must be positive")]
    Bandwidth(i64),

    /// The lower edge of the region of interest is below 0 Hz.
    #[error("region of interest {center}Hz +- {half_bw}Hz starts below 0 Hz")]
    RegionBelowZero { center: i64, half_bw: i64 },

    /// The region of interest covers no whole bin.
    #[error("region of interest covers no bins: [{lo}, {hi})")]
    EmptyRegion { lo: usize, hi: usize },

    /// The region of interest reaches the Nyquist bin.
    #[error("region of interest upper bin {hi} must be below {limit}")]
    RegionAboveNyquist { hi: usize, limit: usize },

    /// The period leaves no recording time after the hand-off gap.
    #[error("period {period}s must be longer than the hand-off gap {gap}s")]
    Period { period: u64, gap: u64 },

    /// The last band's stagger reaches into the next period.
    #[error("stagger {stagger}s over {bands} bands must end before the {period}s period does")]
    Stagger { stagger: u64, bands: usize, period: u64 },

    /// The imprint glyph scale is zero.
    #[error("imprint scale must be at least 1")]
    ImprintScale,

    /// The imprint template names an unknown placeholder.
    #[error("unknown imprint placeholder {{{0}}}")]
    ImprintPlaceholder(String),

    /// A policy name did not match any known policy.
    #[error("unknown {kind} policy {value:?} (expected one of: {expected})")]
    UnknownPolicy {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Collapse a list of errors into a single `Result`.
pub(crate) fn collect(errors: Vec<ConfigError>) -> Result<(), Vec<ConfigError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
