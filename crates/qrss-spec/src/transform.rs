//! Per-session transform configuration and region-of-interest math.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{collect, ConfigError};

/// Smallest supported frame size exponent (256-point frames).
pub const MIN_FFT_BITS: u32 = 8;

/// Largest supported frame size exponent.
pub const MAX_FFT_BITS: u32 = 20;

/// How spectrum bins are turned into display magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudePolicy {
    /// `1000 * log10(|X[bin]|)`, clamped to `[0, 65000]`.
    #[default]
    Log,
    /// Mean of the square-root magnitudes of a bin and its mirror bin.
    SymmetricSqrt,
}

impl MagnitudePolicy {
    const NAMES: &'static str = "log, sqrt";
}

impl FromStr for MagnitudePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(MagnitudePolicy::Log),
            "sqrt" | "symmetric_sqrt" => Ok(MagnitudePolicy::SymmetricSqrt),
            other => Err(ConfigError::UnknownPolicy {
                kind: "magnitude",
                value: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for MagnitudePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MagnitudePolicy::Log => write!(f, "log"),
            MagnitudePolicy::SymmetricSqrt => write!(f, "sqrt"),
        }
    }
}

/// Immutable parameters of one spectral pipeline.
///
/// Frequencies are in Hz. `center_hz` is an audio offset from the tuned
/// `base_hz`, so the region of interest only depends on `center_hz` and
/// `bandwidth_hz`; `base_hz` is carried for labelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Samples per second delivered by the intake.
    pub rate: u32,
    /// Tuned receiver frequency.
    pub base_hz: i64,
    /// Center of the region of interest, relative to `base_hz`.
    pub center_hz: i64,
    /// Width of the region of interest.
    pub bandwidth_hz: i64,
    /// Frame size as a power-of-two exponent.
    pub fft_bits: u32,
    /// Fraction of each frame carried into the next, in `[0, 1)`.
    pub overlap: f64,
    /// Subtract the frame mean after tapering.
    pub dc_removal: bool,
    /// Magnitude conversion applied to the region of interest.
    pub magnitude: MagnitudePolicy,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            rate: 12000,
            base_hz: 0,
            center_hz: 1000,
            bandwidth_hz: 300,
            fft_bits: 14,
            overlap: 0.5,
            dc_removal: true,
            magnitude: MagnitudePolicy::Log,
        }
    }
}

impl TransformConfig {
    /// Number of samples per frame.
    pub fn frame_size(&self) -> usize {
        1usize << self.fft_bits
    }

    /// Samples carried over from one frame into the next.
    pub fn retained(&self) -> usize {
        (self.overlap * self.frame_size() as f64).floor() as usize
    }

    /// Fresh samples loaded per frame.
    pub fn hop(&self) -> usize {
        self.frame_size() - self.retained()
    }

    /// Half the sample rate.
    pub fn nyquist(&self) -> f64 {
        self.rate as f64 / 2.0
    }

    /// Width of one bin in Hz.
    pub fn bin_hz(&self) -> f64 {
        self.rate as f64 / self.frame_size() as f64
    }

    /// Seconds between successive frames.
    pub fn frame_seconds(&self) -> f64 {
        self.hop() as f64 / self.rate as f64
    }

    /// Length of the raised-cosine taper at each frame edge: 10 ms of
    /// samples, never more than half a frame.
    pub fn ramp_len(&self) -> usize {
        (self.rate as usize / 100).min(self.frame_size() / 2)
    }

    /// Bin index of an audio offset, `floor(N * offset / rate)`.
    ///
    /// `half_hz` is the offset in half-Hz units so that odd bandwidths stay
    /// exact.
    fn bin_of_half_hz(&self, half_hz: i128) -> i128 {
        let n = self.frame_size() as i128;
        let den = 2 * self.rate as i128;
        (n * half_hz).div_euclid(den)
    }

    /// Compute the half-open bin range `[lo, hi)` of the region of interest.
    pub fn region(&self) -> Result<Region, ConfigError> {
        if self.rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        if !(MIN_FFT_BITS..=MAX_FFT_BITS).contains(&self.fft_bits) {
            return Err(ConfigError::FrameBits(self.fft_bits));
        }
        if self.bandwidth_hz <= 0 {
            return Err(ConfigError::Bandwidth(self.bandwidth_hz));
        }

        // Widened so that any i64 center and bandwidth stay exact.
        let center = self.center_hz as i128;
        let bw = self.bandwidth_hz as i128;
        let lo_half = 2 * center - bw;
        let hi_half = 2 * center + bw;
        if lo_half < 0 {
            return Err(ConfigError::RegionBelowZero {
                center: self.center_hz,
                half_bw: self.bandwidth_hz / 2,
            });
        }

        let limit = self.frame_size() / 2;
        let hi = self.bin_of_half_hz(hi_half);
        if hi >= limit as i128 {
            return Err(ConfigError::RegionAboveNyquist {
                hi: usize::try_from(hi).unwrap_or(usize::MAX),
                limit,
            });
        }
        let hi = hi as usize;
        let lo = self.bin_of_half_hz(lo_half) as usize;
        if lo >= hi {
            return Err(ConfigError::EmptyRegion { lo, hi });
        }
        Ok(Region { lo, hi })
    }

    /// Check every invariant, returning all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if !(self.overlap.is_finite() && (0.0..1.0).contains(&self.overlap)) {
            errors.push(ConfigError::Overlap(self.overlap));
        }
        if let Err(e) = self.region() {
            errors.push(e);
        }
        collect(errors)
    }
}

/// Half-open bin range `[lo, hi)` of the region of interest.
///
/// Every magnitude column produced for a configuration has exactly
/// [`Region::len`] values, lowest frequency first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// First bin, inclusive.
    pub lo: usize,
    /// Last bin, exclusive.
    pub hi: usize,
}

impl Region {
    /// Number of bins in the region.
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// Always false for a validated region.
    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }

    /// Audio frequency in Hz of the `index`-th bin of a column.
    pub fn frequency_of(&self, index: usize, config: &TransformConfig) -> f64 {
        (self.lo + index) as f64 * config.bin_hz()
    }
}
