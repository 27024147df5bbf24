//! Global grabber configuration.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::band::Band;
use crate::error::{collect, ConfigError};
use crate::imprint::ImprintTemplate;
use crate::transform::{MagnitudePolicy, TransformConfig};

/// How global statistics are mapped to pixel intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastPolicy {
    /// Grayscale, `[(min + mean) / 2, max]` stretched to full range.
    #[default]
    Midpoint,
    /// Green/red/blue heat ramp over three standard-deviation bands.
    Banded,
}

impl FromStr for ContrastPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "midpoint" => Ok(ContrastPolicy::Midpoint),
            "banded" => Ok(ContrastPolicy::Banded),
            other => Err(ConfigError::UnknownPolicy {
                kind: "contrast",
                value: other.to_string(),
                expected: "midpoint, banded",
            }),
        }
    }
}

impl fmt::Display for ContrastPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContrastPolicy::Midpoint => write!(f, "midpoint"),
            ContrastPolicy::Banded => write!(f, "banded"),
        }
    }
}

/// Everything the `grab` loop needs, for all bands.
///
/// Deserializes from JSON with every field optional except `bands`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    pub bands: Vec<Band>,
    /// Samples per second requested from the receiver.
    pub rate: u32,
    /// Frame size exponent.
    pub fft_bits: u32,
    /// Overlap fraction between frames.
    pub overlap: f64,
    /// Length of one period in seconds; should divide 86400.
    pub period_secs: u64,
    /// Pause reserved at the end of each period for receiver hand-off.
    pub gap_secs: u64,
    /// Extra delay per band index, so bands do not connect at the same instant.
    pub stagger_secs: u64,
    /// Number of sessions per band; negative runs forever.
    pub times: i64,
    /// Receiver automatic gain control.
    pub agc: bool,
    /// Receiver manual gain, used when `agc` is off.
    pub manual_gain: u32,
    /// Receiver port.
    pub port: u16,
    /// Name announced to the receiver.
    pub identify: String,
    /// Spool directory for images.
    pub spool: PathBuf,
    pub imprint: ImprintTemplate,
    /// Pixel scale of imprint glyphs.
    pub imprint_scale: u32,
    pub dc_removal: bool,
    pub magnitude: MagnitudePolicy,
    pub contrast: ContrastPolicy,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            bands: Vec::new(),
            rate: 12000,
            fft_bits: 15,
            overlap: 0.5,
            period_secs: 60,
            gap_secs: 2,
            stagger_secs: 1,
            times: -1,
            agc: false,
            manual_gain: 50,
            port: 8073,
            identify: "QRSS/grabber".to_string(),
            spool: PathBuf::from("/tmp/spool"),
            imprint: ImprintTemplate::default(),
            imprint_scale: 1,
            dc_removal: true,
            magnitude: MagnitudePolicy::Log,
            contrast: ContrastPolicy::Midpoint,
        }
    }
}

impl GrabConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(std::io::Error::from)
    }

    /// Transform parameters for one band.
    pub fn transform_for(&self, band: &Band) -> TransformConfig {
        TransformConfig {
            rate: self.rate,
            base_hz: band.base_hz,
            center_hz: band.center_hz,
            bandwidth_hz: band.bandwidth_hz,
            fft_bits: self.fft_bits,
            overlap: self.overlap,
            dc_removal: self.dc_removal,
            magnitude: self.magnitude,
        }
    }

    /// Seconds each session records for.
    pub fn recording_secs(&self) -> u64 {
        self.period_secs.saturating_sub(self.gap_secs)
    }

    /// Check the whole configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.bands.is_empty() {
            errors.push(ConfigError::NoBands);
        }
        let mut seen = HashSet::new();
        for band in &self.bands {
            if !seen.insert(band.label.as_str()) {
                errors.push(ConfigError::DuplicateLabel(band.label.clone()));
            }
        }

        if self.period_secs <= self.gap_secs {
            errors.push(ConfigError::Period {
                period: self.period_secs,
                gap: self.gap_secs,
            });
        }
        let last_index = self.bands.len().saturating_sub(1) as u64;
        let total_stagger = self.stagger_secs.checked_mul(last_index);
        if last_index > 0 && total_stagger.map_or(true, |t| t >= self.period_secs) {
            errors.push(ConfigError::Stagger {
                stagger: self.stagger_secs,
                bands: self.bands.len(),
                period: self.period_secs,
            });
        }
        if self.imprint_scale == 0 {
            errors.push(ConfigError::ImprintScale);
        }
        if let Err(e) = self.imprint.validate() {
            errors.push(e);
        }

        // Global transform knobs are checked once; region errors per band.
        let global = TransformConfig {
            rate: self.rate,
            fft_bits: self.fft_bits,
            overlap: self.overlap,
            ..TransformConfig::default()
        };
        if let Err(mut e) = global.validate() {
            errors.append(&mut e);
        } else {
            for band in &self.bands {
                if let Err(e) = self.transform_for(band).region() {
                    errors.push(e);
                }
            }
        }

        collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::parse_bands;
    use pretty_assertions::assert_eq;

    fn config() -> GrabConfig {
        GrabConfig {
            bands: parse_bands("A:h:14096000:850:300,B:h:7039000:1500:500").unwrap(),
            ..GrabConfig::default()
        }
    }

    #[test]
    fn test_default_with_bands_is_valid() {
        config().validate().unwrap();
    }

    #[test]
    fn test_duplicate_labels_and_bad_period() {
        let mut cfg = config();
        cfg.bands[1].label = "A".into();
        cfg.period_secs = 2;
        let errors = cfg.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ConfigError::DuplicateLabel("A".into()),
                ConfigError::Period { period: 2, gap: 2 },
            ]
        );
    }

    #[test]
    fn test_region_checked_per_band() {
        let mut cfg = config();
        cfg.bands[1].center_hz = 100;
        let errors = cfg.validate().unwrap_err();
        assert!(matches!(errors[0], ConfigError::RegionBelowZero { .. }));
    }

    #[test]
    fn test_oversized_center_is_reported() {
        let cfg = GrabConfig {
            bands: parse_bands("a:h:7039000:4611686018427387904:300").unwrap(),
            ..GrabConfig::default()
        };
        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::RegionAboveNyquist { .. }));
    }

    #[test]
    fn test_stagger_must_fit_in_period() {
        let mut cfg = config();
        cfg.stagger_secs = 59;
        cfg.validate().unwrap();

        cfg.stagger_secs = 60;
        assert_eq!(
            cfg.validate().unwrap_err(),
            vec![ConfigError::Stagger {
                stagger: 60,
                bands: 2,
                period: 60,
            }]
        );

        cfg.stagger_secs = u64::MAX;
        assert!(matches!(
            cfg.validate().unwrap_err()[0],
            ConfigError::Stagger { .. }
        ));

        // A single band never staggers.
        cfg.bands.truncate(1);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_json_defaults_fill_missing_fields() {
        let json = r#"{
            "bands": [{"label": "K1", "host": "kiwi", "base_hz": 10138700, "center_hz": 1500, "bandwidth_hz": 200}],
            "period_secs": 600,
            "contrast": "banded"
        }"#;
        let cfg: GrabConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.period_secs, 600);
        assert_eq!(cfg.contrast, ContrastPolicy::Banded);
        assert_eq!(cfg.rate, 12000);
        assert_eq!(cfg.recording_secs(), 598);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_transform_for_band() {
        let cfg = config();
        let t = cfg.transform_for(&cfg.bands[1]);
        assert_eq!(t.center_hz, 1500);
        assert_eq!(t.bandwidth_hz, 500);
        assert_eq!(t.fft_bits, 15);
    }
}
