//! Band identity and `label:host:base:center:bw` tuple parsing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Static identity of one monitored band.
///
/// The receiver is tuned to `base_hz` in upper sideband; the plotted range
/// is `base_hz + center_hz ± bandwidth_hz / 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Name used for the output folder and file names.
    pub label: String,
    /// Receiver host name (without port).
    pub host: String,
    /// Tuned frequency in Hz.
    pub base_hz: i64,
    /// Center of the plot, relative to `base_hz`.
    pub center_hz: i64,
    /// Plot bandwidth in Hz.
    pub bandwidth_hz: i64,
}

impl Band {
    /// Absolute center frequency of the plot.
    ///
    /// Saturates instead of overflowing for out-of-range tuples.
    pub fn mid_hz(&self) -> i64 {
        self.base_hz.saturating_add(self.center_hz)
    }

    /// Half the plot bandwidth, as printed in imprints.
    pub fn half_bw_hz(&self) -> i64 {
        self.bandwidth_hz / 2
    }

    /// Directory holding this band's timestamped images.
    pub fn output_dir(&self, spool: &Path) -> PathBuf {
        spool.join(&self.label)
    }

    /// Fixed-name file that always holds the most recent image.
    pub fn latest_path(&self, spool: &Path) -> PathBuf {
        spool.join(format!("{}.png", self.label))
    }

    /// Path of the image for the session that started at `timestamp`.
    pub fn session_path(&self, spool: &Path, timestamp: &str) -> PathBuf {
        self.output_dir(spool)
            .join(format!("{}--{}.png", self.label, timestamp))
    }
}

fn is_safe_label(label: &str) -> bool {
    !label.is_empty()
        && label != "."
        && label != ".."
        && !label.contains(['/', '\\', '\0'])
}

fn parse_number(index: usize, field: &'static str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::BandNumber {
        index,
        field,
        value: value.to_string(),
    })
}

/// Parse one `label:host:base:center:bw` tuple.
///
/// `index` is the tuple's position in the band list and only appears in
/// error messages.
pub fn parse_band(index: usize, tuple: &str) -> Result<Band, ConfigError> {
    let words: Vec<&str> = tuple.split(':').collect();
    if words.len() != 5 {
        return Err(ConfigError::BandFieldCount {
            index,
            tuple: tuple.to_string(),
            found: words.len(),
        });
    }

    let label = words[0].trim();
    if !is_safe_label(label) {
        return Err(ConfigError::UnsafeLabel {
            index,
            label: label.to_string(),
        });
    }
    let host = words[1].trim();
    if host.is_empty() {
        return Err(ConfigError::EmptyHost { index });
    }

    Ok(Band {
        label: label.to_string(),
        host: host.to_string(),
        base_hz: parse_number(index, "base frequency", words[2])?,
        center_hz: parse_number(index, "center offset", words[3])?,
        bandwidth_hz: parse_number(index, "bandwidth", words[4])?,
    })
}

/// Parse a comma-separated list of band tuples.
///
/// Every malformed tuple is reported, not just the first.
pub fn parse_bands(spec: &str) -> Result<Vec<Band>, Vec<ConfigError>> {
    let mut bands = Vec::new();
    let mut errors = Vec::new();

    for (index, tuple) in spec
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .enumerate()
    {
        match parse_band(index, tuple) {
            Ok(band) => bands.push(band),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    if bands.is_empty() {
        return Err(vec![ConfigError::NoBands]);
    }
    Ok(bands)
}
