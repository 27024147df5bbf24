//! Command-line overrides for [`GrabConfig`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use qrss_spec::{parse_bands, ContrastPolicy, GrabConfig, ImprintTemplate, MagnitudePolicy};

/// Grabber settings. Flags override values from `--config`.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// JSON configuration file providing defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Comma-separated Label:Host:BaseHz:CenterHz:BwHz tuples
    #[arg(long)]
    pub bands: Option<String>,

    /// Sample rate requested from the receiver
    #[arg(long)]
    pub rate: Option<u32>,

    /// Frame size as a power of two, like 14 or 15
    #[arg(long)]
    pub fft_bits: Option<u32>,

    /// Fraction of each frame carried into the next, 0 to 0.99
    #[arg(long)]
    pub overlap: Option<f64>,

    /// Seconds per period; should divide 86400
    #[arg(long)]
    pub seconds: Option<u64>,

    /// Seconds reserved at the end of each period for receiver hand-off
    #[arg(long)]
    pub gap: Option<u64>,

    /// Extra start delay per band, in seconds
    #[arg(long)]
    pub stagger: Option<u64>,

    /// Sessions per band; negative runs forever
    #[arg(long, allow_negative_numbers = true)]
    pub times: Option<i64>,

    /// Enable receiver AGC
    #[arg(long)]
    pub agc: bool,

    /// Receiver manual gain when AGC is off
    #[arg(long)]
    pub mangain: Option<u32>,

    /// Receiver port
    #[arg(long)]
    pub port: Option<u16>,

    /// Name announced to the receiver
    #[arg(long)]
    pub identify: Option<String>,

    /// Spool directory for images
    #[arg(long)]
    pub spool: Option<PathBuf>,

    /// Imprint template; placeholders {label} {timestamp} {center} {halfbw}
    #[arg(long)]
    pub imprint: Option<String>,

    /// Pixel scale of imprint glyphs
    #[arg(long)]
    pub imprint_scale: Option<u32>,

    /// Keep the DC component of each frame
    #[arg(long)]
    pub no_dc_removal: bool,

    /// Magnitude policy (log, sqrt)
    #[arg(long)]
    pub magnitude: Option<MagnitudePolicy>,

    /// Contrast policy (midpoint, banded)
    #[arg(long)]
    pub contrast: Option<ContrastPolicy>,
}

impl ConfigArgs {
    /// Build the effective configuration. Does not validate it.
    pub fn resolve(&self) -> Result<GrabConfig> {
        let mut config = match &self.config {
            Some(path) => GrabConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => GrabConfig::default(),
        };

        if let Some(bands) = &self.bands {
            config.bands = parse_bands(bands).map_err(|errors| {
                let list: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                anyhow::anyhow!("invalid --bands: {}", list.join("; "))
            })?;
        }
        if let Some(v) = self.rate {
            config.rate = v;
        }
        if let Some(v) = self.fft_bits {
            config.fft_bits = v;
        }
        if let Some(v) = self.overlap {
            config.overlap = v;
        }
        if let Some(v) = self.seconds {
            config.period_secs = v;
        }
        if let Some(v) = self.gap {
            config.gap_secs = v;
        }
        if let Some(v) = self.stagger {
            config.stagger_secs = v;
        }
        if let Some(v) = self.times {
            config.times = v;
        }
        if self.agc {
            config.agc = true;
        }
        if let Some(v) = self.mangain {
            config.manual_gain = v;
        }
        if let Some(v) = self.port {
            config.port = v;
        }
        if let Some(v) = &self.identify {
            config.identify = v.clone();
        }
        if let Some(v) = &self.spool {
            config.spool = v.clone();
        }
        if let Some(v) = &self.imprint {
            config.imprint = ImprintTemplate(v.clone());
        }
        if let Some(v) = self.imprint_scale {
            config.imprint_scale = v;
        }
        if self.no_dc_removal {
            config.dc_removal = false;
        }
        if let Some(v) = self.magnitude {
            config.magnitude = v;
        }
        if let Some(v) = self.contrast {
            config.contrast = v;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"bands": [{{"label": "a", "host": "h", "base_hz": 7039000, "center_hz": 850, "bandwidth_hz": 300}}],
                "period_secs": 600, "overlap": 0.8}}"#
        )
        .unwrap();

        let args = ConfigArgs {
            config: Some(file.path().to_path_buf()),
            overlap: Some(0.25),
            times: Some(-1),
            no_dc_removal: true,
            ..ConfigArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.bands.len(), 1);
        assert_eq!(config.period_secs, 600);
        assert_eq!(config.overlap, 0.25);
        assert!(!config.dc_removal);
        assert_eq!(config.rate, 12000);
    }

    #[test]
    fn test_bad_bands_reported() {
        let args = ConfigArgs {
            bands: Some("only:three:fields".to_string()),
            ..ConfigArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}
