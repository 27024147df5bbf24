//! Check command implementation
//!
//! Resolves and validates a grabber configuration, then prints what each
//! band would produce.

use anyhow::Result;
use colored::Colorize;
use qrss_spec::{Band, ConfigError, GrabConfig};
use std::process::ExitCode;

use super::print_config_errors;
use crate::cli_args::ConfigArgs;

/// Image geometry of one band's sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSummary {
    pub label: String,
    pub lo: usize,
    pub hi: usize,
    pub bin_hz: f64,
    pub column_secs: f64,
    /// Image width for a session that receives its full duration.
    pub columns: u64,
}

/// Work out the image geometry for `band`.
pub fn summarize(config: &GrabConfig, band: &Band) -> Result<BandSummary, ConfigError> {
    let transform = config.transform_for(band);
    let region = transform.region()?;
    let samples = config.recording_secs() * config.rate as u64;
    let hop = transform.hop() as u64;
    Ok(BandSummary {
        label: band.label.clone(),
        lo: region.lo,
        hi: region.hi,
        bin_hz: transform.bin_hz(),
        column_secs: hop as f64 / config.rate as f64,
        columns: samples.div_ceil(hop),
    })
}

/// Run the check command
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(args: &ConfigArgs, print_json: bool) -> Result<ExitCode> {
    let config = args.resolve()?;

    if print_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    if let Err(errors) = config.validate() {
        print_config_errors(&errors);
        return Ok(ExitCode::from(1));
    }

    println!("{}", "Configuration OK".green().bold());
    println!(
        "{} every {}s, recording {}s, {} per band",
        "Schedule:".dimmed(),
        config.period_secs,
        config.recording_secs(),
        if config.times < 0 {
            "forever".to_string()
        } else {
            format!("{} session(s)", config.times)
        }
    );
    println!("{} {}", "Spool:".dimmed(), config.spool.display());

    for band in &config.bands {
        let s = summarize(&config, band)?;
        println!(
            "  {} {} Hz +-{} Hz: bins {}..{} ({} rows, {:.3} Hz/bin), {:.2} s/column, ~{} columns",
            s.label.cyan(),
            band.mid_hz(),
            band.half_bw_hz(),
            s.lo,
            s.hi,
            s.hi - s.lo,
            s.bin_hz,
            s.column_secs,
            s.columns
        );
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_geometry() {
        let config = GrabConfig {
            bands: qrss_spec::parse_bands("a:h:7039000:1000:300").unwrap(),
            fft_bits: 10,
            period_secs: 60,
            gap_secs: 2,
            ..GrabConfig::default()
        };
        let s = summarize(&config, &config.bands[0]).unwrap();
        // floor(1024 * 1700 / 24000) = 72, floor(1024 * 2300 / 24000) = 98
        assert_eq!((s.lo, s.hi), (72, 98));
        assert_eq!(s.column_secs, 512.0 / 12000.0);
        assert_eq!(s.columns, (58 * 12000u64).div_ceil(512));
    }
}
