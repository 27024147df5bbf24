//! Grab command implementation
//!
//! Runs one scheduler per band until every band's session budget is spent.

use anyhow::{Context, Result};
use colored::Colorize;
use qrss_intake::{Intake, KiwiIntake, ToneIntake};
use std::process::ExitCode;
use std::sync::Arc;

use super::print_config_errors;
use crate::cli_args::ConfigArgs;
use crate::clock::SystemClock;
use crate::scheduler::{run_bands, BandReport};

/// Run the grab command
///
/// # Arguments
/// * `args` - Configuration file and flag overrides
/// * `dry_run` - Use a generated test tone instead of the receivers
///
/// # Returns
/// Exit code: 0 if every session succeeded, 1 otherwise
pub fn run(args: &ConfigArgs, dry_run: bool) -> Result<ExitCode> {
    let config = args.resolve()?;
    if let Err(errors) = config.validate() {
        print_config_errors(&errors);
        return Ok(ExitCode::from(1));
    }

    let intake: Arc<dyn Intake> = if dry_run {
        Arc::new(ToneIntake::new(config.rate))
    } else {
        Arc::new(KiwiIntake::from_config(&config))
    };

    tracing::info!(
        bands = config.bands.len(),
        period = config.period_secs,
        times = config.times,
        spool = %config.spool.display(),
        dry_run,
        "starting grabber"
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let reports = rt.block_on(run_bands(&config, intake, Arc::new(SystemClock)));
    print_summary(&reports);

    let failed: usize = reports.iter().map(BandReport::failed).sum();
    let lost = config.bands.len() - reports.len();
    if failed > 0 || lost > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_summary(reports: &[BandReport]) {
    for report in reports {
        let status = if report.failed() == 0 {
            "ok".green()
        } else {
            "failed".red()
        };
        println!(
            "{} {}: {} written, {} empty, {} failed",
            status,
            report.label.cyan(),
            report.written(),
            report.empty(),
            report.failed()
        );
    }
}
