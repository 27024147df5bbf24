//! QRSS grabber CLI
//!
//! Captures audio from KiwiSDR receivers on a fixed wall-clock cadence and
//! turns each capture into a waterfall PNG.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use qrss_cli::cli_args::ConfigArgs;
use qrss_cli::commands;
use qrss_cli::commands::render::RenderOptions;

/// QRSS grabber - scheduled narrow-band waterfall capture
#[derive(Parser)]
#[command(name = "qrss")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record every band on the period boundary and write images to the spool
    Grab {
        #[command(flatten)]
        config: ConfigArgs,

        /// Use a generated test tone instead of connecting to receivers
        #[arg(long)]
        dry_run: bool,
    },

    /// Render a WAV or raw PCM recording into a waterfall PNG
    Render {
        #[command(flatten)]
        options: RenderOptions,
    },

    /// Validate a configuration and print each band's image geometry
    Check {
        #[command(flatten)]
        config: ConfigArgs,

        /// Also print the resolved configuration as JSON
        #[arg(long)]
        print_config: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Grab { config, dry_run } => commands::grab::run(&config, dry_run),
        Commands::Render { options } => commands::render::run(&options),
        Commands::Check {
            config,
            print_config,
        } => commands::check::run(&config, print_config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_grab() {
        let cli = Cli::try_parse_from([
            "qrss",
            "grab",
            "--seconds",
            "600",
            "--times",
            "-1",
            "--bands",
            "W6REK-20m:sybil.yak.net:14096000:850:300",
            "--magnitude",
            "sqrt",
        ])
        .unwrap();
        match cli.command {
            Commands::Grab { config, dry_run } => {
                assert_eq!(config.seconds, Some(600));
                assert_eq!(config.times, Some(-1));
                assert_eq!(config.magnitude, Some(qrss_spec::MagnitudePolicy::SymmetricSqrt));
                assert!(!dry_run);
            }
            _ => panic!("expected grab command"),
        }
    }

    #[test]
    fn test_cli_render_defaults() {
        let cli = Cli::try_parse_from(["qrss", "render", "-i", "40m.wav"]).unwrap();
        match cli.command {
            Commands::Render { options } => {
                assert_eq!(options.input, "40m.wav");
                assert_eq!(options.output, "-");
                assert_eq!(options.fft_bits, 14);
                assert!(!options.no_dc_removal);
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_contrast() {
        assert!(Cli::try_parse_from(["qrss", "check", "--contrast", "rainbow"]).is_err());
    }
}
