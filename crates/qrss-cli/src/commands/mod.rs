//! CLI command implementations

pub mod check;
pub mod grab;
pub mod render;

use colored::Colorize;
use qrss_spec::ConfigError;

/// Print configuration errors in the same shape for every command.
pub(crate) fn print_config_errors(errors: &[ConfigError]) {
    eprintln!(
        "{} {} configuration error(s)",
        "Invalid:".red().bold(),
        errors.len()
    );
    for error in errors {
        eprintln!("  {} {}", "x".red(), error);
    }
}
