//! Render command implementation
//!
//! Turns a recording (WAV or raw 16-bit PCM) into a waterfall PNG, the
//! same way a live session does.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use qrss_backend_spectrum::{IterSource, Pipeline};
use qrss_backend_waterfall::png::encode_with_hash;
use qrss_backend_waterfall::{PngConfig, Raster, WaterfallRenderer};
use qrss_intake::{read_raw, read_wav};
use qrss_spec::{ContrastPolicy, MagnitudePolicy, TransformConfig};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use super::print_config_errors;

/// Options for `qrss render`.
#[derive(Debug, Clone, Args)]
pub struct RenderOptions {
    /// Input recording, or - for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Output PNG, or - for stdout
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Input is headerless little-endian 16-bit PCM instead of WAV
    #[arg(long)]
    pub raw: bool,

    /// Text to print on the image
    #[arg(long, default_value = "")]
    pub imprint: String,

    /// Pixel scale of imprint glyphs
    #[arg(long, default_value_t = 1)]
    pub imprint_scale: u32,

    /// Nominal sample rate
    #[arg(long, default_value_t = 12000)]
    pub rate: u32,

    /// Extra WAV sample rate accepted above --rate, in Hz
    #[arg(long, default_value_t = 1)]
    pub rate_tolerance: u32,

    /// Plot center, as an audio offset in Hz
    #[arg(long, default_value_t = 1000)]
    pub center: i64,

    /// Plot bandwidth in Hz
    #[arg(long, default_value_t = 300)]
    pub bandwidth: i64,

    /// Frame size as a power of two
    #[arg(long, default_value_t = 14)]
    pub fft_bits: u32,

    /// Fraction of each frame carried into the next
    #[arg(long, default_value_t = 0.5)]
    pub overlap: f64,

    /// Keep the DC component of each frame
    #[arg(long)]
    pub no_dc_removal: bool,

    /// Magnitude policy (log, sqrt)
    #[arg(long, default_value = "log")]
    pub magnitude: MagnitudePolicy,

    /// Contrast policy (midpoint, banded)
    #[arg(long, default_value = "midpoint")]
    pub contrast: ContrastPolicy,
}

impl RenderOptions {
    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            rate: self.rate,
            base_hz: 0,
            center_hz: self.center,
            bandwidth_hz: self.bandwidth,
            fft_bits: self.fft_bits,
            overlap: self.overlap,
            dc_removal: !self.no_dc_removal,
            magnitude: self.magnitude,
        }
    }
}

/// Analyze `samples` and paint the waterfall.
pub fn render_samples(
    transform: &TransformConfig,
    contrast: ContrastPolicy,
    imprint_scale: u32,
    samples: &[i16],
    imprint: &str,
) -> Result<Raster> {
    let mut pipeline = Pipeline::new(transform)?;
    let mut renderer = WaterfallRenderer::new(contrast).with_imprint_scale(imprint_scale);
    let mut source = IterSource::new(samples.iter().copied());

    let mut rejected = None;
    pipeline.run(&mut source, |column| match renderer.push(column) {
        Ok(()) => true,
        Err(e) => {
            rejected = Some(e);
            false
        }
    });
    if let Some(e) = rejected {
        return Err(e.into());
    }

    renderer
        .render(imprint)
        .context("Nothing to render: the recording has no samples")
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if path == "-" {
        io::stdin()
            .lock()
            .read_to_end(&mut data)
            .context("Failed to read stdin")?;
    } else {
        data = fs::read(path).with_context(|| format!("Failed to read input: {}", path))?;
    }
    Ok(data)
}

/// Run the render command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(opts: &RenderOptions) -> Result<ExitCode> {
    let transform = opts.transform_config();
    if let Err(errors) = transform.validate() {
        print_config_errors(&errors);
        return Ok(ExitCode::from(1));
    }

    let data = read_input(&opts.input)?;
    let samples = if opts.raw {
        read_raw(data.as_slice()).context("Failed to decode raw PCM")?
    } else {
        let rates = opts.rate..=opts.rate.saturating_add(opts.rate_tolerance);
        read_wav(data.as_slice(), rates)
            .with_context(|| format!("Failed to decode WAV: {}", opts.input))?
            .samples
    };

    let raster = render_samples(
        &transform,
        opts.contrast,
        opts.imprint_scale,
        &samples,
        &opts.imprint,
    )?;

    let (png, hash) = encode_with_hash(&raster, &PngConfig::default())?;
    if opts.output == "-" {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(&png)
            .context("Failed to write PNG to stdout")?;
        stdout.flush()?;
    } else {
        fs::write(Path::new(&opts.output), &png)
            .with_context(|| format!("Failed to write output: {}", opts.output))?;
    }

    // Status goes to stderr; stdout may carry the image.
    eprintln!(
        "{} {}x{} from {} samples ({:.1}s)",
        "Rendered:".green().bold(),
        raster.width,
        raster.height,
        samples.len(),
        samples.len() as f64 / opts.rate as f64
    );
    eprintln!("{} {}", "BLAKE3:".dimmed(), hash);

    Ok(ExitCode::SUCCESS)
}
