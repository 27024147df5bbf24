//! Test fixture utilities for recordings, configurations and spools.

use std::f64::consts::TAU;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use qrss_spec::{parse_bands, GrabConfig, ImprintTemplate};
use tempfile::TempDir;

/// Sample rate used by every fixture.
pub const RATE: u32 = 12_000;

/// A sine at `freq_hz` lasting `seconds`.
pub fn tone(freq_hz: f64, amplitude: f64, seconds: f64) -> Vec<i16> {
    let n = (RATE as f64 * seconds) as usize;
    (0..n)
        .map(|i| (amplitude * (TAU * freq_hz * i as f64 / RATE as f64).sin()) as i16)
        .collect()
}

/// Encode mono 16-bit samples as a WAV file in memory.
pub fn wav_bytes(samples: &[i16], rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("Failed to start WAV");
        for &s in samples {
            for _ in 0..channels {
                writer.write_sample(s).expect("Failed to write sample");
            }
        }
        writer.finalize().expect("Failed to finish WAV");
    }
    cursor.into_inner()
}

/// Raw little-endian PCM.
pub fn raw_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Decoded 16-bit RGB PNG.
#[derive(Debug)]
pub struct DecodedPng {
    pub width: u32,
    pub height: u32,
    pub bit_depth: png::BitDepth,
    pub color_type: png::ColorType,
    /// Red channel per pixel, row-major.
    pub red: Vec<u16>,
}

impl DecodedPng {
    pub fn red_at(&self, x: u32, y: u32) -> u16 {
        self.red[(y * self.width + x) as usize]
    }
}

/// Decode a PNG written by the waterfall backend.
pub fn decode_png(bytes: &[u8]) -> DecodedPng {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder.read_info().expect("Failed to read PNG header");
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).expect("Failed to decode PNG");
    let data = &buf[..info.buffer_size()];

    let red = data
        .chunks_exact(6)
        .map(|px| u16::from_be_bytes([px[0], px[1]]))
        .collect();
    DecodedPng {
        width: info.width,
        height: info.height,
        bit_depth: info.bit_depth,
        color_type: info.color_type,
        red,
    }
}

/// A temporary spool directory with a grabber configuration pointing at it.
pub struct SpoolFixture {
    pub root: TempDir,
}

impl SpoolFixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// A small, fast configuration: 1024-point frames, ten minute
    /// periods, no imprint.
    pub fn config(&self, bands: &str, times: i64) -> GrabConfig {
        GrabConfig {
            bands: parse_bands(bands).expect("Failed to parse bands"),
            rate: RATE,
            fft_bits: 10,
            period_secs: 600,
            gap_secs: 2,
            stagger_secs: 0,
            times,
            spool: self.path().to_path_buf(),
            imprint: ImprintTemplate(String::new()),
            ..GrabConfig::default()
        }
    }

    /// PNG files under the band's directory, sorted by name.
    pub fn session_files(&self, label: &str) -> Vec<PathBuf> {
        let dir = self.path().join(label);
        let mut files: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    /// Occupy the band's directory name with a plain file so nothing can
    /// be written there.
    pub fn block_band(&self, label: &str) {
        fs::write(self.path().join(label), b"not a directory")
            .expect("Failed to write blocking file");
    }
}

impl Default for SpoolFixture {
    fn default() -> Self {
        Self::new()
    }
}
