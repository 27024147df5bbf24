//! Deterministic 16-bit PNG writer.
//!
//! Encoder settings are fixed so the same raster always produces the same
//! bytes. The png crate writes no timestamp chunk.

use std::io::Write;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use thiserror::Error;

use crate::raster::Raster;

#[derive(Debug, Error)]
pub enum PngError {
    #[error("cannot write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode image: {0}")]
    Encode(#[from] png::EncodingError),

    /// Width or height is zero, or the pixel buffer does not match them.
    #[error("{width}x{height} raster holds {pixels} pixels")]
    Shape { width: u32, height: u32, pixels: usize },
}

/// Encoder settings for waterfall images.
#[derive(Debug, Clone, Copy)]
pub struct PngConfig {
    pub compression: Compression,
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Smaller spool files; waterfalls are mostly flat background.
    pub fn compact() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }
}

/// Encode `raster` as 16-bit RGB into `out`.
pub fn write_png<W: Write>(raster: &Raster, out: W, config: &PngConfig) -> Result<(), PngError> {
    let pixels = raster.data.len();
    if pixels == 0 || pixels != raster.width as usize * raster.height as usize {
        return Err(PngError::Shape {
            width: raster.width,
            height: raster.height,
            pixels,
        });
    }

    let mut encoder = Encoder::new(out, raster.width, raster.height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut stream = encoder.write_header()?;
    stream.write_image_data(&raster.to_rgb16_be())?;
    stream.finish()?;
    Ok(())
}

/// Encode in memory; returns the PNG and its BLAKE3 hex digest.
pub fn encode_with_hash(raster: &Raster, config: &PngConfig) -> Result<(Vec<u8>, String), PngError> {
    let mut png = Vec::with_capacity(raster.data.len() * 2);
    write_png(raster, &mut png, config)?;
    let hash = blake3::hash(&png).to_hex().to_string();
    Ok((png, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn waterfall() -> Raster {
        let mut raster = Raster::new(40, 12, [0, 0, 0]);
        for x in 0..40 {
            // One drifting carrier over a dim floor.
            let y = 2 + x / 8;
            raster.set(x, y, [u16::MAX; 3]);
            raster.set(x, 11, [0x1000; 3]);
        }
        raster
    }

    #[test]
    fn test_same_raster_same_bytes() {
        for config in [PngConfig::default(), PngConfig::compact()] {
            let (a, hash_a) = encode_with_hash(&waterfall(), &config).unwrap();
            let (b, hash_b) = encode_with_hash(&waterfall(), &config).unwrap();
            assert_eq!(a, b);
            assert_eq!(hash_a, hash_b);
            assert_eq!(hash_a.len(), 64);
        }
    }

    #[test]
    fn test_ihdr_declares_16_bit_rgb() {
        let (png, _) = encode_with_hash(&waterfall(), &PngConfig::default()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &40u32.to_be_bytes());
        assert_eq!(&png[20..24], &12u32.to_be_bytes());
        assert_eq!((png[24], png[25]), (16, 2));
    }

    #[test]
    fn test_writer_and_memory_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("band.png");
        let mut file = std::fs::File::create(&path).unwrap();
        write_png(&waterfall(), &mut file, &PngConfig::compact()).unwrap();
        drop(file);

        let (png, _) = encode_with_hash(&waterfall(), &PngConfig::compact()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), png);
    }

    #[test]
    fn test_zero_width_rejected() {
        let err = encode_with_hash(&Raster::new(0, 26, [0, 0, 0]), &PngConfig::default());
        assert!(matches!(
            err,
            Err(PngError::Shape { width: 0, height: 26, pixels: 0 })
        ));
    }
}
