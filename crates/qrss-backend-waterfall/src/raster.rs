//! 16-bit RGB pixel buffer.

/// One pixel, red/green/blue at 16 bits per channel.
pub type Rgb16 = [u16; 3];

/// A 2D image buffer, row-major, origin at the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (RGB, row-major).
    pub data: Vec<Rgb16>,
}

impl Raster {
    /// Create a raster filled with one color.
    pub fn new(width: u32, height: u32, fill: Rgb16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![fill; size],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgb16 {
        self.data[self.index(x, y)]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgb16) {
        let idx = self.index(x, y);
        self.data[idx] = color;
    }

    /// Set a pixel, ignoring coordinates outside the raster.
    #[inline]
    pub fn set_clipped(&mut self, x: i64, y: i64, color: Rgb16) {
        if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
            self.set(x as u32, y as u32, color);
        }
    }

    /// Big-endian channel bytes, as PNG expects for 16-bit samples.
    pub fn to_rgb16_be(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 6);
        for pixel in &self.data {
            for channel in pixel {
                bytes.extend_from_slice(&channel.to_be_bytes());
            }
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_and_clipping() {
        let mut raster = Raster::new(4, 3, [0, 0, 0]);
        raster.set(3, 2, [1, 2, 3]);
        assert_eq!(raster.get(3, 2), [1, 2, 3]);

        raster.set_clipped(-1, 0, [9, 9, 9]);
        raster.set_clipped(4, 0, [9, 9, 9]);
        raster.set_clipped(0, 3, [9, 9, 9]);
        assert!(raster.data.iter().all(|p| *p != [9, 9, 9]));
    }

    #[test]
    fn test_big_endian_bytes() {
        let raster = Raster::new(1, 1, [0x0102, 0x0304, 0xFFFF]);
        assert_eq!(raster.to_rgb16_be(), vec![1, 2, 3, 4, 0xFF, 0xFF]);
    }
}
