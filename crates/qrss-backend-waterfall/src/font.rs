//! 5x7 bitmap font for image imprints.
//!
//! Glyphs cover ASCII 32..=126. Lowercase letters share the uppercase
//! shapes; every other code point renders blank. Each glyph is seven rows
//! of five bits, most significant bit on the left.

use crate::raster::{Raster, Rgb16};

/// Glyph cell width in font pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in font pixels.
pub const GLYPH_HEIGHT: u32 = 7;

/// Imprint ink: pure green.
pub const INK: Rgb16 = [0, u16::MAX, 0];

/// Top-left corner of the first glyph, in image pixels.
pub const IMPRINT_ORIGIN: (i64, i64) = (10, 10);

/// Horizontal distance between glyph origins at scale 1.
pub const GLYPH_ADVANCE: i64 = 10;

type Glyph = [u8; 7];

static BLANK: Glyph = [0; 7];

/// Space (32) through underscore (95).
#[rustfmt::skip]
static GLYPHS: [Glyph; 64] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x04, 0x04, 0x04, 0x04, 0x00, 0x04, 0x00], // !
    [0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00], // "
    [0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x00, 0x00], // #
    [0x04, 0x0E, 0x14, 0x0E, 0x05, 0x0E, 0x04], // $
    [0x19, 0x1A, 0x04, 0x0B, 0x13, 0x00, 0x00], // %
    [0x0C, 0x12, 0x0C, 0x12, 0x13, 0x0D, 0x00], // &
    [0x04, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00], // '
    [0x04, 0x08, 0x08, 0x08, 0x08, 0x04, 0x00], // (
    [0x04, 0x02, 0x02, 0x02, 0x02, 0x04, 0x00], // )
    [0x00, 0x15, 0x0E, 0x15, 0x00, 0x00, 0x00], // *
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x04, 0x04, 0x08], // ,
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00], // .
    [0x01, 0x02, 0x04, 0x08, 0x10, 0x00, 0x00], // /
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
    [0x00, 0x04, 0x00, 0x00, 0x04, 0x00, 0x00], // :
    [0x00, 0x04, 0x00, 0x00, 0x04, 0x04, 0x08], // ;
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // <
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // =
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // >
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // ?
    [0x0E, 0x11, 0x17, 0x15, 0x17, 0x10, 0x0E], // @
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x11, 0x11, 0x11, 0x11], // M
    [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // [
    [0x10, 0x08, 0x04, 0x02, 0x01, 0x00, 0x00], // backslash
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ]
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // ^
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // _
];

/// Backtick and `{|}~`.
#[rustfmt::skip]
static EXTRA: [(u8, Glyph); 5] = [
    (b'`', [0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]),
    (b'{', [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02]),
    (b'|', [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    (b'}', [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08]),
    (b'~', [0x00, 0x00, 0x08, 0x15, 0x02, 0x00, 0x00]),
];

/// Map a character to a font byte; code points above 255 clamp to 255.
pub fn font_byte(c: char) -> u8 {
    u32::from(c).min(255) as u8
}

fn glyph(byte: u8) -> &'static Glyph {
    let byte = byte.to_ascii_uppercase();
    match byte {
        32..=95 => &GLYPHS[(byte - 32) as usize],
        _ => EXTRA
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|(_, g)| g)
            .unwrap_or(&BLANK),
    }
}

/// Whether the font pixel at (`row`, `col`) of `byte` is inked.
pub fn pixel(byte: u8, row: u32, col: u32) -> bool {
    if row >= GLYPH_HEIGHT || col >= GLYPH_WIDTH {
        return false;
    }
    glyph(byte)[row as usize] & (0x10 >> col) != 0
}

/// Draw `text` starting at [`IMPRINT_ORIGIN`].
///
/// Every font pixel becomes a `scale`×`scale` block and glyph origins are
/// `GLYPH_ADVANCE * scale` apart. Pixels outside the raster are clipped.
pub fn draw_text(raster: &mut Raster, text: &str, scale: u32, ink: Rgb16) {
    let scale = scale.max(1) as i64;
    let (ox, oy) = IMPRINT_ORIGIN;

    for (i, c) in text.chars().enumerate() {
        let byte = font_byte(c);
        let gx = ox + i as i64 * GLYPH_ADVANCE * scale;
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !pixel(byte, row, col) {
                    continue;
                }
                let px = gx + col as i64 * scale;
                let py = oy + row as i64 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        raster.set_clipped(px + dx, py + dy, ink);
                    }
                }
            }
        }
    }
}
