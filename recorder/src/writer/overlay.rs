use image::{Rgb, RgbImage};
use motion_recorder_common::config::OverlayConfig;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, in unscaled pixels.
const ADVANCE: u32 = GLYPH_WIDTH + 1;

const INK: Rgb<u8> = Rgb([0, 0, 0]);

// 5x7 digits, one row per byte, most significant of the low five bits on the left.
const DIGITS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// Burn `text` into `image` in black, starting at `(overlay.x, overlay.y)`
/// where `y` is the text baseline.
///
/// Only ASCII digits are drawn; any other character leaves a blank cell.
/// Glyphs running off the frame are clipped.
pub fn stamp(image: &mut RgbImage, text: &str, overlay: &OverlayConfig) {
    let scale = overlay.scale.max(1);
    let top = overlay.y.saturating_sub(GLYPH_HEIGHT * scale);

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = ch.to_digit(10).map(|d| &DIGITS[d as usize]) else {
            continue;
        };
        let left = overlay.x + i as u32 * ADVANCE * scale;
        draw_glyph(image, glyph, left, top, scale);
    }
}

fn draw_glyph(image: &mut RgbImage, glyph: &[u8; 7], left: u32, top: u32, scale: u32) {
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            let x0 = left + col * scale;
            let y0 = top + row as u32 * scale;
            for y in y0..y0 + scale {
                for x in x0..x0 + scale {
                    if x < image.width() && y < image.height() {
                        image.put_pixel(x, y, INK);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    fn inked(image: &RgbImage) -> usize {
        image.pixels().filter(|p| **p == INK).count()
    }

    #[test]
    fn digit_one_at_default_position() {
        let mut img = white(64, 32);
        stamp(&mut img, "1", &OverlayConfig::default());

        // ten lit cells, each 2x2 at the default scale
        assert_eq!(inked(&img), 40);
        // top of the stem: column 2, row 0 → x = 10 + 4, y = 20 - 14
        assert_eq!(*img.get_pixel(14, 6), INK);
        assert_eq!(*img.get_pixel(9, 6), Rgb([255, 255, 255]));
    }

    #[test]
    fn stamp_stays_above_baseline() {
        let mut img = white(200, 40);
        let overlay = OverlayConfig::default();
        stamp(&mut img, "20261019235959", &overlay);

        assert!(inked(&img) > 0);
        for (x, y, p) in img.enumerate_pixels() {
            if *p == INK {
                assert!(y < overlay.y && y >= overlay.y - 14, "ink at row {y}");
                assert!(x >= overlay.x, "ink at column {x}");
            }
        }
    }

    #[test]
    fn text_is_clipped_to_small_frames() {
        let mut img = white(16, 12);
        stamp(&mut img, "88888888", &OverlayConfig::default());
        assert!(inked(&img) > 0);
    }

    #[test]
    fn non_digits_leave_gaps() {
        let mut a = white(80, 30);
        let mut b = white(80, 30);
        stamp(&mut a, "1 1", &OverlayConfig::default());
        stamp(&mut b, "1-1", &OverlayConfig::default());
        assert_eq!(inked(&a), 80);
        assert_eq!(a, b);
    }
}
