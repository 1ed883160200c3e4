use image::GrayImage;

pub const MASK_ON: u8 = 255;

/// Binary threshold: pixels strictly above `level` become 255, the rest 0.
pub fn threshold(delta: &GrayImage, level: u8) -> GrayImage {
    let mut mask = GrayImage::new(delta.width(), delta.height());
    for (out, &value) in mask.iter_mut().zip(delta.as_raw().iter()) {
        *out = if value > level { MASK_ON } else { 0 };
    }
    mask
}

/// Grayscale dilation with a `kernel_size` x `kernel_size` rectangle anchored
/// at its centre. Pixels outside the image count as 0.
///
/// A rectangle is separable, so this runs a horizontal max pass followed by a
/// vertical one.
pub fn dilate(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return mask.clone();
    }

    let before = (kernel_size / 2) as i64;
    let after = kernel_size as i64 - 1 - before;

    let mut horizontal = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let lo = (x as i64 - before).max(0) as u32;
            let hi = (x as i64 + after).min(width as i64 - 1) as u32;
            let max = (lo..=hi).map(|xx| mask.get_pixel(xx, y).0[0]).max().unwrap_or(0);
            horizontal.get_pixel_mut(x, y).0[0] = max;
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let lo = (y as i64 - before).max(0) as u32;
        let hi = (y as i64 + after).min(height as i64 - 1) as u32;
        for x in 0..width {
            let max = (lo..=hi)
                .map(|yy| horizontal.get_pixel(x, yy).0[0])
                .max()
                .unwrap_or(0);
            out.get_pixel_mut(x, y).0[0] = max;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn on_pixels(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == MASK_ON).count()
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let mut delta = GrayImage::new(3, 1);
        delta.put_pixel(0, 0, Luma([25]));
        delta.put_pixel(1, 0, Luma([26]));
        delta.put_pixel(2, 0, Luma([200]));

        let mask = threshold(&delta, 25);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.get_pixel(1, 0).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(2, 0).0[0], MASK_ON);
    }

    #[test]
    fn single_pixel_grows_to_three_by_three() {
        let mut mask = GrayImage::new(7, 7);
        mask.put_pixel(3, 3, Luma([MASK_ON]));

        let dilated = dilate(&mask, 3);
        assert_eq!(on_pixels(&dilated), 9);
        for y in 2..=4 {
            for x in 2..=4 {
                assert_eq!(dilated.get_pixel(x, y).0[0], MASK_ON);
            }
        }
        assert_eq!(dilated.get_pixel(1, 3).0[0], 0);
    }

    #[test]
    fn dilation_is_clipped_at_the_border() {
        let mut mask = GrayImage::new(4, 4);
        mask.put_pixel(0, 0, Luma([MASK_ON]));
        assert_eq!(on_pixels(&dilate(&mask, 3)), 4);
    }

    #[test]
    fn dilation_merges_nearby_fragments() {
        let mut mask = GrayImage::new(9, 3);
        mask.put_pixel(2, 1, Luma([MASK_ON]));
        mask.put_pixel(4, 1, Luma([MASK_ON]));

        let dilated = dilate(&mask, 3);
        assert_eq!(dilated.get_pixel(3, 1).0[0], MASK_ON);
    }
}
