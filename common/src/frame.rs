use chrono::{DateTime, Local};
use image::RgbImage;

/// `YYYYMMDDHHMMSS`, used both for output filenames and for the burned-in stamp.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format a wall-clock instant as a 14-digit timestamp.
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// A single camera frame.
///
/// The image is 8-bit RGB in row-major order. A frame with zero width or height
/// is *empty*: the capture side hands those out for spurious or short reads and
/// the loop skips them without touching any detection state.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Position of the frame in the capture stream, starting at 0.
    pub seq: u64,
}

impl Frame {
    pub fn new(image: RgbImage, seq: u64) -> Self {
        Self { image, seq }
    }

    /// An empty frame carrying only its sequence number.
    pub fn empty(seq: u64) -> Self {
        Self {
            image: RgbImage::new(0, 0),
            seq,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw `rgb24` bytes, as expected by a rawvideo encoder.
    pub fn as_rgb24(&self) -> &[u8] {
        self.image.as_raw()
    }
}
