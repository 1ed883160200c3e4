use bytes::BytesMut;
use tracing::warn;

const SOI: &[u8] = &[0xFF, 0xD8];
const EOI: &[u8] = &[0xFF, 0xD9];

/// Largest image accepted before an unterminated one is dropped.
const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;

/// Parse state for a concatenated JPEG stream (`ffmpeg -f image2pipe`).
enum ParseState {
    /// Looking for the start-of-image marker.
    SeekingStart,
    /// Inside an image, looking for the end-of-image marker.
    CollectingImage,
}

/// Splits a byte stream of back-to-back JPEG images into whole images.
///
/// Bytes are pushed as they arrive from the pipe; complete images are pulled
/// with [`JpegSplitter::next_image`]. Garbage between images is discarded, and
/// so is an image that grows past the size limit without an end marker.
pub struct JpegSplitter {
    buffer: BytesMut,
    state: ParseState,
    /// Offset into `buffer` where the EOI search resumes.
    scan_from: usize,
    max_image_bytes: usize,
}

impl Default for JpegSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JpegSplitter {
    pub fn new() -> Self {
        Self::with_max_image_bytes(MAX_IMAGE_BYTES)
    }

    pub fn with_max_image_bytes(max_image_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(256 * 1024),
            state: ParseState::SeekingStart,
            scan_from: 0,
            max_image_bytes,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Bytes held but not yet returned as an image.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Pop the next complete JPEG image, markers included.
    pub fn next_image(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.state {
                ParseState::SeekingStart => {
                    if let Some(pos) = find_subsequence(&self.buffer, SOI) {
                        let _ = self.buffer.split_to(pos);
                        self.scan_from = SOI.len();
                        self.state = ParseState::CollectingImage;
                    } else {
                        // Keep the last byte in case the marker spans chunks
                        if self.buffer.len() >= SOI.len() {
                            let _ = self.buffer.split_to(self.buffer.len() - (SOI.len() - 1));
                        }
                        return None;
                    }
                }
                ParseState::CollectingImage => {
                    if let Some(pos) = find_subsequence(&self.buffer[self.scan_from..], EOI) {
                        let end = self.scan_from + pos + EOI.len();
                        let image = self.buffer.split_to(end).to_vec();
                        self.state = ParseState::SeekingStart;
                        return Some(image);
                    }
                    if self.buffer.len() > self.max_image_bytes {
                        warn!(
                            bytes = self.buffer.len(),
                            limit = self.max_image_bytes,
                            "camera image has no end marker, discarding"
                        );
                        self.buffer.clear();
                        self.scan_from = 0;
                        self.state = ParseState::SeekingStart;
                        return None;
                    }
                    // Avoid re-scanning old data, but leave room for a split marker
                    self.scan_from = self
                        .buffer
                        .len()
                        .saturating_sub(EOI.len() - 1)
                        .max(SOI.len());
                    return None;
                }
            }
        }
    }
}

/// Find the position of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
