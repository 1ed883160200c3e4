/// Counters kept by the recording loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecorderStats {
    /// Frames read from the camera after the initial sizing frame.
    pub read: u64,
    /// Empty frames skipped without processing.
    pub skipped: u64,
    /// Frames classified as still.
    pub still: u64,
    /// Frames classified as motion and written out.
    pub written: u64,
}

impl RecorderStats {
    /// Frames that went through detection.
    pub fn processed(&self) -> u64 {
        self.still + self.written
    }
}
