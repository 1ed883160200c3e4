pub mod camera;
pub mod mjpeg;

use std::future::Future;

use motion_recorder_common::frame::Frame;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera device {0} is not available")]
    Device(String),
    #[error("failed to spawn camera process: {0}")]
    Spawn(String),
    #[error("failed to read from camera: {0}")]
    Read(String),
    #[error("camera stream ended")]
    EndOfStream,
}

/// A source of camera frames, read one at a time.
///
/// Every call yields the next frame or an error. Errors are treated as device
/// failures by the caller. A spurious or short read is reported as an empty
/// [`Frame`], not as an error.
pub trait FrameSource: Send {
    fn read_frame(&mut self) -> impl Future<Output = Result<Frame, CaptureError>> + Send;
}
