pub mod avi;
pub mod keys;
pub mod overlay;

use std::future::Future;
use std::path::PathBuf;

use motion_recorder_common::frame::Frame;

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("output directory {0} does not exist")]
    OutputDir(String),
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(String),
    #[error("frame is {got_width}x{got_height}, writer was opened for {width}x{height}")]
    FrameSize {
        got_width: u32,
        got_height: u32,
        width: u32,
        height: u32,
    },
    #[error("failed to write frame to ffmpeg stdin: {0}")]
    Write(String),
    #[error("failed to wait for ffmpeg: {0}")]
    Wait(String),
    #[error("ffmpeg exited with non-zero status: {0}")]
    FfmpegFailed(String),
}

/// Summary of a finalized recording.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedRecording {
    pub path: PathBuf,
    pub frame_count: u64,
}

/// Destination for recorded frames.
///
/// `finish` consumes the sink, so a recording is finalized at most once.
pub trait FrameSink: Send {
    fn write_frame(&mut self, frame: &Frame) -> impl Future<Output = Result<(), WriterError>> + Send;

    fn finish(self) -> impl Future<Output = Result<FinishedRecording, WriterError>> + Send
    where
        Self: Sized;
}
