use std::io::Cursor;
use std::path::Path;
use std::process::Stdio;

use image::ImageReader;
use motion_recorder_common::config::CameraConfig;
use motion_recorder_common::frame::Frame;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, trace, warn};

use super::mjpeg::JpegSplitter;
use super::{CaptureError, FrameSource};

const READ_CHUNK: usize = 64 * 1024;

/// Camera handle backed by an `ffmpeg` child that grabs the device and writes
/// MJPEG images to its stdout.
///
/// The child is killed when the handle is dropped.
pub struct FfmpegCamera {
    child: Child,
    stdout: ChildStdout,
    splitter: JpegSplitter,
    chunk: Vec<u8>,
    device: String,
    next_seq: u64,
}

impl FfmpegCamera {
    /// Spawn ffmpeg against the configured device.
    pub fn open(config: &CameraConfig) -> Result<Self, CaptureError> {
        let device = config.device_path();
        if config.input_format == "v4l2" && !Path::new(&device).exists() {
            return Err(CaptureError::Device(device));
        }

        let mut cmd = Command::new(&config.ffmpeg_bin);
        cmd.args([
            "-hide_banner",
            "-loglevel", "error",
            "-f", &config.input_format,
            "-i", &device,
            "-f", "image2pipe",
            "-c:v", "mjpeg",
            "-q:v", "3",
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| CaptureError::Spawn(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Spawn("could not get stdout handle".into()))?;

        if let Some(stderr) = child.stderr.take() {
            let device = device.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!(device, line, "camera ffmpeg");
                }
            });
        }

        info!(
            device,
            format = config.input_format,
            pid = child.id(),
            "camera opened"
        );

        Ok(Self {
            child,
            stdout,
            splitter: JpegSplitter::new(),
            chunk: vec![0u8; READ_CHUNK],
            device,
            next_seq: 0,
        })
    }

    fn decode(&mut self, jpeg: &[u8]) -> Frame {
        let seq = self.next_seq;
        self.next_seq += 1;

        let decoded = ImageReader::new(Cursor::new(jpeg))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.decode().ok());

        match decoded {
            Some(img) => Frame::new(img.to_rgb8(), seq),
            None => {
                trace!(seq, bytes = jpeg.len(), "undecodable camera image");
                Frame::empty(seq)
            }
        }
    }
}

impl FrameSource for FfmpegCamera {
    async fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        loop {
            if let Some(jpeg) = self.splitter.next_image() {
                return Ok(self.decode(&jpeg));
            }

            let n = self
                .stdout
                .read(&mut self.chunk)
                .await
                .map_err(|e| CaptureError::Read(e.to_string()))?;
            if n == 0 {
                return Err(CaptureError::EndOfStream);
            }
            self.splitter.push(&self.chunk[..n]);
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        if let Err(e) = self.child.start_kill() {
            // already exited
            debug!(device = self.device, error = %e, "camera process not killed");
        }
        debug!(
            device = self.device,
            frames = self.next_seq,
            pending = self.splitter.pending(),
            "camera released"
        );
    }
}
