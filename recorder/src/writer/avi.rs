use std::path::{Path, PathBuf};
use std::process::Stdio;

use motion_recorder_common::config::RecordingConfig;
use motion_recorder_common::frame::Frame;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, error, info, warn};

use super::{FinishedRecording, FrameSink, WriterError};

/// Video writer backed by an `ffmpeg` child reading `rgb24` frames on stdin.
///
/// The container is only complete once [`FrameSink::finish`] has closed stdin
/// and ffmpeg has exited.
pub struct AviWriter {
    child: Child,
    stdin: ChildStdin,
    output_path: PathBuf,
    width: u32,
    height: u32,
    frame_count: u64,
}

/// ffmpeg encoder for a FourCC codec tag.
fn encoder_for_tag(tag: &str) -> &'static str {
    match tag.to_ascii_uppercase().as_str() {
        "XVID" | "DIVX" | "FMP4" | "MP4V" => "mpeg4",
        "H264" | "X264" | "AVC1" => "libx264",
        _ => "mjpeg",
    }
}

impl AviWriter {
    /// Spawn an ffmpeg subprocess ready to receive raw frames of the given size.
    pub fn open(
        ffmpeg_bin: &str,
        config: &RecordingConfig,
        output_path: PathBuf,
        width: u32,
        height: u32,
    ) -> Result<Self, WriterError> {
        let dir = output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if !dir.is_dir() {
            return Err(WriterError::OutputDir(dir.display().to_string()));
        }

        let vcodec = encoder_for_tag(&config.codec_tag);
        let size = format!("{width}x{height}");
        let fps = config.fps.to_string();
        let output = output_path.to_string_lossy().into_owned();

        let mut cmd = Command::new(ffmpeg_bin);
        cmd.args([
            "-hide_banner",
            "-loglevel", "error",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-s", &size,
            "-r", &fps,
            "-i", "pipe:0",
            "-c:v", vcodec,
            "-q:v", "3",
            "-vtag", &config.codec_tag,
            "-y",
            &output,
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| WriterError::Spawn(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WriterError::Spawn("could not get stdin handle".into()))?;

        info!(
            path = %output_path.display(),
            codec = vcodec,
            tag = config.codec_tag,
            fps = config.fps,
            width,
            height,
            "video writer opened"
        );

        Ok(Self {
            child,
            stdin,
            output_path,
            width,
            height,
            frame_count: 0,
        })
    }
}

impl FrameSink for AviWriter {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), WriterError> {
        if (frame.width(), frame.height()) != (self.width, self.height) {
            return Err(WriterError::FrameSize {
                got_width: frame.width(),
                got_height: frame.height(),
                width: self.width,
                height: self.height,
            });
        }

        self.stdin
            .write_all(frame.as_rgb24())
            .await
            .map_err(|e| WriterError::Write(e.to_string()))?;
        self.frame_count += 1;
        debug!(frame_count = self.frame_count, seq = frame.seq, "pushed frame to writer");
        Ok(())
    }

    /// Close stdin and wait for ffmpeg to write the container trailer.
    async fn finish(mut self) -> Result<FinishedRecording, WriterError> {
        if let Err(e) = self.stdin.flush().await {
            warn!(error = %e, "failed to flush writer stdin");
        }
        // Close stdin so ffmpeg knows there are no more frames.
        drop(self.stdin);

        let output = self
            .child
            .wait_with_output()
            .await
            .map_err(|e| WriterError::Wait(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(stderr = %stderr, "ffmpeg exited with error");
            return Err(WriterError::FfmpegFailed(stderr.into_owned()));
        }

        info!(
            path = %self.output_path.display(),
            frame_count = self.frame_count,
            "recording finalized"
        );

        Ok(FinishedRecording {
            path: self.output_path,
            frame_count: self.frame_count,
        })
    }
}

/// Check whether ffmpeg is available. Logs a warning if not found.
pub async fn check_ffmpeg_available(ffmpeg_bin: &str) {
    match Command::new(ffmpeg_bin).arg("-version").output().await {
        Ok(out) if out.status.success() => {
            debug!(ffmpeg_bin, "ffmpeg is available");
        }
        Ok(_) => {
            warn!(ffmpeg_bin, "ffmpeg returned non-zero for -version; capture and encoding may fail");
        }
        Err(e) => {
            warn!(
                ffmpeg_bin,
                error = %e,
                "ffmpeg not found; the camera cannot be opened and nothing will be recorded. \
                 Install ffmpeg with v4l2 and mjpeg support."
            );
        }
    }
}
