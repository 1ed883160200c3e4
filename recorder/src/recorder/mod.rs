pub mod stats;

use std::path::PathBuf;

use chrono::Local;
use motion_recorder_common::config::{Config, OverlayConfig};
use motion_recorder_common::frame::{format_timestamp, Frame};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use crate::capture::camera::FfmpegCamera;
use crate::capture::{CaptureError, FrameSource};
use crate::detect::background::RunningAverage;
use crate::detect::classify::Status;
use crate::detect::traits::BackgroundModel;
use crate::detect::MotionDetector;
use crate::writer::avi::AviWriter;
use crate::writer::{keys, overlay, FrameSink, WriterError};

pub use stats::RecorderStats;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("cannot read initial frame: {0}")]
    InitialFrame(CaptureError),
    #[error("camera failure: {0}")]
    Capture(#[from] CaptureError),
    #[error("video writer failure: {0}")]
    Writer(#[from] WriterError),
}

/// The capture → detect → record loop and everything it owns.
///
/// Resources are released in reverse order of acquisition: the writer is
/// finalized first, then the model goes, then the camera. Fields drop in
/// declaration order, so a `Recorder` dropped before `run` keeps that order.
pub struct Recorder<S, W, M> {
    sink: W,
    detector: MotionDetector<M>,
    source: S,
    overlay: OverlayConfig,
    stats: RecorderStats,
}

impl Recorder<FfmpegCamera, AviWriter, RunningAverage> {
    /// Open the configured camera and an AVI writer named after the current time.
    pub async fn open(config: &Config) -> Result<Self, RecorderError> {
        let camera = FfmpegCamera::open(&config.camera)?;
        let ffmpeg_bin = config.camera.ffmpeg_bin.clone();
        Self::start(
            camera,
            RunningAverage::new(config.detection.history),
            config,
            |path, width, height| {
                AviWriter::open(&ffmpeg_bin, &config.recording, path, width, height)
            },
        )
        .await
    }
}

impl<S, W, M> Recorder<S, W, M>
where
    S: FrameSource,
    W: FrameSink,
    M: BackgroundModel,
{
    /// Size the output from the first frame and open the sink.
    ///
    /// `open_sink` receives the output path and the frame dimensions. The
    /// sizing frame only provides dimensions; it never reaches the model.
    pub async fn start<F>(
        mut source: S,
        model: M,
        config: &Config,
        open_sink: F,
    ) -> Result<Self, RecorderError>
    where
        F: FnOnce(PathBuf, u32, u32) -> Result<W, WriterError>,
    {
        let first = initial_frame(&mut source).await?;
        let path = keys::output_path(&config.recording, &Local::now());
        info!(
            width = first.width(),
            height = first.height(),
            path = %path.display(),
            "initial frame read"
        );

        let sink = open_sink(path, first.width(), first.height())?;
        let detector = MotionDetector::new(model, config.detection.clone());

        Ok(Self {
            sink,
            detector,
            source,
            overlay: config.overlay.clone(),
            stats: RecorderStats::default(),
        })
    }

    /// Run until a stop request arrives or the camera fails.
    ///
    /// The stop channel is polled once at the top of every iteration and never
    /// awaited, so shutdown waits for any camera read already in progress. A
    /// closed channel counts as a stop request. The sink is finalized on both
    /// a clean stop and a fatal error; the loop error wins over a finalize error.
    pub async fn run(mut self, mut stop: mpsc::Receiver<()>) -> Result<RecorderStats, RecorderError> {
        info!("recording loop running");
        let outcome = self.process(&mut stop).await;
        self.shutdown(outcome).await
    }

    async fn process(&mut self, stop: &mut mpsc::Receiver<()>) -> Result<(), RecorderError> {
        loop {
            match stop.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => {
                    info!("stop requested");
                    return Ok(());
                }
                Err(TryRecvError::Empty) => {}
            }

            let mut frame = self.source.read_frame().await?;
            self.stats.read += 1;
            if self.stats.read % 100 == 0 {
                debug!(read = self.stats.read, written = self.stats.written, "frames processed");
            }

            if frame.is_empty() {
                self.stats.skipped += 1;
                continue;
            }

            let detection = self.detector.detect(&frame.image);
            match detection.status {
                Status::Still => self.stats.still += 1,
                Status::Motion => {
                    let now = format_timestamp(&Local::now());
                    overlay::stamp(&mut frame.image, &now, &self.overlay);
                    self.sink.write_frame(&frame).await?;
                    self.stats.written += 1;
                    debug!(
                        seq = frame.seq,
                        contours = detection.contours,
                        area = detection.deciding_area,
                        stamp = now,
                        "motion frame written"
                    );
                }
            }
        }
    }

    /// Finalize the writer, then release the model and the camera.
    async fn shutdown(
        self,
        outcome: Result<(), RecorderError>,
    ) -> Result<RecorderStats, RecorderError> {
        let Recorder {
            sink,
            detector,
            source,
            stats,
            ..
        } = self;

        let finished = sink.finish().await;
        drop(detector);
        drop(source);

        match (outcome, finished) {
            (Ok(()), Ok(finished)) => {
                info!(
                    path = %finished.path.display(),
                    frames_written = finished.frame_count,
                    read = stats.read,
                    processed = stats.processed(),
                    skipped = stats.skipped,
                    still = stats.still,
                    "recording loop stopped"
                );
                Ok(stats)
            }
            (Ok(()), Err(e)) => Err(e.into()),
            (Err(e), Ok(finished)) => {
                warn!(
                    path = %finished.path.display(),
                    frames_written = finished.frame_count,
                    "recording finalized after loop failure"
                );
                Err(e)
            }
            (Err(e), Err(finish_err)) => {
                error!(error = %finish_err, "failed to finalize recording after loop failure");
                Err(e)
            }
        }
    }
}

/// First non-empty frame from the source. Empty reads are skipped, errors are fatal.
async fn initial_frame<S: FrameSource>(source: &mut S) -> Result<Frame, RecorderError> {
    loop {
        let frame = source
            .read_frame()
            .await
            .map_err(RecorderError::InitialFrame)?;
        if !frame.is_empty() {
            return Ok(frame);
        }
    }
}
