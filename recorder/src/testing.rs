//! Test doubles for the camera, the background model and the writer.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{GrayImage, Rgb, RgbImage};
use motion_recorder_common::frame::Frame;

use crate::capture::{CaptureError, FrameSource};
use crate::detect::background::RunningAverage;
use crate::detect::traits::BackgroundModel;
use crate::lifecycle::StopHandle;
use crate::writer::{FinishedRecording, FrameSink, WriterError};

pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// A 160x120 mid-gray frame with white squares given as `(x, y, side)`.
pub fn gray_scene(squares: &[(u32, u32, u32)]) -> Frame {
    let mut img = RgbImage::from_pixel(160, 120, GRAY);
    for &(x0, y0, side) in squares {
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                img.put_pixel(x, y, WHITE);
            }
        }
    }
    Frame::new(img, 0)
}

/// Plays back a fixed list of reads, numbering frames in order.
///
/// Once the script has been handed out it can optionally request a stop, so
/// the loop sees the request right after processing the last scripted frame.
/// Reading past the end is a camera failure.
pub struct ScriptedSource {
    script: VecDeque<Result<Frame, CaptureError>>,
    next_seq: u64,
    stop: Option<StopHandle>,
    released: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Frame, CaptureError>>) -> Self {
        Self {
            script: script.into(),
            next_seq: 0,
            stop: None,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop_when_exhausted(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Flag set when the source is dropped.
    pub fn released(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl FrameSource for ScriptedSource {
    async fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let next = self.script.pop_front().unwrap_or(Err(CaptureError::EndOfStream));
        if self.script.is_empty() {
            if let Some(stop) = self.stop.take() {
                stop.request();
            }
        }
        next.map(|mut frame| {
            frame.seq = self.next_seq;
            self.next_seq += 1;
            frame
        })
    }
}

impl Drop for ScriptedSource {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Real running-average model that counts calls and reports its release.
pub struct CountingModel {
    inner: RunningAverage,
    applied: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl CountingModel {
    pub fn new() -> Self {
        Self {
            inner: RunningAverage::new(500),
            applied: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn applied(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.applied)
    }

    pub fn released(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl BackgroundModel for CountingModel {
    fn apply(&mut self, frame: &RgbImage) -> GrayImage {
        self.applied.fetch_add(1, Ordering::SeqCst);
        self.inner.apply(frame)
    }
}

impl Drop for CountingModel {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct SinkLog {
    pub frames: Vec<Frame>,
    pub finished: u32,
}

/// Keeps written frames in memory, shared with the test through a mutex.
pub struct MemorySink {
    log: Arc<Mutex<SinkLog>>,
}

impl MemorySink {
    pub fn new() -> (Self, Arc<Mutex<SinkLog>>) {
        let log = Arc::new(Mutex::new(SinkLog::default()));
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl FrameSink for MemorySink {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), WriterError> {
        self.log.lock().unwrap().frames.push(frame.clone());
        Ok(())
    }

    async fn finish(self) -> Result<FinishedRecording, WriterError> {
        let mut log = self.log.lock().unwrap();
        log.finished += 1;
        Ok(FinishedRecording {
            path: PathBuf::from("memory"),
            frame_count: log.frames.len() as u64,
        })
    }
}
