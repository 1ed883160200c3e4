use image::{imageops, GrayImage, RgbImage};
use tracing::debug;

use super::traits::BackgroundModel;

/// Running-average background subtractor.
///
/// Keeps a per-pixel luma mean. Each applied frame yields `|luma - mean|` and
/// then pulls the mean towards the frame with learning rate
/// `1 / min(frames_seen, history)`. The rate starts at 1 so the model settles
/// quickly on a fresh scene, and bottoms out at `1 / history` for slow drift.
///
/// The first frame (and any frame whose dimensions differ from the model)
/// re-seeds the mean and produces an all-zero delta.
pub struct RunningAverage {
    mean: Vec<f32>,
    width: u32,
    height: u32,
    frames_seen: u32,
    history: u32,
}

impl RunningAverage {
    pub fn new(history: u32) -> Self {
        Self {
            mean: Vec::new(),
            width: 0,
            height: 0,
            frames_seen: 0,
            history: history.max(1),
        }
    }

    /// Number of frames folded into the current model.
    #[cfg(test)]
    pub fn frames_seen(&self) -> u32 {
        self.frames_seen
    }

    fn seed(&mut self, luma: &GrayImage) {
        self.width = luma.width();
        self.height = luma.height();
        self.mean = luma.as_raw().iter().map(|&p| p as f32).collect();
        self.frames_seen = 1;
        debug!(
            width = self.width,
            height = self.height,
            "background model seeded"
        );
    }

    fn learning_rate(&self) -> f32 {
        1.0 / self.frames_seen.min(self.history) as f32
    }
}

impl BackgroundModel for RunningAverage {
    fn apply(&mut self, frame: &RgbImage) -> GrayImage {
        let luma = imageops::grayscale(frame);

        if self.frames_seen == 0 || luma.dimensions() != (self.width, self.height) {
            self.seed(&luma);
            return GrayImage::new(luma.width(), luma.height());
        }

        self.frames_seen = self.frames_seen.saturating_add(1);
        let alpha = self.learning_rate();

        let mut delta = GrayImage::new(self.width, self.height);
        for ((out, &pixel), mean) in delta
            .iter_mut()
            .zip(luma.as_raw().iter())
            .zip(self.mean.iter_mut())
        {
            let value = pixel as f32;
            *out = (value - *mean).abs().round().min(255.0) as u8;
            *mean += alpha * (value - *mean);
        }
        delta
    }

    fn name(&self) -> &str {
        "running-average"
    }
}
