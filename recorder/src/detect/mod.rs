pub mod background;
pub mod classify;
pub mod contours;
pub mod mask;
pub mod traits;

use image::RgbImage;
use motion_recorder_common::config::DetectionConfig;
use tracing::debug;

use self::classify::{classify, Status};
use self::contours::{find_external_contours, Contour};
use self::traits::BackgroundModel;

/// Outcome of running one frame through the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub status: Status,
    pub contours: usize,
    /// Area of the contour that decided the status, if any.
    pub deciding_area: Option<f64>,
}

/// Background subtraction → threshold → dilation → external contours →
/// last-contour classification.
pub struct MotionDetector<M> {
    model: M,
    config: DetectionConfig,
}

impl<M: BackgroundModel> MotionDetector<M> {
    pub fn new(model: M, config: DetectionConfig) -> Self {
        Self { model, config }
    }

    /// Feed one non-empty frame. Updates the background model.
    pub fn detect(&mut self, frame: &RgbImage) -> Detection {
        let delta = self.model.apply(frame);
        let thresholded = mask::threshold(&delta, self.config.threshold);
        let dilated = mask::dilate(&thresholded, self.config.kernel_size);
        let contours = find_external_contours(&dilated);

        let areas: Vec<f64> = contours.iter().map(Contour::area).collect();
        let status = classify(areas.iter().copied(), self.config.min_area);

        debug!(
            model = self.model.name(),
            contours = contours.len(),
            areas = ?areas,
            %status,
            "frame classified"
        );

        Detection {
            status,
            contours: contours.len(),
            deciding_area: areas.last().copied(),
        }
    }
}
