use image::{GrayImage, RgbImage};

/// Online model of the static scene.
///
/// Implementations receive every non-empty frame in capture order. Each call
/// both classifies the frame against the current model and folds the frame
/// into it, so there is no separate training phase.
pub trait BackgroundModel: Send {
    /// Returns the per-pixel change magnitude for `frame` and updates the model.
    fn apply(&mut self, frame: &RgbImage) -> GrayImage;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
