// THEORY:
// The `BackgroundModel` is the stateful heart of the counting pipeline. It
// maintains a per-pixel statistical picture of the static scene (the hive
// entrance board) and, for every new frame, separates pixels that behave like
// that picture from pixels that do not. Bees moving across the board show up
// as statistical outliers; the board itself, and its slow lighting changes,
// are absorbed into the model.
//
// Key architectural principles:
// 1.  **Running Gaussian per pixel**: Each pixel location keeps a running mean
//     and variance of its luminance. The learning rate ramps from 1 down to
//     1/history_length over the first frames, so the model warms up quickly
//     and then adapts at a steady pace. The variance has a floor, so a
//     perfectly static history never classifies sensor-level equality as
//     foreground.
// 2.  **Shadow suppression**: A bee's shadow darkens the board without
//     changing what is there. A pixel that is darker than its model but still
//     within a luminance ratio of the learned mean is classified as shadow
//     and reported as background.
// 3.  **Dimension lock**: The statistics vectors are shaped by the first
//     observed frame. A frame of any other size cannot be folded into them
//     and is rejected before any state is touched.
// 4.  **No implicit reset**: State persists for the life of the instance.
//     Long-running drift is the adaptive behavior the stage exists to
//     provide, not corruption. A fresh model means a fresh instance.

use crate::core_modules::frame::{FOREGROUND, Frame, Mask};
use crate::error::{Result, VisionError};

const DEFAULT_HISTORY_LENGTH: u32 = 10;
const DEFAULT_SHADOW_THRESHOLD: f64 = 0.7;

/// Variance seeded into every pixel by the first observed frame.
const INITIAL_VARIANCE: f64 = 100.0;
/// Keeps a static history from treating equality as an anomaly.
const MIN_VARIANCE: f64 = 4.0;
/// Keeps one extreme outlier from blinding a pixel for many frames.
const MAX_VARIANCE: f64 = 5_000.0;
/// How many standard deviations a luminance may sit from the mean and still
/// count as background.
const MATCH_THRESHOLD_STD_DEV: f64 = 2.0;

/// Adaptive per-pixel model of the static scene.
pub struct BackgroundModel {
    history_length: u32,
    shadow_threshold: f64,
    /// Locked by the first observed frame.
    dimensions: Option<(u32, u32)>,
    mean: Vec<f64>,
    variance: Vec<f64>,
    frames_seen: u64,
}

impl BackgroundModel {
    /// `history_length` controls how many recent frames dominate the model;
    /// `shadow_threshold` is the darkening ratio above which a non-matching
    /// pixel is treated as shadow rather than foreground.
    pub fn new(history_length: u32, shadow_threshold: f64) -> Self {
        Self {
            history_length: history_length.max(1),
            shadow_threshold,
            dimensions: None,
            mean: Vec::new(),
            variance: Vec::new(),
            frames_seen: 0,
        }
    }

    /// Folds the frame into the model and emits the foreground mask.
    ///
    /// The first frame seeds the statistics and locks the model to its
    /// dimensions; it always yields an all-background mask because there is
    /// nothing to deviate from yet.
    pub fn process(&mut self, frame: &Frame) -> Result<Mask> {
        match self.dimensions {
            None => return Ok(self.observe_first(frame)),
            Some((width, height)) if width != frame.width() || height != frame.height() => {
                return Err(VisionError::InvalidFrame(format!(
                    "frame is {}x{} but the model is locked to {width}x{height}",
                    frame.width(),
                    frame.height()
                )));
            }
            Some(_) => {}
        }

        self.frames_seen += 1;
        let learning_rate = 1.0 / self.frames_seen.min(self.history_length as u64) as f64;

        let mut mask = Mask::zeroed(frame.width(), frame.height());
        let output = mask.data_mut();
        for index in 0..frame.pixel_count() {
            let luminance = frame.luminance(index);

            // Update the statistics first, then classify against them.
            let delta = luminance - self.mean[index];
            self.mean[index] += learning_rate * delta;
            self.variance[index] = (self.variance[index]
                + learning_rate * (delta * delta - self.variance[index]))
                .clamp(MIN_VARIANCE, MAX_VARIANCE);

            let deviation = luminance - self.mean[index];
            let tolerance = MATCH_THRESHOLD_STD_DEV * self.variance[index].sqrt();
            if deviation.abs() <= tolerance {
                continue; // Background, mask already zeroed.
            }
            if deviation < 0.0 && self.is_shadow(luminance, self.mean[index]) {
                continue; // Shadow is reported as background.
            }
            output[index] = FOREGROUND;
        }
        Ok(mask)
    }

    fn observe_first(&mut self, frame: &Frame) -> Mask {
        self.dimensions = Some((frame.width(), frame.height()));
        self.mean = (0..frame.pixel_count()).map(|i| frame.luminance(i)).collect();
        self.variance = vec![INITIAL_VARIANCE; frame.pixel_count()];
        self.frames_seen = 1;
        Mask::zeroed(frame.width(), frame.height())
    }

    /// A darker pixel whose luminance is still a high fraction of the learned
    /// mean is the scene under a shadow, not an object.
    fn is_shadow(&self, luminance: f64, mean: f64) -> bool {
        mean > f64::EPSILON && luminance / mean >= self.shadow_threshold
    }
}

impl Default for BackgroundModel {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LENGTH, DEFAULT_SHADOW_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::BACKGROUND;

    fn solid_frame(width: u32, height: u32, value: u8) -> Frame {
        let data = (0..width * height)
            .flat_map(|_| [value, value, value, 255])
            .collect();
        Frame::from_rgba(width, height, data).expect("valid frame")
    }

    fn warm_model(model: &mut BackgroundModel, frame: &Frame, frames: usize) {
        for _ in 0..frames {
            model.process(frame).expect("warm-up frame");
        }
    }

    #[test]
    fn static_scene_converges_to_empty_mask() {
        let mut model = BackgroundModel::default();
        let frame = solid_frame(16, 16, 90);
        warm_model(&mut model, &frame, 12);

        let mask = model.process(&frame).expect("steady-state frame");
        assert!(mask.data().iter().all(|&v| v == BACKGROUND));
    }

    #[test]
    fn bright_object_after_warmup_is_foreground() {
        let mut model = BackgroundModel::default();
        let background = solid_frame(8, 8, 0);
        warm_model(&mut model, &background, 10);

        let object = solid_frame(8, 8, 255);
        let mask = model.process(&object).expect("object frame");
        assert!(mask.data().iter().all(|&v| v == FOREGROUND));
    }

    #[test]
    fn moderate_darkening_is_classified_as_shadow() {
        let mut model = BackgroundModel::default();
        let background = solid_frame(8, 8, 200);
        warm_model(&mut model, &background, 10);

        // 160/200 = 0.8, above the 0.7 shadow threshold.
        let shadowed = solid_frame(8, 8, 160);
        let mask = model.process(&shadowed).expect("shadow frame");
        assert!(mask.data().iter().all(|&v| v == BACKGROUND));
    }

    #[test]
    fn deep_darkening_is_foreground() {
        let mut model = BackgroundModel::default();
        let background = solid_frame(8, 8, 200);
        warm_model(&mut model, &background, 10);

        let dark_object = solid_frame(8, 8, 40);
        let mask = model.process(&dark_object).expect("dark object frame");
        assert!(mask.data().iter().all(|&v| v == FOREGROUND));
    }

    #[test]
    fn dimension_change_is_rejected_without_touching_state() {
        let mut model = BackgroundModel::default();
        let first = solid_frame(64, 48, 10);
        model.process(&first).expect("first frame");

        let smaller = solid_frame(32, 24, 10);
        let result = model.process(&smaller);
        assert!(matches!(result, Err(VisionError::InvalidFrame(_))));

        // The original dimensions still work afterwards.
        model.process(&first).expect("original dimensions still accepted");
    }
}
