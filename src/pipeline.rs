// THEORY:
// The `pipeline` module is the top-level API for the bee-counting engine. It
// encapsulates the four processing stages into a single, easy-to-use
// interface: feed it one frame per capture tick, get back the number of bees
// visible in that frame, and optionally pull the annotated frame for display.
//
// The stage order is fixed: smooth, subtract background, clean the mask,
// extract blobs. The pipeline owns all four stages for the whole counting
// session, because the background model's adaptive state only makes sense
// when it sees every frame of one camera stream in order. There is no reset
// API; a new session is a new pipeline value with fresh state, which also
// keeps test instances fully isolated from each other.
//
// The pipeline is synchronous and single-threaded by design. One call
// completes before the next begins, intermediate buffers are dropped the
// moment the next stage has consumed them, and callers that capture on a
// separate thread must serialize access themselves.

use crate::core_modules::background_model::BackgroundModel;
use crate::core_modules::blob_extractor::BlobExtractor;
use crate::core_modules::morphology::MorphologicalFilter;
use crate::core_modules::smoother::FrameSmoother;
use crate::error::Result;
use std::time::Instant;
use tracing::debug;

// Re-export the data containers for the public API.
pub use crate::core_modules::frame::{Frame, Mask};

/// Operator-selected calibration for the expected on-screen size of a bee,
/// mapped onto the morphology kernel pair by `update_blob_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobSize {
    Small,
    Normal,
    Big,
}

/// Construction-time knobs for a counting session. The defaults reproduce
/// the values the pipeline has been field-calibrated with: a background
/// history of 10 frames, a shadow threshold of 0.7, and an area window of
/// [15, 800] pixels.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How many recent frames dominate the background model.
    pub history_length: u32,
    /// Darkening ratio above which a deviating pixel counts as shadow.
    pub shadow_threshold: f64,
    /// Smallest blob area counted as a bee.
    pub min_area: f64,
    /// Largest blob area counted as a bee.
    pub max_area: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_length: 10,
            shadow_threshold: 0.7,
            min_area: 15.0,
            max_area: 800.0,
        }
    }
}

/// The main, top-level struct for the counting engine. One instance per
/// counting session; it owns its stages and their state exclusively.
pub struct BeeCountingPipeline {
    smoother: FrameSmoother,
    background: BackgroundModel,
    morphology: MorphologicalFilter,
    extractor: BlobExtractor,
    processed_frame: Option<Frame>,
}

impl BeeCountingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            smoother: FrameSmoother::new(),
            background: BackgroundModel::new(config.history_length, config.shadow_threshold),
            morphology: MorphologicalFilter::new(),
            extractor: BlobExtractor::new(config.min_area, config.max_area),
            processed_frame: None,
        }
    }

    /// Runs the full stage sequence on one frame and returns the number of
    /// bee-sized regions found. The annotated frame is retained until the
    /// next call and can be fetched with `processed_frame`.
    ///
    /// A failed frame aborts cleanly: the error propagates, the previous
    /// annotated frame stays available, and the next valid frame proceeds
    /// with background learning uninterrupted.
    pub fn count_bees(&mut self, frame: &Frame) -> Result<usize> {
        let started = Instant::now();

        let smoothed = self.smoother.process(frame)?;
        let foreground = self.background.process(&smoothed)?;
        drop(smoothed);
        let cleaned = self.morphology.process(&foreground)?;
        drop(foreground);
        let annotated = self.extractor.process(&cleaned)?;
        drop(cleaned);

        self.processed_frame = Some(annotated);
        let count = self.extractor.count();
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            count, "count_bees finished"
        );
        Ok(count)
    }

    /// The annotated frame from the most recent successful `count_bees`
    /// call, or `None` before the first one.
    pub fn processed_frame(&self) -> Option<&Frame> {
        self.processed_frame.as_ref()
    }

    /// Maps the calibration choice onto the morphology kernel pair and
    /// applies it starting with the next frame.
    pub fn update_blob_size(&mut self, size: BlobSize) {
        let (dilate, erode) = match size {
            BlobSize::Small => (2, 3),
            BlobSize::Normal => (3, 3),
            // Anything else falls through to the Big pair.
            _ => (3, 2),
        };
        self.morphology.set_kernel_sizes(dilate, erode);
    }

    pub fn update_min_area(&mut self, min_area: f64) {
        self.extractor.set_min_area(min_area);
    }

    pub fn update_max_area(&mut self, max_area: f64) {
        self.extractor.set_max_area(max_area);
    }
}

impl Default for BeeCountingPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
