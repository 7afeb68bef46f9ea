// THEORY:
// The `MorphologicalFilter` cleans the raw foreground mask before blobs are
// extracted. Background subtraction leaves two kinds of damage: isolated
// speckle pixels where sensor noise slipped past the smoother, and small
// holes inside genuine foreground regions where a bee's body happened to
// match the board's luminance. An erosion pass removes the speckle, and a
// dilation pass restores the surviving regions and fills the holes.
//
// Key architectural principles:
// 1.  **Fixed order**: Erode first, dilate second. Running the passes in the
//     opposite order would weld speckle into the regions instead of removing
//     it.
// 2.  **Calibrated kernels**: The two square structuring elements are the
//     pipeline's blob-size calibration surface. Smaller bees need a gentler
//     erosion and a stronger dilation; the orchestrator maps the operator's
//     calibration choice onto the two sizes.
// 3.  **Deferred effect**: New kernel sizes simply overwrite the fields and
//     apply from the next `process` call. The pipeline finishes one frame
//     before starting the next, so there is no in-flight work to disturb.

use crate::core_modules::frame::{BACKGROUND, FOREGROUND, Mask};
use crate::error::{Result, VisionError};

/// The widest calibration pair (the `Big` mapping) is the starting point.
const DEFAULT_DILATE_KERNEL_SIZE: u32 = 3;
const DEFAULT_ERODE_KERNEL_SIZE: u32 = 2;

/// Erosion-then-dilation cleanup of the foreground mask.
#[derive(Debug)]
pub struct MorphologicalFilter {
    dilate_kernel_size: u32,
    erode_kernel_size: u32,
}

impl MorphologicalFilter {
    pub fn new() -> Self {
        Self {
            dilate_kernel_size: DEFAULT_DILATE_KERNEL_SIZE,
            erode_kernel_size: DEFAULT_ERODE_KERNEL_SIZE,
        }
    }

    /// Runs the erosion pass followed by the dilation pass. The output mask
    /// has the same dimensions as the input.
    pub fn process(&self, mask: &Mask) -> Result<Mask> {
        let eroded = Self::apply_square_kernel(mask, self.erode_kernel_size, false);
        Ok(Self::apply_square_kernel(
            &eroded,
            self.dilate_kernel_size,
            true,
        ))
    }

    pub fn set_dilate_kernel_size(&mut self, size: u32) -> Result<()> {
        Self::validate_kernel_size(size)?;
        self.dilate_kernel_size = size;
        Ok(())
    }

    pub fn set_erode_kernel_size(&mut self, size: u32) -> Result<()> {
        Self::validate_kernel_size(size)?;
        self.erode_kernel_size = size;
        Ok(())
    }

    /// Calibration-table path. The table only contains valid sizes, so this
    /// skips the parameter check the public setters perform.
    pub(crate) fn set_kernel_sizes(&mut self, dilate: u32, erode: u32) {
        self.dilate_kernel_size = dilate;
        self.erode_kernel_size = erode;
    }

    pub fn dilate_kernel_size(&self) -> u32 {
        self.dilate_kernel_size
    }

    pub fn erode_kernel_size(&self) -> u32 {
        self.erode_kernel_size
    }

    fn validate_kernel_size(size: u32) -> Result<()> {
        if size == 0 {
            return Err(VisionError::InvalidParameter(
                "kernel size must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Slides an n x n window over the mask. Dilation keeps a pixel if any
    /// window pixel is foreground; erosion requires the whole window.
    /// The anchor sits at the window center, biased forward for even sizes.
    fn apply_square_kernel(mask: &Mask, size: u32, dilate: bool) -> Mask {
        if size == 1 {
            return mask.clone();
        }
        let width = mask.width() as i64;
        let height = mask.height() as i64;
        let reach_before = ((size - 1) / 2) as i64;
        let reach_after = (size / 2) as i64;

        let mut out = Mask::zeroed(mask.width(), mask.height());
        for y in 0..height {
            for x in 0..width {
                let mut any = false;
                let mut all = true;
                for wy in (y - reach_before)..=(y + reach_after) {
                    for wx in (x - reach_before)..=(x + reach_after) {
                        let inside = wx >= 0 && wx < width && wy >= 0 && wy < height;
                        let on = inside && mask.is_foreground(wx as u32, wy as u32);
                        any |= on;
                        // Window pixels outside the image count as background.
                        all &= on;
                    }
                }
                let keep = if dilate { any } else { all };
                out.set(
                    x as u32,
                    y as u32,
                    if keep { FOREGROUND } else { BACKGROUND },
                );
            }
        }
        out
    }
}

impl Default for MorphologicalFilter {
    fn default() -> Self {
        Self::new()
    }
}
