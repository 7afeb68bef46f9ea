// THEORY:
// The `frame` module holds the two "dumb" data containers that flow between
// the pipeline stages: `Frame` (a full-color RGBA image) and `Mask` (a
// single-channel foreground map). Neither type knows anything about blurring,
// background statistics, or blobs; they only guarantee that their buffer is
// consistent with their declared dimensions.
//
// Key architectural principles:
// 1.  **Validated at the boundary**: Both containers can only be built through
//     constructors that check the buffer length against the dimensions. Once a
//     `Frame` or `Mask` exists, every stage may index into it without
//     re-checking, which keeps the per-frame hot loops free of defensive code.
// 2.  **Transient hand-off**: Masks live for exactly one pipeline invocation.
//     They are produced by one stage, consumed by the next, and dropped as
//     soon as the next stage has produced its own output, bounding peak memory
//     during sustained frame-by-frame operation.
// 3.  **Luminance as the analysis channel**: The background model operates on
//     perceived brightness, so `Frame` exposes a Rec. 601 luma per pixel. The
//     full color data is kept for smoothing and for the annotated output.

pub type Byte = u8;

const CHANNELS: usize = 4;

/// Mask value for pixels classified as moving foreground.
pub const FOREGROUND: Byte = 255;
/// Mask value for background and shadow pixels.
pub const BACKGROUND: Byte = 0;

use crate::error::{Result, VisionError};

/// A "dumb" data container for one captured RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<Byte>,
}

impl Frame {
    /// Builds a frame from a raw RGBA buffer, validating that the buffer
    /// length matches the declared dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<Byte>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(VisionError::InvalidFrame(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(VisionError::InvalidFrame(format!(
                "buffer holds {} bytes but {width}x{height} RGBA needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[Byte] {
        &self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Luminance estimate (Rec. 601 luma) of the pixel at a flat index.
    pub fn luminance(&self, pixel_index: usize) -> f64 {
        let base = pixel_index * CHANNELS;
        0.299_f64 * self.data[base] as f64
            + 0.587_f64 * self.data[base + 1] as f64
            + 0.114_f64 * self.data[base + 2] as f64
    }
}

/// A single-channel foreground map produced and consumed between stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<Byte>,
}

impl Mask {
    /// Builds a mask from a raw single-channel buffer, validating length
    /// against the declared dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<Byte>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(VisionError::InvalidFrame(format!(
                "mask dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(VisionError::InvalidFrame(format!(
                "buffer holds {} bytes but a {width}x{height} mask needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// An all-background mask of the given dimensions.
    pub(crate) fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![BACKGROUND; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[Byte] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [Byte] {
        &mut self.data
    }

    pub fn at(&self, x: u32, y: u32) -> Byte {
        self.data[(y * self.width + x) as usize]
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, value: Byte) {
        self.data[(y * self.width + x) as usize] = value;
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.at(x, y) == FOREGROUND
    }
}
