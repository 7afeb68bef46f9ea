// THEORY:
// The `FrameSmoother` is the first stage of the counting pipeline. Camera
// sensors produce single-pixel noise that would otherwise register as motion
// in the background model, so every frame is passed through a low-pass filter
// before any statistics are updated.
//
// Key architectural principles:
// 1.  **Stateless transform**: Smoothing one frame needs no knowledge of any
//     other frame. The stage holds no state and can be reused indefinitely.
// 2.  **Separable kernel**: The 3x3 binomial kernel factors into a horizontal
//     and a vertical 1-2-1 pass, turning nine taps per pixel into six.
//     Borders are handled by replicating the edge pixel.
// 3.  **Alpha passthrough**: Only the color channels carry scene information;
//     the alpha channel is copied through untouched.

use crate::core_modules::frame::{Byte, Frame};
use crate::error::Result;

/// 1D binomial kernel applied once per axis.
const KERNEL: [u16; 3] = [1, 2, 1];
const KERNEL_WEIGHT: u16 = 4;
const CHANNELS: usize = 4;

/// Stateless low-pass filter applied to every frame before analysis.
#[derive(Debug, Default)]
pub struct FrameSmoother;

impl FrameSmoother {
    pub fn new() -> Self {
        Self
    }

    /// Applies the separable kernel and returns a new frame of identical
    /// dimensions and channel layout. The input frame is left untouched.
    pub fn process(&self, frame: &Frame) -> Result<Frame> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let horizontal = Self::pass(frame.data(), width, height, true);
        let smoothed = Self::pass(&horizontal, width, height, false);

        Frame::from_rgba(frame.width(), frame.height(), smoothed)
    }

    /// One 1-2-1 convolution pass along a single axis with replicated borders.
    fn pass(src: &[Byte], width: usize, height: usize, horizontal: bool) -> Vec<Byte> {
        let mut out = vec![0u8; src.len()];
        for y in 0..height {
            for x in 0..width {
                let pixel = y * width + x;
                let (before, after) = if horizontal {
                    (
                        y * width + x.saturating_sub(1),
                        y * width + (x + 1).min(width - 1),
                    )
                } else {
                    (
                        y.saturating_sub(1) * width + x,
                        (y + 1).min(height - 1) * width + x,
                    )
                };
                for channel in 0..3 {
                    let sum = KERNEL[0] * src[before * CHANNELS + channel] as u16
                        + KERNEL[1] * src[pixel * CHANNELS + channel] as u16
                        + KERNEL[2] * src[after * CHANNELS + channel] as u16;
                    out[pixel * CHANNELS + channel] = (sum / KERNEL_WEIGHT) as u8;
                }
                out[pixel * CHANNELS + 3] = src[pixel * CHANNELS + 3];
            }
        }
        out
    }
}
