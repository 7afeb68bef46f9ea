//! PNG dump of a frame, for inspecting the pipeline's annotated output.

use crate::core_modules::frame::Frame;
use crate::error::Result;
use image::ImageEncoder;
use std::path::Path;

/// Encodes the frame as an RGBA8 PNG at the given path.
pub fn save(path: &Path, frame: &Frame) -> Result<()> {
    let output = std::fs::File::create(path).map_err(image::ImageError::from)?;
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(
        frame.data(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgba8,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_solid_frame() {
        let width = 32u32;
        let height = 16u32;
        let buffer = vec![255u8; (width * height * 4) as usize];
        let frame = Frame::from_rgba(width, height, buffer).expect("valid frame");
        let path = std::env::temp_dir().join("beevision_solid_frame.png");

        save(&path, &frame).expect("error saving file");
        assert!(path.exists());
    }
}
