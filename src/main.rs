// Example runner for the `beevision` library. It synthesizes a short
// counting session (a blank warm-up followed by a bright blob drifting
// across the scene), prints the per-frame counts, and saves the final
// annotated frame for inspection. In a real application the frames would
// come from a camera or a decoded video stream.

use beevision::core_modules::utils::image_helper;
use beevision::error::Result;
use beevision::pipeline::{BeeCountingPipeline, BlobSize, Frame, PipelineConfig};
use tracing::info;

const WIDTH: u32 = 96;
const HEIGHT: u32 = 96;
const WARMUP_FRAMES: usize = 12;
const MOTION_FRAMES: i64 = 10;

fn blank_frame() -> Result<Frame> {
    let mut data = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    for pixel in data.chunks_mut(4) {
        pixel[3] = 255;
    }
    Frame::from_rgba(WIDTH, HEIGHT, data)
}

fn frame_with_blob(cx: i64, cy: i64, radius: i64) -> Result<Frame> {
    let mut data = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    for y in 0..HEIGHT as i64 {
        for x in 0..WIDTH as i64 {
            let base = ((y * WIDTH as i64 + x) * 4) as usize;
            data[base + 3] = 255;
            let dx = x - cx;
            let dy = y - cy;
            if dx * dx + dy * dy <= radius * radius {
                data[base] = 230;
                data[base + 1] = 230;
                data[base + 2] = 230;
            }
        }
    }
    Frame::from_rgba(WIDTH, HEIGHT, data)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut pipeline = BeeCountingPipeline::new(PipelineConfig::default());
    pipeline.update_blob_size(BlobSize::Normal);

    let blank = blank_frame()?;
    for _ in 0..WARMUP_FRAMES {
        pipeline.count_bees(&blank)?;
    }
    info!(frames = WARMUP_FRAMES, "background model warmed up");

    for step in 0..MOTION_FRAMES {
        let cx = 20 + step * 6;
        let frame = frame_with_blob(cx, HEIGHT as i64 / 2, 7)?;
        let count = pipeline.count_bees(&frame)?;
        info!(step, count, "processed frame");
    }

    if let Some(annotated) = pipeline.processed_frame() {
        let path = std::env::temp_dir().join("beevision_processed_frame.png");
        image_helper::save(&path, annotated)?;
        info!(path = %path.display(), "saved annotated frame");
    }

    Ok(())
}
