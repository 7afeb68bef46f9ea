// THEORY:
// The `BlobExtractor` is the final stage of the counting pipeline. It turns
// the cleaned foreground mask into a number: how many coherent moving regions
// of bee-like size are present in this frame.
//
// Key architectural principles:
// 1.  **Connected-component search**: Foreground pixels are grouped with a
//     breadth-first flood fill over their 8-neighborhoods. Diagonal
//     connectivity matters because a bee crossing the frame at speed often
//     leaves a thin diagonal trace after morphology.
// 2.  **Area gate**: Each region's area is its pixel count. Only regions
//     inside the configured [min_area, max_area] window are counted; smaller
//     regions are residual noise, larger ones are clusters or lighting
//     events. The window is deliberately unvalidated: an inverted window
//     matches nothing, and that is a legal configuration.
// 3.  **Observability without influence**: Alongside the count, the stage
//     renders the mask as a grayscale frame and traces the boundary of every
//     counted region in green. The rendering is for inspection only; nothing
//     downstream reads it back.
// 4.  **Per-frame transience**: Blobs exist only inside one `process` call.
//     The only state carried across frames is the latest count, which starts
//     at zero before any frame has been processed.

use crate::core_modules::frame::{Byte, Frame, Mask};
use crate::error::Result;

/// Default area window, sized for a single bee at typical mounting distance.
const DEFAULT_MIN_AREA: f64 = 15.0;
const DEFAULT_MAX_AREA: f64 = 800.0;

/// Boundary color for counted regions in the annotated frame.
const BOUNDARY_COLOR: [Byte; 4] = [0, 255, 0, 255];

/// A coordinate in mask space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// A connected foreground region found in a single mask.
#[derive(Debug, Clone)]
pub struct Blob {
    /// Pixel count of the region.
    pub area: f64,
    /// Boundary points of the region, used only for rendering.
    pub boundary: Vec<Point>,
}

/// Counts bee-sized connected regions and renders them for inspection.
#[derive(Debug)]
pub struct BlobExtractor {
    min_area: f64,
    max_area: f64,
    count: usize,
}

impl BlobExtractor {
    pub fn new(min_area: f64, max_area: f64) -> Self {
        Self {
            min_area,
            max_area,
            count: 0,
        }
    }

    /// Finds all connected regions, counts those inside the area window, and
    /// returns the annotated visualization frame.
    pub fn process(&mut self, mask: &Mask) -> Result<Frame> {
        let blobs = find_blobs(mask);
        let counted: Vec<&Blob> = blobs
            .iter()
            .filter(|blob| blob.area >= self.min_area && blob.area <= self.max_area)
            .collect();
        self.count = counted.len();
        self.render(mask, &counted)
    }

    /// The count from the most recent `process` call; zero before the first.
    pub fn count(&self) -> usize {
        self.count
    }

    /// No ordering is enforced against `max_area`; an inverted window simply
    /// matches nothing.
    pub fn set_min_area(&mut self, min_area: f64) {
        self.min_area = min_area;
    }

    pub fn set_max_area(&mut self, max_area: f64) {
        self.max_area = max_area;
    }

    /// Grayscale copy of the mask with counted regions outlined in green.
    fn render(&self, mask: &Mask, counted: &[&Blob]) -> Result<Frame> {
        let mut data = Vec::with_capacity(mask.data().len() * 4);
        for &value in mask.data() {
            data.extend_from_slice(&[value, value, value, 255]);
        }
        for blob in counted {
            for point in &blob.boundary {
                let base = ((point.y * mask.width() + point.x) * 4) as usize;
                data[base..base + 4].copy_from_slice(&BOUNDARY_COLOR);
            }
        }
        Frame::from_rgba(mask.width(), mask.height(), data)
    }
}

impl Default for BlobExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_AREA, DEFAULT_MAX_AREA)
    }
}

/// Finds every 8-connected foreground region in the mask.
fn find_blobs(mask: &Mask) -> Vec<Blob> {
    let width = mask.width();
    let height = mask.height();
    let mut visited = vec![false; mask.data().len()];
    let mut blobs = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let index = (y * width + x) as usize;
            if visited[index] || !mask.is_foreground(x, y) {
                continue;
            }
            blobs.push(grow_blob(mask, &mut visited, Point { x, y }));
        }
    }
    blobs
}

/// Flood-fills one region from a seed pixel, collecting its area and its
/// boundary. A pixel is on the boundary if it touches the image edge or has a
/// background pixel among its 4-neighbors.
fn grow_blob(mask: &Mask, visited: &mut [bool], seed: Point) -> Blob {
    let width = mask.width() as i64;
    let height = mask.height() as i64;
    let mut queue = vec![seed];
    visited[(seed.y * mask.width() + seed.x) as usize] = true;

    let mut area = 0usize;
    let mut boundary = Vec::new();

    while let Some(current) = queue.pop() {
        area += 1;

        let mut on_boundary = false;
        for (dx, dy) in [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)] {
            let nx = current.x as i64 + dx;
            let ny = current.y as i64 + dy;
            if nx < 0 || nx >= width || ny < 0 || ny >= height {
                on_boundary = true;
            } else if !mask.is_foreground(nx as u32, ny as u32) {
                on_boundary = true;
            }
        }
        if on_boundary {
            boundary.push(current);
        }

        // Expand over all 8 neighbors.
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = current.x as i64 + dx;
                let ny = current.y as i64 + dy;
                if nx < 0 || nx >= width || ny < 0 || ny >= height {
                    continue;
                }
                let neighbor_index = (ny * width + nx) as usize;
                if !visited[neighbor_index] && mask.is_foreground(nx as u32, ny as u32) {
                    visited[neighbor_index] = true;
                    queue.push(Point {
                        x: nx as u32,
                        y: ny as u32,
                    });
                }
            }
        }
    }

    Blob {
        area: area as f64,
        boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::FOREGROUND;

    fn mask_with_rect(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> Mask {
        let mut mask = Mask::zeroed(width, height);
        for &(x0, y0, w, h) in rects {
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    mask.set(x, y, FOREGROUND);
                }
            }
        }
        mask
    }

    #[test]
    fn count_is_zero_before_first_process() {
        let extractor = BlobExtractor::default();
        assert_eq!(extractor.count(), 0);
    }

    #[test]
    fn area_window_selects_regions() {
        // Three regions with areas 4, 25 and 100.
        let mask = mask_with_rect(40, 20, &[(1, 1, 2, 2), (10, 5, 5, 5), (20, 5, 10, 10)]);

        let mut extractor = BlobExtractor::new(10.0, 50.0);
        extractor.process(&mask).expect("extraction");
        assert_eq!(extractor.count(), 1);

        extractor.set_min_area(1.0);
        extractor.process(&mask).expect("extraction");
        assert_eq!(extractor.count(), 2);

        extractor.set_max_area(1000.0);
        extractor.process(&mask).expect("extraction");
        assert_eq!(extractor.count(), 3);
    }

    #[test]
    fn tightening_min_area_never_increases_count() {
        let mask = mask_with_rect(40, 20, &[(1, 1, 2, 2), (10, 5, 5, 5), (20, 5, 10, 10)]);
        let mut extractor = BlobExtractor::new(0.0, 10_000.0);
        let mut previous = usize::MAX;
        for min_area in [1.0, 5.0, 30.0, 150.0] {
            extractor.set_min_area(min_area);
            extractor.process(&mask).expect("extraction");
            assert!(extractor.count() <= previous);
            previous = extractor.count();
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn inverted_window_matches_nothing() {
        // One region of area 70, window of [100, 50].
        let mask = mask_with_rect(20, 20, &[(2, 2, 10, 7)]);
        let mut extractor = BlobExtractor::new(100.0, 50.0);
        extractor.process(&mask).expect("extraction");
        assert_eq!(extractor.count(), 0);
    }

    #[test]
    fn diagonal_pixels_form_one_region() {
        let mut mask = Mask::zeroed(10, 10);
        for i in 0..6 {
            mask.set(i, i, FOREGROUND);
        }
        let mut extractor = BlobExtractor::new(1.0, 100.0);
        extractor.process(&mask).expect("extraction");
        assert_eq!(extractor.count(), 1);
    }

    #[test]
    fn annotated_frame_outlines_counted_regions() {
        let mask = mask_with_rect(20, 20, &[(5, 5, 6, 6)]);
        let mut extractor = BlobExtractor::new(10.0, 100.0);
        let annotated = extractor.process(&mask).expect("extraction");

        let pixel = |x: u32, y: u32| {
            let base = ((y * 20 + x) * 4) as usize;
            &annotated.data()[base..base + 4]
        };
        // Region edge is traced in green, interior stays white, outside black.
        assert_eq!(pixel(5, 5), &BOUNDARY_COLOR[..]);
        assert_eq!(pixel(7, 7), &[255u8, 255, 255, 255][..]);
        assert_eq!(pixel(1, 1), &[0u8, 0, 0, 255][..]);
    }

    #[test]
    fn uncounted_regions_are_not_outlined() {
        // Area 4, below the window.
        let mask = mask_with_rect(10, 10, &[(2, 2, 2, 2)]);
        let mut extractor = BlobExtractor::new(10.0, 100.0);
        let annotated = extractor.process(&mask).expect("extraction");
        assert_eq!(extractor.count(), 0);
        let base = ((2 * 10 + 2) * 4) as usize;
        assert_eq!(&annotated.data()[base..base + 4], &[255u8, 255, 255, 255][..]);
    }
}
