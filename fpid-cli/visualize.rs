//! Side-by-side match diagrams.

use std::fs;
use std::path::{Path, PathBuf};

use fpid_core::{Keypoint, MatchPair};
use image::error::{ImageError, LimitError, LimitErrorKind};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::error::{EngineResult, IdentifyError};

const MARKER_RADIUS: i32 = 3;

const PALETTE: [[u8; 3]; 8] = [
    [0, 255, 0],
    [255, 64, 64],
    [64, 160, 255],
    [255, 200, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 128, 0],
    [160, 96, 255],
];

fn color(i: usize) -> Rgb<u8> {
    Rgb(PALETTE[i % PALETTE.len()])
}

/// Place `query` and `best` side by side and connect each accepted pair.
///
/// Only keypoints that take part in an accepted pair are marked. Pairs whose
/// indices fall outside either keypoint list are ignored.
pub fn render_matches(
    query: &GrayImage,
    query_kps: &[Keypoint],
    best: &GrayImage,
    best_kps: &[Keypoint],
    pairs: &[MatchPair],
) -> RgbImage {
    let (w1, h1) = query.dimensions();
    let (w2, h2) = best.dimensions();
    let mut canvas = RgbImage::new(w1 + w2, h1.max(h2));

    let left = DynamicImage::ImageLuma8(query.clone()).to_rgb8();
    let right = DynamicImage::ImageLuma8(best.clone()).to_rgb8();
    imageops::replace(&mut canvas, &left, 0, 0);
    imageops::replace(&mut canvas, &right, i64::from(w1), 0);

    let offset = w1 as f32;
    for (i, pair) in pairs.iter().enumerate() {
        let (Some(a), Some(b)) = (query_kps.get(pair.query_idx), best_kps.get(pair.train_idx)) else {
            continue;
        };
        let c = color(i);
        let start = (a.x, a.y);
        let end = (b.x + offset, b.y);

        draw_line_segment_mut(&mut canvas, start, end, c);
        draw_hollow_circle_mut(&mut canvas, (start.0 as i32, start.1 as i32), MARKER_RADIUS, c);
        draw_hollow_circle_mut(&mut canvas, (end.0 as i32, end.1 as i32), MARKER_RADIUS, c);
    }

    canvas
}

/// Write `img` to `path`, enlarged `preview_scale` times with
/// nearest-neighbour sampling. Parent directories are created as needed and
/// the format follows the file extension. An enlargement whose dimensions do
/// not fit in `u32` is refused before any pixels are allocated.
pub fn save_visualization(img: &RgbImage, path: &Path, preview_scale: u32) -> EngineResult<PathBuf> {
    let failure = |source: ImageError| IdentifyError::Visualization {
        path: path.to_path_buf(),
        source,
    };

    let scale = preview_scale.max(1);
    let (w, h) = img.dimensions();
    let (Some(scaled_w), Some(scaled_h)) = (w.checked_mul(scale), h.checked_mul(scale)) else {
        return Err(failure(ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::DimensionError,
        ))));
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| failure(ImageError::IoError(e)))?;
    }

    let result = if scale == 1 {
        img.save(path)
    } else {
        imageops::resize(img, scaled_w, scaled_h, FilterType::Nearest).save(path)
    };
    result.map_err(failure)?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint::new(x, y)
    }

    #[test]
    fn test_canvas_layout() {
        let query = GrayImage::from_pixel(40, 30, image::Luma([10]));
        let best = GrayImage::from_pixel(50, 60, image::Luma([200]));
        let canvas = render_matches(&query, &[], &best, &[], &[]);

        assert_eq!(canvas.dimensions(), (90, 60));
        assert_eq!(canvas.get_pixel(5, 5), &Rgb([10, 10, 10]));
        assert_eq!(canvas.get_pixel(45, 5), &Rgb([200, 200, 200]));
        // below the shorter image
        assert_eq!(canvas.get_pixel(5, 45), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_accepted_pairs_are_drawn() {
        let query = GrayImage::new(40, 40);
        let best = GrayImage::new(40, 40);
        let pairs = [MatchPair {
            query_idx: 0,
            train_idx: 1,
            distance: 3,
        }];
        let canvas = render_matches(
            &query,
            &[kp(10.0, 20.0)],
            &best,
            &[kp(0.0, 0.0), kp(10.0, 20.0)],
            &pairs,
        );

        // the line runs horizontally from (10, 20) to (50, 20)
        assert_eq!(canvas.get_pixel(30, 20), &color(0));
        assert_eq!(canvas.get_pixel(30, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_out_of_range_pairs_are_ignored() {
        let query = GrayImage::new(20, 20);
        let best = GrayImage::new(20, 20);
        let pairs = [MatchPair {
            query_idx: 4,
            train_idx: 0,
            distance: 0,
        }];
        let canvas = render_matches(&query, &[kp(5.0, 5.0)], &best, &[kp(5.0, 5.0)], &pairs);
        assert!(canvas.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_save_creates_parents_and_scales() {
        let dir = std::env::temp_dir().join(format!("fpid-vis-unit-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("diagram.png");

        let img = RgbImage::from_pixel(8, 5, Rgb([1, 2, 3]));
        let written = save_visualization(&img, &path, 3).unwrap();
        assert_eq!(written, path);

        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.dimensions(), (24, 15));
        assert_eq!(reloaded.get_pixel(23, 14), &Rgb([1, 2, 3]));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_oversized_preview_is_refused() {
        let dir = std::env::temp_dir().join(format!("fpid-vis-huge-{}", std::process::id()));
        let path = dir.join("diagram.png");

        let err = save_visualization(&RgbImage::new(256, 256), &path, 1 << 24).unwrap_err();
        assert!(matches!(
            err,
            IdentifyError::Visualization {
                source: ImageError::Limits(_),
                ..
            }
        ));
        assert!(!path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_extension_is_reported() {
        let dir = std::env::temp_dir().join(format!("fpid-vis-ext-{}", std::process::id()));
        let path = dir.join("diagram.not-an-image-format");

        let err = save_visualization(&RgbImage::new(4, 4), &path, 1).unwrap_err();
        assert!(matches!(err, IdentifyError::Visualization { .. }));

        let _ = fs::remove_dir_all(&dir);
    }
}
