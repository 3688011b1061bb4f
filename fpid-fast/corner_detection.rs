use fpid_core::{Image, Keypoint};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::types::CornerType;
use crate::utils::has_consecutive_pixels;

/// FAST segment-test corner detection
pub struct CornerDetector;

impl CornerDetector {
    /// FAST circle offsets (Bresenham circle of radius 3, clockwise from top)
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (0, -3), (1, -3), (2, -2), (3, -1),
        (3, 0), (3, 1), (2, 2), (1, 3),
        (0, 3), (-1, 3), (-2, 2), (-3, 1),
        (-3, 0), (-3, -1), (-2, -2), (-1, -3),
    ];

    /// Detect corners at least `border` pixels away from every image edge.
    ///
    /// Returned keypoints are in the coordinates of `img`, carry their
    /// response and have no orientation yet. Order is row-major.
    pub fn detect(img: &Image, threshold: u8, arc_length: usize, border: usize) -> Vec<Keypoint> {
        let (w, h) = img.dimensions();
        let border = border.max(3);
        if w <= 2 * border || h <= 2 * border {
            return Vec::new();
        }

        let rows = border..h - border;

        #[cfg(feature = "rayon")]
        let keypoints = rows
            .into_par_iter()
            .flat_map_iter(|y| Self::detect_row(img, y, border, threshold, arc_length))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let keypoints = rows
            .flat_map(|y| Self::detect_row(img, y, border, threshold, arc_length))
            .collect();

        keypoints
    }

    fn detect_row(
        img: &Image,
        y: usize,
        border: usize,
        threshold: u8,
        arc_length: usize,
    ) -> Vec<Keypoint> {
        let mut row = Vec::new();
        for x in border..img.width() - border {
            if let Some(response) = Self::segment_test(img, x, y, threshold, arc_length) {
                let mut kp = Keypoint::new(x as f32, y as f32);
                kp.response = response;
                row.push(kp);
            }
        }
        row
    }

    /// Run the segment test at `(x, y)`; returns the corner response when the
    /// ring holds a contiguous bright or dark arc of `arc_length` pixels.
    ///
    /// The response is the mean absolute difference between the ring pixels of
    /// the winning class and the centre.
    pub fn segment_test(
        img: &Image,
        x: usize,
        y: usize,
        threshold: u8,
        arc_length: usize,
    ) -> Option<f32> {
        let p = img.pixel(x, y);
        let mut bright_mask = 0u16;
        let mut dark_mask = 0u16;
        let mut bright_sum = 0i32;
        let mut dark_sum = 0i32;

        for (i, &(dx, dy)) in Self::FAST_OFFSETS.iter().enumerate() {
            let q = img.pixel_clamped(x as i32 + dx, y as i32 + dy);
            match Self::classify(p, q, threshold) {
                CornerType::Bright => {
                    bright_mask |= 1 << i;
                    bright_sum += q as i32 - p as i32;
                }
                CornerType::Dark => {
                    dark_mask |= 1 << i;
                    dark_sum += p as i32 - q as i32;
                }
                CornerType::None => {}
            }
        }

        if has_consecutive_pixels(bright_mask, arc_length) {
            Some(bright_sum as f32 / bright_mask.count_ones() as f32)
        } else if has_consecutive_pixels(dark_mask, arc_length) {
            Some(dark_sum as f32 / dark_mask.count_ones() as f32)
        } else {
            None
        }
    }

    #[inline]
    fn classify(p: u8, q: u8, threshold: u8) -> CornerType {
        let diff = q as i16 - p as i16;
        let t = threshold as i16;
        if diff >= t {
            CornerType::Bright
        } else if diff <= -t {
            CornerType::Dark
        } else {
            CornerType::None
        }
    }
}
