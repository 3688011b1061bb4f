//! Oriented BRIEF descriptors.
//!
//! Each descriptor is 256 binary intensity comparisons between pairs of 5x5
//! boxes inside a circular patch, rotated by the keypoint orientation. Box sums
//! come from an integral image so every comparison costs eight lookups.

use fpid_core::{CoreError, Descriptor, Image, DESCRIPTOR_BYTES};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use thiserror::Error;

const DESCRIPTOR_BITS: usize = DESCRIPTOR_BYTES * 8;

/// Half side of the square sampling box (5x5)
const BOX_HALF: i32 = 2;

/// Seed of the sampling pattern shared by every generator built with `new`
pub const DEFAULT_PATTERN_SEED: u64 = 0x0b51_ef00;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BriefError {
    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type BriefResult<T> = Result<T, BriefError>;

/// Summed-area table with one extra zero row and column
#[derive(Debug, Clone)]
pub struct IntegralImage {
    sums: Vec<u64>,
    width: usize,
    height: usize,
}

impl IntegralImage {
    pub fn new(img: &Image) -> Self {
        let (w, h) = img.dimensions();
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0u64;
            for x in 0..w {
                row_sum += img.pixel(x, y) as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self {
            sums,
            width: w,
            height: h,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sum over the inclusive rectangle `[x0, x1] x [y0, y1]`
    pub fn rect_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let stride = self.width + 1;
        let a = self.sums[y0 * stride + x0];
        let b = self.sums[y0 * stride + x1 + 1];
        let c = self.sums[(y1 + 1) * stride + x0];
        let d = self.sums[(y1 + 1) * stride + x1 + 1];
        d + a - b - c
    }

    /// Sum of the square box of half side `half` centred on `(cx, cy)`, or
    /// `None` when the box leaves the image
    pub fn box_sum(&self, cx: i32, cy: i32, half: i32) -> Option<u64> {
        let (x0, y0, x1, y1) = (cx - half, cy - half, cx + half, cy + half);
        if x0 < 0 || y0 < 0 || x1 >= self.width as i32 || y1 >= self.height as i32 {
            return None;
        }
        Some(self.rect_sum(x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

/// One comparison: offsets of the two box centres relative to the keypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestPair {
    pub p1: (i32, i32),
    pub p2: (i32, i32),
}

#[derive(Debug, Clone)]
pub struct BriefGenerator {
    pairs: Vec<TestPair>,
    patch_radius: usize,
}

impl BriefGenerator {
    /// Generator with the default sampling pattern
    pub fn new(patch_size: usize) -> BriefResult<Self> {
        Self::with_seed(patch_size, DEFAULT_PATTERN_SEED)
    }

    /// Draws 256 test pairs from an isotropic Gaussian (sigma = patch / 5),
    /// rejecting centres whose box could leave the patch under any rotation
    pub fn with_seed(patch_size: usize, seed: u64) -> BriefResult<Self> {
        if patch_size % 2 == 0 || patch_size < 7 {
            return Err(CoreError::InvalidPatchSize(patch_size).into());
        }
        let patch_radius = patch_size / 2;
        let sample_radius = patch_radius as i32 - BOX_HALF;
        let sigma = patch_size as f32 / 5.0;
        let normal = Normal::new(0.0f32, sigma).map_err(|e| CoreError::InvalidParameter {
            name: "patch_size",
            reason: e.to_string(),
        })?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut pairs = Vec::with_capacity(DESCRIPTOR_BITS);
        while pairs.len() < DESCRIPTOR_BITS {
            let p1 = sample_point(&mut rng, &normal, sample_radius);
            let p2 = sample_point(&mut rng, &normal, sample_radius);
            if p1 != p2 {
                pairs.push(TestPair { p1, p2 });
            }
        }

        Ok(Self {
            pairs,
            patch_radius,
        })
    }

    pub fn pairs(&self) -> &[TestPair] {
        &self.pairs
    }

    pub fn patch_radius(&self) -> usize {
        self.patch_radius
    }

    /// Describe the neighbourhood of `(x, y)` rotated by `angle`.
    ///
    /// Returns `None` when a sampling box would fall outside the image.
    pub fn describe(&self, integral: &IntegralImage, x: f32, y: f32, angle: f32) -> Option<Descriptor> {
        let (s, c) = angle.sin_cos();
        let rotate = |(dx, dy): (i32, i32)| {
            (
                (x + c * dx as f32 - s * dy as f32).round() as i32,
                (y + s * dx as f32 + c * dy as f32).round() as i32,
            )
        };

        let mut d = [0u8; DESCRIPTOR_BYTES];
        for (i, pair) in self.pairs.iter().enumerate() {
            let (x1, y1) = rotate(pair.p1);
            let (x2, y2) = rotate(pair.p2);
            let val1 = integral.box_sum(x1, y1, BOX_HALF)?;
            let val2 = integral.box_sum(x2, y2, BOX_HALF)?;

            let bit = (val1 < val2) as u8;
            d[i >> 3] |= bit << (7 - (i & 7));
        }
        Some(d)
    }
}

fn sample_point(rng: &mut StdRng, normal: &Normal<f32>, radius: i32) -> (i32, i32) {
    loop {
        let x = normal.sample(rng).round() as i32;
        let y = normal.sample(rng).round() as i32;
        if x * x + y * y <= radius * radius {
            return (x, y);
        }
    }
}
