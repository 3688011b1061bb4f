use crate::error::{CoreError, CoreResult};

/// Row-major 8-bit grayscale image with its dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Image {
    /// Wraps a row-major buffer, checking that it matches the dimensions
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImageSize { width, height });
        }
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> u8,
    ) -> CoreResult<Self> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`; the caller guarantees the coordinate is in bounds
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Pixel at `(x, y)` with coordinates clamped to the image border
    #[inline]
    pub fn pixel_clamped(&self, x: i32, y: i32) -> u8 {
        let xx = x.clamp(0, self.width as i32 - 1) as usize;
        let yy = y.clamp(0, self.height as i32 - 1) as usize;
        self.data[yy * self.width + xx]
    }

    /// Sample at fractional coordinates using bilinear interpolation
    pub fn bilinear_sample(&self, x: f32, y: f32) -> f32 {
        let x = x.clamp(0.0, (self.width - 1) as f32);
        let y = y.clamp(0.0, (self.height - 1) as f32);
        let x1 = x.floor() as usize;
        let y1 = y.floor() as usize;
        let x2 = (x1 + 1).min(self.width - 1);
        let y2 = (y1 + 1).min(self.height - 1);

        let fx = x - x1 as f32;
        let fy = y - y1 as f32;

        let p11 = self.pixel(x1, y1) as f32;
        let p12 = self.pixel(x2, y1) as f32;
        let p21 = self.pixel(x1, y2) as f32;
        let p22 = self.pixel(x2, y2) as f32;

        let top = p11 * (1.0 - fx) + p12 * fx;
        let bottom = p21 * (1.0 - fx) + p22 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}
