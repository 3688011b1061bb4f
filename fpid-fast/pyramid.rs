use fpid_core::{CoreResult, Image};

use crate::types::ScaleLevel;

/// One downscaled copy of the input image
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    pub scale_level: ScaleLevel,
    pub image: Image,
}

/// Image pyramid for multi-scale feature detection
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<PyramidLevel>,
}

impl ImagePyramid {
    /// Generate scale levels, stopping at `n_levels` or once a level would be
    /// smaller than `min_size` on either side
    pub fn generate_scale_levels(
        width: usize,
        height: usize,
        n_levels: usize,
        scale_factor: f32,
        min_size: usize,
    ) -> Vec<ScaleLevel> {
        let mut levels = Vec::new();
        let mut current_scale = 1.0f32;

        for level in 0..n_levels {
            let scaled_width = ((width as f32) / current_scale) as usize;
            let scaled_height = ((height as f32) / current_scale) as usize;

            if scaled_width < min_size || scaled_height < min_size {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
            });

            current_scale *= scale_factor;
        }

        levels
    }

    /// Build image pyramid from base image
    pub fn build(
        img: &Image,
        n_levels: usize,
        scale_factor: f32,
        min_size: usize,
    ) -> CoreResult<Self> {
        let scale_levels = Self::generate_scale_levels(
            img.width(),
            img.height(),
            n_levels,
            scale_factor,
            min_size,
        );

        let mut levels = Vec::with_capacity(scale_levels.len());
        for scale_level in scale_levels {
            let image = if scale_level.level == 0 {
                img.clone()
            } else {
                Self::downsample_image(img, scale_level.width, scale_level.height)?
            };
            levels.push(PyramidLevel { scale_level, image });
        }

        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Downsample image using bilinear interpolation
    fn downsample_image(
        img: &Image,
        target_width: usize,
        target_height: usize,
    ) -> CoreResult<Image> {
        let x_ratio = img.width() as f32 / target_width as f32;
        let y_ratio = img.height() as f32 / target_height as f32;

        Image::from_fn(target_width, target_height, |x, y| {
            img.bilinear_sample(x as f32 * x_ratio, y as f32 * y_ratio)
                .round()
                .clamp(0.0, 255.0) as u8
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_levels_shrink() {
        let levels = ImagePyramid::generate_scale_levels(200, 150, 4, 1.2, 32);
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[0].width, 200);
        for pair in levels.windows(2) {
            assert!(pair[1].width < pair[0].width);
            assert!(pair[1].scale > pair[0].scale);
        }
    }

    #[test]
    fn test_scale_levels_stop_at_min_size() {
        let levels = ImagePyramid::generate_scale_levels(40, 40, 8, 1.2, 33);
        // 40 / 1.2 = 33.3 keeps one extra level, 40 / 1.44 does not
        assert_eq!(levels.len(), 2);
        assert!(ImagePyramid::generate_scale_levels(20, 40, 8, 1.2, 33).is_empty());
    }

    #[test]
    fn test_build_keeps_base_image() {
        let img = Image::from_fn(64, 48, |x, y| ((x * 3 + y) % 256) as u8).unwrap();
        let pyramid = ImagePyramid::build(&img, 3, 1.5, 16).unwrap();
        assert_eq!(pyramid.len(), 3);
        assert_eq!(pyramid.levels()[0].image, img);
        let top = &pyramid.levels()[2];
        assert_eq!(top.image.dimensions(), (top.scale_level.width, top.scale_level.height));
        assert!(pyramid.levels().get(3).is_none());
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let img = Image::new(vec![77; 60 * 60], 60, 60).unwrap();
        let pyramid = ImagePyramid::build(&img, 3, 1.2, 16).unwrap();
        for level in pyramid.levels() {
            assert!(level.image.data().iter().all(|&v| v == 77));
        }
    }
}
