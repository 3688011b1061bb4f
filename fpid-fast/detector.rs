use fpid_core::{ExtractorConfig, Image, Keypoint};

use crate::corner_detection::CornerDetector;
use crate::error::FastResult;
use crate::pyramid::ImagePyramid;
use crate::refinement::{sort_by_response, KeypointRefinement};

/// Multi-scale FAST detector.
///
/// Not bound to an image size, so one instance serves every image of an
/// identification run.
#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: ExtractorConfig,
}

impl FastDetector {
    /// Creates a new detector after validating the configuration
    pub fn new(cfg: ExtractorConfig) -> FastResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Distance from the image edge inside which no keypoint is reported, so
    /// the whole rotated descriptor patch stays in bounds
    pub fn border(&self) -> usize {
        (self.cfg.patch_radius() + 1).max(3)
    }

    /// Smallest level side that still holds one full patch
    pub fn min_level_size(&self) -> usize {
        2 * self.border() + 1
    }

    pub fn build_pyramid(&self, img: &Image) -> FastResult<ImagePyramid> {
        Ok(ImagePyramid::build(
            img,
            self.cfg.n_levels,
            self.cfg.scale_factor,
            self.min_level_size(),
        )?)
    }

    /// Detect keypoints on every pyramid level.
    ///
    /// Keypoints are returned in level-0 coordinates, strongest first, capped
    /// at `max_features`.
    pub fn detect_keypoints(&self, pyramid: &ImagePyramid) -> Vec<Keypoint> {
        let mut all: Vec<Keypoint> = pyramid
            .levels()
            .iter()
            .flat_map(|level| {
                let scale = level.scale_level.scale;
                let octave = level.scale_level.level;
                self.detect_keypoints_at_level(&level.image)
                    .into_iter()
                    .map(move |mut kp| {
                        kp.x *= scale;
                        kp.y *= scale;
                        kp.octave = octave;
                        kp.size *= scale;
                        kp
                    })
            })
            .collect();

        sort_by_response(&mut all);
        all.truncate(self.cfg.max_features);

        tracing::trace!(
            levels = pyramid.len(),
            keypoints = all.len(),
            "fast detection done"
        );
        all
    }

    /// Detect, suppress and orient keypoints on a single image, in that
    /// image's own coordinates
    pub fn detect_keypoints_at_level(&self, img: &Image) -> Vec<Keypoint> {
        let raw = CornerDetector::detect(
            img,
            self.cfg.threshold,
            self.cfg.arc_length as usize,
            self.border(),
        );
        let mut kept = KeypointRefinement::non_maximum_suppression(&raw, self.cfg.nms_distance);
        for kp in kept.iter_mut() {
            kp.angle = KeypointRefinement::compute_orientation(
                img,
                kp.x,
                kp.y,
                self.cfg.patch_radius(),
            );
            kp.size = self.cfg.patch_size as f32;
        }
        kept
    }

    /// Build the pyramid and detect in one step
    pub fn detect(&self, img: &Image) -> FastResult<(ImagePyramid, Vec<Keypoint>)> {
        let pyramid = self.build_pyramid(img)?;
        let keypoints = self.detect_keypoints(&pyramid);
        Ok((pyramid, keypoints))
    }

    /// Get detector configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.cfg
    }
}
