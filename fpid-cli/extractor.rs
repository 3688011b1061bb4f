use std::path::Path;

use fpid_brief::{BriefGenerator, IntegralImage};
use fpid_core::{Descriptor, ExtractorConfig, Image, Keypoint};
use fpid_fast::FastDetector;

use crate::error::{EngineResult, IdentifyError};

/// Keypoints and their descriptors, index-aligned
#[derive(Debug, Clone, Default)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Features {
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// FAST detection followed by oriented BRIEF description
#[derive(Debug, Clone)]
pub struct Extractor {
    detector: FastDetector,
    brief: BriefGenerator,
}

impl Extractor {
    pub fn new(cfg: &ExtractorConfig) -> EngineResult<Self> {
        let detector = FastDetector::new(cfg.clone())?;
        let brief = BriefGenerator::new(cfg.patch_size)?;
        Ok(Self { detector, brief })
    }

    pub fn config(&self) -> &ExtractorConfig {
        self.detector.config()
    }

    /// Detect and describe; an image without usable keypoints yields an
    /// empty feature set.
    ///
    /// Keypoints whose patch leaves their pyramid level are dropped together
    /// with their descriptor.
    pub fn features(&self, img: &Image) -> EngineResult<Features> {
        let (pyramid, keypoints) = self.detector.detect(img)?;
        let integrals: Vec<IntegralImage> = pyramid
            .levels()
            .iter()
            .map(|level| IntegralImage::new(&level.image))
            .collect();

        let mut features = Features {
            keypoints: Vec::with_capacity(keypoints.len()),
            descriptors: Vec::with_capacity(keypoints.len()),
        };
        for kp in keypoints {
            let Some(integral) = integrals.get(kp.octave) else {
                continue;
            };
            let scale = pyramid.levels()[kp.octave].scale_level.scale;
            if let Some(d) = self.brief.describe(integral, kp.x / scale, kp.y / scale, kp.angle) {
                features.keypoints.push(kp);
                features.descriptors.push(d);
            }
        }

        tracing::trace!(
            width = img.width(),
            height = img.height(),
            levels = pyramid.len(),
            features = features.len(),
            "extracted features"
        );
        Ok(features)
    }

    /// Like [`Extractor::features`], but an empty result is an error
    /// attributed to `path`
    pub fn extract(&self, img: &Image, path: &Path) -> EngineResult<Features> {
        let features = self.features(img)?;
        if features.is_empty() {
            return Err(IdentifyError::NoFeaturesFound {
                path: path.to_path_buf(),
            });
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(size: usize, seed: u32) -> Image {
        Image::from_fn(size, size, |x, y| {
            let h = ((x / 6) as u32)
                .wrapping_mul(73_856_093)
                ^ ((y / 6) as u32).wrapping_mul(19_349_663)
                ^ seed.wrapping_mul(83_492_791);
            (h.wrapping_mul(2_654_435_761) >> 24) as u8
        })
        .unwrap()
    }

    #[test]
    fn test_features_are_aligned() {
        let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
        let features = extractor.features(&blocks(128, 1)).unwrap();

        assert!(!features.is_empty());
        assert_eq!(features.keypoints.len(), features.descriptors.len());
        assert!(features.len() <= 500);
    }

    #[test]
    fn test_uniform_image_has_no_features() {
        let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
        let img = Image::new(vec![128; 96 * 96], 96, 96).unwrap();

        assert!(extractor.features(&img).unwrap().is_empty());
        let err = extractor.extract(&img, Path::new("flat.png")).unwrap_err();
        assert!(matches!(err, IdentifyError::NoFeaturesFound { .. }));
    }

    #[test]
    fn test_tiny_image_is_not_an_error() {
        let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
        let img = Image::new(vec![0; 10 * 10], 10, 10).unwrap();
        assert!(extractor.features(&img).unwrap().is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
        let img = blocks(128, 7);
        let a = extractor.features(&img).unwrap();
        let b = extractor.features(&img).unwrap();

        assert_eq!(a.descriptors, b.descriptors);
        assert_eq!(a.keypoints, b.keypoints);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let cfg = ExtractorConfig {
            patch_size: 8,
            ..ExtractorConfig::default()
        };
        assert!(matches!(
            Extractor::new(&cfg),
            Err(IdentifyError::Fast(_))
        ));
    }
}
