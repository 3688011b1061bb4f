use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Keypoint detection and description settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExtractorConfig {
    /// FAST intensity threshold (1-127)
    pub threshold: u8,
    /// Contiguous arc length of the FAST segment test (9-12)
    pub arc_length: u8,
    /// Side of the square patch used for orientation and description (odd)
    pub patch_size: usize,
    /// Maximum number of pyramid levels
    pub n_levels: usize,
    /// Downscale factor between consecutive pyramid levels
    pub scale_factor: f32,
    /// Minimum distance between surviving keypoints on one level
    pub nms_distance: f32,
    /// Strongest keypoints retained per image
    pub max_features: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            arc_length: 9,
            patch_size: 31,
            n_levels: 3,
            scale_factor: 1.2,
            nms_distance: 3.0,
            max_features: 500,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.threshold == 0 || self.threshold > 127 {
            return Err(CoreError::InvalidThreshold(self.threshold));
        }
        if !(9..=12).contains(&self.arc_length) {
            return Err(CoreError::InvalidArcLength(self.arc_length));
        }
        if self.patch_size % 2 == 0 || self.patch_size < 7 {
            return Err(CoreError::InvalidPatchSize(self.patch_size));
        }
        if self.n_levels == 0 {
            return Err(CoreError::parameter("n_levels", "must be at least 1"));
        }
        if !(self.scale_factor > 1.0) {
            return Err(CoreError::parameter(
                "scale_factor",
                format!("{} (must be > 1.0)", self.scale_factor),
            ));
        }
        if !(self.nms_distance >= 0.0) {
            return Err(CoreError::parameter(
                "nms_distance",
                format!("{} (must be >= 0)", self.nms_distance),
            ));
        }
        if self.max_features == 0 {
            return Err(CoreError::parameter("max_features", "must be at least 1"));
        }
        Ok(())
    }

    /// Radius of the descriptor patch
    pub fn patch_radius(&self) -> usize {
        self.patch_size / 2
    }
}

/// Nearest-neighbour search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatcherKind {
    /// Vantage-point tree; exact neighbours with metric pruning
    #[default]
    VpTree,
    /// Multi-table locality-sensitive hashing index; approximate second neighbour
    Lsh,
    /// Exhaustive scan over every candidate descriptor
    BruteForce,
}

/// Matcher settings. The hashing fields only apply to `MatcherKind::Lsh`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatcherConfig {
    pub kind: MatcherKind,
    /// Number of hash tables
    pub table_count: usize,
    /// Descriptor bits per hash key (1-24)
    pub key_size: usize,
    /// Neighbouring buckets probed: every key within this Hamming radius (0-2)
    pub multi_probe_level: usize,
    /// Seed for selecting the hashed bit positions
    pub seed: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            kind: MatcherKind::VpTree,
            table_count: 6,
            key_size: 12,
            multi_probe_level: 1,
            seed: 0x5eed_f1a9,
        }
    }
}

impl MatcherConfig {
    pub fn brute_force() -> Self {
        Self {
            kind: MatcherKind::BruteForce,
            ..Self::default()
        }
    }

    pub fn lsh() -> Self {
        Self {
            kind: MatcherKind::Lsh,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.kind != MatcherKind::Lsh {
            return Ok(());
        }
        if self.table_count == 0 {
            return Err(CoreError::parameter("table_count", "must be at least 1"));
        }
        if self.key_size == 0 || self.key_size > 24 {
            return Err(CoreError::parameter(
                "key_size",
                format!("{} (must be 1-24)", self.key_size),
            ));
        }
        if self.multi_probe_level > 2 {
            return Err(CoreError::parameter(
                "multi_probe_level",
                format!("{} (must be 0-2)", self.multi_probe_level),
            ));
        }
        Ok(())
    }
}

fn validate_ratio(ratio: f32) -> CoreResult<()> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidRatio(ratio))
    }
}

/// Largest enlargement accepted for the match diagram
pub const MAX_PREVIEW_SCALE: u32 = 16;

/// Parameters of a 1:N identification run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IdentifyConfig {
    /// Lowe ratio; lower is stricter
    pub ratio: f32,
    /// Minimum accepted-match count for a positive identification
    pub not_found_threshold: usize,
    /// Number of candidates reported in the ranking summary
    pub top_k: usize,
    pub save_visualization: bool,
    pub visualization_path: PathBuf,
    /// Integer enlargement applied to the rendered match diagram
    pub preview_scale: u32,
    pub extractor: ExtractorConfig,
    pub matcher: MatcherConfig,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            ratio: 0.80,
            not_found_threshold: 15,
            top_k: 3,
            save_visualization: true,
            visualization_path: PathBuf::from("output/best_match.png"),
            preview_scale: 1,
            extractor: ExtractorConfig::default(),
            matcher: MatcherConfig::default(),
        }
    }
}

impl IdentifyConfig {
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_threshold(mut self, not_found_threshold: usize) -> Self {
        self.not_found_threshold = not_found_threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Enable the match diagram and write it to `path`
    pub fn with_visualization(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_visualization = true;
        self.visualization_path = path.into();
        self
    }

    pub fn without_visualization(mut self) -> Self {
        self.save_visualization = false;
        self
    }

    pub fn with_preview_scale(mut self, scale: u32) -> Self {
        self.preview_scale = scale;
        self
    }

    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_ratio(self.ratio)?;
        if self.top_k == 0 {
            return Err(CoreError::parameter("top_k", "must be at least 1"));
        }
        if self.preview_scale == 0 || self.preview_scale > MAX_PREVIEW_SCALE {
            return Err(CoreError::parameter(
                "preview_scale",
                format!("{} (must be 1-{MAX_PREVIEW_SCALE})", self.preview_scale),
            ));
        }
        self.extractor.validate()?;
        self.matcher.validate()
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "IdentifyConfig: ratio={:.2}, threshold={}, top_k={}, vis={}, matcher={:?}, fast=[t:{}, n:{}], levels={}",
            self.ratio,
            self.not_found_threshold,
            self.top_k,
            if self.save_visualization {
                self.visualization_path.display().to_string()
            } else {
                "off".to_string()
            },
            self.matcher.kind,
            self.extractor.threshold,
            self.extractor.arc_length,
            self.extractor.n_levels,
        )
    }
}

/// Parameters of a 1:1 verification
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VerifyConfig {
    pub ratio: f32,
    /// Minimum accepted-match count for the pair to pass
    pub pass_threshold: usize,
    pub extractor: ExtractorConfig,
    pub matcher: MatcherConfig,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            ratio: 0.65,
            pass_threshold: 32,
            extractor: ExtractorConfig::default(),
            matcher: MatcherConfig::default(),
        }
    }
}

impl VerifyConfig {
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_pass_threshold(mut self, pass_threshold: usize) -> Self {
        self.pass_threshold = pass_threshold;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_ratio(self.ratio)?;
        self.extractor.validate()?;
        self.matcher.validate()
    }
}

/// JSON/TOML persistence for validated configuration types
#[cfg(feature = "serde")]
pub trait PersistentConfig: Serialize + DeserializeOwned {
    fn check(&self) -> CoreResult<()>;

    fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn to_toml(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    fn from_toml(toml_str: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> CoreResult<()> {
        std::fs::write(path, self.to_json()?).map_err(|e| CoreError::ConfigIo(e.to_string()))
    }

    fn load_json<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::ConfigIo(e.to_string()))?;
        Self::from_json(&content)
    }

    fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> CoreResult<()> {
        std::fs::write(path, self.to_toml()?).map_err(|e| CoreError::ConfigIo(e.to_string()))
    }

    fn load_toml<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::ConfigIo(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Load from a `.toml` file, anything else is read as JSON
    fn load<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::load_toml(path),
            _ => Self::load_json(path),
        }
    }
}

#[cfg(feature = "serde")]
impl PersistentConfig for IdentifyConfig {
    fn check(&self) -> CoreResult<()> {
        self.validate()
    }
}

#[cfg(feature = "serde")]
impl PersistentConfig for VerifyConfig {
    fn check(&self) -> CoreResult<()> {
        self.validate()
    }
}
