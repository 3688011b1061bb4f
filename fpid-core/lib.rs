//! Shared data model for the fingerprint identification workspace.
//!
//! Images are row-major 8-bit grayscale buffers, keypoints carry level-0
//! coordinates plus pyramid metadata, and descriptors are 256-bit binary
//! strings compared with the Hamming distance.

pub mod config;
pub mod error;
pub mod image;
pub mod types;

pub use config::{
    ExtractorConfig, IdentifyConfig, MatcherConfig, MatcherKind, VerifyConfig, MAX_PREVIEW_SCALE,
};
#[cfg(feature = "serde")]
pub use config::PersistentConfig;
pub use error::{CoreError, CoreResult};
pub use image::Image;
pub use types::{hamming_distance, Descriptor, Keypoint, KnnMatch, MatchPair, DESCRIPTOR_BYTES};
