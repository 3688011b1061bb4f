//! FAST keypoint detection for fingerprint images.
//!
//! Corners are found with the FAST-N segment test on every level of a
//! downscaled image pyramid, thinned by non-maximum suppression, oriented with
//! the intensity centroid, and reported in level-0 coordinates.

mod corner_detection;
mod detector;
mod error;
mod pyramid;
mod refinement;
mod types;
mod utils;

pub use corner_detection::CornerDetector;
pub use detector::FastDetector;
pub use error::{FastError, FastResult};
pub use pyramid::{ImagePyramid, PyramidLevel};
pub use refinement::KeypointRefinement;
pub use types::ScaleLevel;
pub use utils::has_consecutive_pixels;
