//! Exact and approximate k=2 nearest-neighbour matching of binary descriptors and Lowe's ratio test.

mod index;
mod matcher;
mod ratio;

pub use index::{
    BruteForceIndex, DescriptorIndex, LshIndex, TrainIndex, VpTreeIndex, MIN_LSH_CANDIDATES,
};
pub use matcher::{MatchError, MatchResult, Matcher};
pub use ratio::{accepted_matches, count_accepted, passes_ratio_test};
