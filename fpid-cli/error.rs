use std::path::PathBuf;

use fpid_brief::BriefError;
use fpid_core::CoreError;
use fpid_fast::FastError;
use fpid_match::MatchError;
use thiserror::Error;

/// Failures above the per-file level of an identification run.
///
/// These never cross the `identify` boundary as errors: they become the
/// message of a failed result.
#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("input image not found: {}", path.display())]
    SourceMissing { path: PathBuf },
    #[error("cannot read input image {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("database directory not found: {}", path.display())]
    DatabaseMissing { path: PathBuf },
    #[error("cannot list database directory {}: {source}", path.display())]
    DatabaseUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("database is empty or holds no readable images: {}", path.display())]
    EmptyDatabase { path: PathBuf },
    #[error("no features detected in {}", path.display())]
    NoFeaturesFound { path: PathBuf },
    #[error("cannot write visualization {}: {source}", path.display())]
    Visualization {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] CoreError),
    #[error("feature detection failed: {0}")]
    Fast(#[from] FastError),
    #[error("descriptor generation failed: {0}")]
    Brief(#[from] BriefError),
    #[error("matcher setup failed: {0}")]
    Match(#[from] MatchError),
}

pub type EngineResult<T> = Result<T, IdentifyError>;
