use thiserror::Error;

/// Errors raised while building images or validating configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },
    #[error("image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
    #[error("invalid FAST threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("invalid FAST arc length: {0} (must be 9-12)")]
    InvalidArcLength(u8),
    #[error("invalid patch size: {0} (must be odd and at least 7)")]
    InvalidPatchSize(usize),
    #[error("invalid ratio: {0} (must be in (0, 1])")]
    InvalidRatio(f32),
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("config I/O error: {0}")]
    ConfigIo(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
