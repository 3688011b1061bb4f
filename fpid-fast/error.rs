use fpid_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FastError {
    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type FastResult<T> = Result<T, FastError>;
