use burrow_core::{CoreError, StorageError};
use burrow_generator::GeneratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("alias already exists: {0}")]
    AliasConflict(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid alias: {0}")]
    InvalidAlias(String),
    #[error("storage error: {0}")]
    Storage(StorageError),
    #[error("code generation failed: {0}")]
    Generator(#[from] GeneratorError),
}

impl ShortenerError {
    /// `true` for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AliasConflict(_) | Self::InvalidUrl(_) | Self::InvalidAlias(_)
        )
    }
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        Self::InvalidAlias(value.to_string())
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::AliasConflict(code),
            other => Self::Storage(other),
        }
    }
}
