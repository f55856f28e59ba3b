//! Mirelo client error types.

use thiserror::Error;

pub type MireloResult<T> = Result<T, MireloError>;

#[derive(Debug, Error)]
pub enum MireloError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Mirelo returned {0}: {1}")]
    Status(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response contained no audio URL")]
    MissingOutput,
}

impl MireloError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, MireloError::Network(e) if e.is_timeout())
    }
}
