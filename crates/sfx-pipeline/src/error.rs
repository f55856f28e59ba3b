//! Pipeline error types.
//!
//! Only request-fatal failures are represented here. Synthesis attempt
//! failures are carried as [`crate::AttemptFailure`] values instead.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid Video URL: {0}")]
    Fetch(String),

    #[error("Gemini Error: {0}")]
    Generation(String),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Stage that failed, as reported to callers.
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::Config(_) => "configuration",
            PipelineError::Fetch(_) => "download",
            PipelineError::Generation(_) => "generation",
        }
    }
}
