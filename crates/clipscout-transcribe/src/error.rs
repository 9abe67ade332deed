//! Transcription error types.

use thiserror::Error;

/// Result type for transcription operations.
pub type TranscribeResult<T> = Result<T, TranscribeError>;

/// Errors from a speech-to-text backend.
///
/// All of these are non-fatal to an analysis run; callers degrade to an
/// empty transcript.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("transcription backend unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend returned an error: {0}")]
    RequestFailed(String),

    #[error("backend response could not be parsed: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscribeError {
    /// True when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::RequestFailed(_) => true,
            _ => false,
        }
    }
}
