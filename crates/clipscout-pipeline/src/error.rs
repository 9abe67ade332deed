//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] clipscout_fetch::FetchError),

    #[error("media operation failed: {0}")]
    Media(#[from] clipscout_media::MediaError),

    #[error("transcription failed: {0}")]
    Transcribe(#[from] clipscout_transcribe::TranscribeError),

    #[error("storage failed: {0}")]
    Storage(#[from] clipscout_storage::StorageError),

    #[error("store failed: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("analysis {0} not found")]
    AnalysisNotFound(String),

    #[error("clip {clip_id} not found on analysis {analysis_id}")]
    ClipNotFound {
        analysis_id: String,
        clip_id: String,
    },

    #[error("invalid render options: {0}")]
    InvalidOptions(String),

    #[error("{stage} timed out after {secs} seconds")]
    StageTimeout { stage: &'static str, secs: u64 },

    #[error("run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn stage_timeout(stage: &'static str, secs: u64) -> Self {
        Self::StageTimeout { stage, secs }
    }

    /// True when the failure was a pre-I/O security rejection.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Fetch(e) if e.is_validation())
    }

    /// Stable reason string persisted on failed analysis records.
    pub fn reason(&self) -> String {
        match self {
            Self::Fetch(clipscout_fetch::FetchError::Validation(v)) => {
                format!("validation_error: {}", v.code())
            }
            Self::Fetch(e) => format!("fetch_failed: {}", e),
            Self::Media(e) => format!("media_failed: {}", e),
            Self::Transcribe(e) => format!("transcribe_failed: {}", e),
            Self::Storage(e) => format!("storage_failed: {}", e),
            Self::Store(e) => format!("store_failed: {}", e),
            Self::StageTimeout { stage, secs } => format!("{}_timeout_after_{}s", stage, secs),
            Self::Cancelled => "cancelled".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipscout_fetch::ValidationError;

    #[test]
    fn test_validation_reason_is_stable() {
        let err = PipelineError::Fetch(clipscout_fetch::FetchError::Validation(
            ValidationError::SchemeNotAllowed("ftp".to_string()),
        ));
        assert!(err.is_validation());
        assert_eq!(err.reason(), "validation_error: scheme_not_allowed");
    }

    #[test]
    fn test_timeout_reason() {
        let err = PipelineError::stage_timeout("probe", 60);
        assert_eq!(err.reason(), "probe_timeout_after_60s");
    }
}
