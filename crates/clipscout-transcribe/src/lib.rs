//! Pluggable speech-to-text boundary.
//!
//! Concrete backends are interchangeable and may be entirely absent in
//! a deployment: [`HttpTranscriber`] talks to a whisper-style service,
//! [`NoopTranscriber`] stands in when none is configured. Failure is
//! never fatal to an analysis — callers degrade to an empty transcript
//! via [`run_transcription`], which also owns cleanup of the audio file
//! it consumed.

use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use clipscout_models::TranscriptSegment;

pub mod client;
pub mod error;

pub use client::{HttpTranscriber, TranscriberConfig};
pub use error::{TranscribeError, TranscribeResult};

/// A speech-to-text backend.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a mono PCM WAV file into time-coded segments.
    async fn transcribe(&self, audio: &Path) -> TranscribeResult<Vec<TranscriptSegment>>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Backend used when no transcription service is configured.
pub struct NoopTranscriber;

#[async_trait]
impl Transcriber for NoopTranscriber {
    async fn transcribe(&self, _audio: &Path) -> TranscribeResult<Vec<TranscriptSegment>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Run a backend against an extracted audio file, degrading to an
/// empty transcript on any failure and removing the audio file on
/// every path.
pub async fn run_transcription(
    transcriber: &dyn Transcriber,
    audio: &Path,
) -> Vec<TranscriptSegment> {
    let segments = match transcriber.transcribe(audio).await {
        Ok(segments) => {
            info!(
                backend = transcriber.name(),
                segment_count = segments.len(),
                "transcription complete"
            );
            segments
        }
        Err(e) => {
            warn!(
                backend = transcriber.name(),
                error = %e,
                "transcription unavailable, continuing with empty transcript"
            );
            Vec::new()
        }
    };

    if let Err(e) = tokio::fs::remove_file(audio).await {
        if audio.exists() {
            warn!(path = %audio.display(), error = %e, "failed to remove transcription audio");
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_returns_empty() {
        let segments = NoopTranscriber
            .transcribe(Path::new("/nonexistent.wav"))
            .await
            .unwrap();
        assert!(segments.is_empty());
    }

    #[tokio::test]
    async fn test_run_transcription_removes_audio() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio.wav");
        tokio::fs::write(&audio, b"RIFF").await.unwrap();

        let segments = run_transcription(&NoopTranscriber, &audio).await;
        assert!(segments.is_empty());
        assert!(!audio.exists(), "audio file must be cleaned up");
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        async fn transcribe(&self, _audio: &Path) -> TranscribeResult<Vec<TranscriptSegment>> {
            Err(TranscribeError::Unavailable("backend down".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_run_transcription_degrades_and_cleans_up_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio.wav");
        tokio::fs::write(&audio, b"RIFF").await.unwrap();

        let segments = run_transcription(&FailingTranscriber, &audio).await;
        assert!(segments.is_empty());
        assert!(!audio.exists());
    }
}
