//! HTTP client for a whisper-style transcription service.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use clipscout_models::{TranscriptSegment, WordToken};

use crate::error::{TranscribeError, TranscribeResult};
use crate::Transcriber;

/// Configuration for the HTTP transcriber.
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// Base URL of the transcription service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries on retryable failures
    pub max_retries: u32,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".to_string(),
            timeout: Duration::from_secs(300),
            max_retries: 2,
        }
    }
}

impl TranscriberConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TRANSCRIBER_URL")
                .unwrap_or_else(|_| "http://localhost:9090".to_string()),
            timeout: Duration::from_secs(
                std::env::var("TRANSCRIBER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            max_retries: std::env::var("TRANSCRIBER_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// Wire shape of the service response.
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    segments: Vec<WireSegment>,
}

#[derive(Debug, Deserialize)]
struct WireSegment {
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    words: Vec<WireWord>,
}

#[derive(Debug, Deserialize)]
struct WireWord {
    word: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for a whisper-style HTTP transcription service.
pub struct HttpTranscriber {
    http: Client,
    config: TranscriberConfig,
}

impl HttpTranscriber {
    /// Create a new client.
    pub fn new(config: TranscriberConfig) -> TranscribeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TranscribeError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TranscribeResult<Self> {
        Self::new(TranscriberConfig::from_env())
    }

    /// Check whether the service is reachable and healthy.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => response
                .json::<HealthResponse>()
                .await
                .map(|h| h.status == "ok" || h.status == "healthy")
                .unwrap_or(false),
            Ok(response) => {
                warn!(status = %response.status(), "transcriber health check failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "transcriber health check error");
                false
            }
        }
    }

    async fn post_audio(&self, wav: Vec<u8>) -> TranscribeResult<Vec<TranscriptSegment>> {
        let url = format!("{}/v1/transcribe", self.config.base_url);
        debug!(url = %url, bytes = wav.len(), "sending transcription request");

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            let part = Part::bytes(wav.clone())
                .file_name("audio.wav")
                .mime_str("audio/wav")
                .map_err(TranscribeError::Network)?;
            let form = Form::new().part("audio", part);

            let result = self.send_once(&url, form).await;
            match result {
                Ok(segments) => return Ok(segments),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transcription request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| TranscribeError::RequestFailed("unknown error".to_string())))
    }

    async fn send_once(&self, url: &str, form: Form) -> TranscribeResult<Vec<TranscriptSegment>> {
        let response = self.http.post(url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::RequestFailed(format!(
                "service returned {}: {}",
                status, body
            )));
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::InvalidResponse(e.to_string()))?;

        // Zero-length or inverted spans are dropped rather than allowed
        // to poison downstream interval math.
        Ok(parsed
            .segments
            .into_iter()
            .filter(|s| s.end > s.start)
            .map(|s| {
                let mut segment = TranscriptSegment::new(s.start, s.end, s.text.trim());
                segment.words = s
                    .words
                    .into_iter()
                    .map(|w| WordToken {
                        word: w.word,
                        start: w.start,
                        end: w.end,
                    })
                    .collect();
                segment
            })
            .collect())
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: &Path) -> TranscribeResult<Vec<TranscriptSegment>> {
        let wav = tokio::fs::read(audio).await?;
        self.post_audio(wav).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> TranscriberConfig {
        TranscriberConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_retries: 0,
        }
    }

    async fn write_wav(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let audio = dir.path().join("audio.wav");
        tokio::fs::write(&audio, b"RIFF....WAVE").await.unwrap();
        audio
    }

    #[test]
    fn test_config_defaults() {
        let config = TranscriberConfig::default();
        assert_eq!(config.base_url, "http://localhost:9090");
        assert_eq!(config.max_retries, 2);
    }

    #[tokio::test]
    async fn test_transcribe_parses_segments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transcribe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "segments": [
                    {
                        "start": 2.0, "end": 8.0, "text": " This is incredible! ",
                        "words": [
                            { "word": "This", "start": 2.0, "end": 2.4 },
                            { "word": "is", "start": 2.4, "end": 2.6 }
                        ]
                    },
                    { "start": 8.0, "end": 8.0, "text": "degenerate" },
                    { "start": 9.0, "end": 12.5, "text": "More speech" }
                ]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = write_wav(&dir).await;
        let client = HttpTranscriber::new(config_for(&server)).unwrap();

        let segments = client.transcribe(&audio).await.unwrap();
        assert_eq!(segments.len(), 2, "degenerate span is dropped");
        assert_eq!(segments[0].text, "This is incredible!");
        assert_eq!(segments[0].start, 2.0);
        assert_eq!(segments[0].words.len(), 2);
        assert_eq!(segments[0].words[0].word, "This");
        assert!(segments[1].words.is_empty());
        assert_eq!(segments[1].end, 12.5);
    }

    #[tokio::test]
    async fn test_transcribe_surfaces_service_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transcribe"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = write_wav(&dir).await;
        let client = HttpTranscriber::new(config_for(&server)).unwrap();

        let err = client.transcribe(&audio).await.unwrap_err();
        assert!(matches!(err, TranscribeError::RequestFailed(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "ok" })),
            )
            .mount(&server)
            .await;

        let client = HttpTranscriber::new(config_for(&server)).unwrap();
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_missing_audio_file_is_io_error() {
        let server = MockServer::start().await;
        let client = HttpTranscriber::new(config_for(&server)).unwrap();
        let err = client
            .transcribe(Path::new("/nonexistent/audio.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscribeError::Io(_)));
    }
}
