//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use clipscout_models::EncodingConfig;

/// Per-stage bounds and knobs for one pipeline deployment.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Probe timeout
    pub probe_timeout: Duration,
    /// Audio extraction timeout
    pub audio_timeout: Duration,
    /// Transcription stage timeout (on top of the backend's own)
    pub transcribe_timeout: Duration,
    /// Scene detection timeout before the fixed-window fallback
    pub detect_timeout: Duration,
    /// Render timeout per request
    pub render_timeout: Duration,
    /// Frame-difference threshold for the primary scene detector
    pub scene_threshold: f64,
    /// Root under which run-scoped working directories are created
    pub work_root: PathBuf,
    /// Lifetime of presigned clip URLs
    pub presign_expiry: Duration,
    /// Encoding for rendered clips
    pub encoding: EncodingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(60),
            audio_timeout: Duration::from_secs(180),
            transcribe_timeout: Duration::from_secs(600),
            detect_timeout: Duration::from_secs(180),
            render_timeout: Duration::from_secs(600),
            scene_threshold: 0.4,
            work_root: std::env::temp_dir(),
            presign_expiry: Duration::from_secs(7 * 24 * 3600),
            encoding: EncodingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            probe_timeout: env_secs("CLIPSCOUT_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
            audio_timeout: env_secs("CLIPSCOUT_AUDIO_TIMEOUT_SECS", defaults.audio_timeout),
            transcribe_timeout: env_secs(
                "CLIPSCOUT_TRANSCRIBE_TIMEOUT_SECS",
                defaults.transcribe_timeout,
            ),
            detect_timeout: env_secs("CLIPSCOUT_DETECT_TIMEOUT_SECS", defaults.detect_timeout),
            render_timeout: env_secs("CLIPSCOUT_RENDER_TIMEOUT_SECS", defaults.render_timeout),
            scene_threshold: std::env::var("CLIPSCOUT_SCENE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.scene_threshold),
            work_root: std::env::var("CLIPSCOUT_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_root),
            presign_expiry: env_secs("CLIPSCOUT_PRESIGN_EXPIRY_SECS", defaults.presign_expiry),
            encoding: EncodingConfig::default(),
        }
    }
}

fn env_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.probe_timeout, Duration::from_secs(60));
        assert_eq!(config.scene_threshold, 0.4);
        assert_eq!(config.presign_expiry, Duration::from_secs(604_800));
    }
}
