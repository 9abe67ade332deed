//! Analysis workflow data models.
//!
//! An [`AnalysisRecord`] is the persistent result of one pipeline run:
//! probed metadata, transcript/scene counts and the ranked clip
//! candidates. Status transitions are monotonic — a terminal record
//! never goes back to pending.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::ClipCandidate;
use crate::video::VideoMetadata;

/// Status of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Run is in flight, record not yet persisted
    #[default]
    Pending,
    /// Analysis completed (possibly with degraded inputs)
    Completed,
    /// Analysis failed fatally
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns true once the run can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Request to start an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeRequest {
    /// Source video URL (https)
    pub video_url: String,
    /// Caller's content id
    pub content_id: String,
    /// Owning user id
    pub user_id: String,
}

/// Options for rendering a stored candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RenderOptions {
    /// Target aspect ratio, e.g. "9:16"; None keeps the source framing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Burn the suggested caption into the output
    #[serde(default)]
    pub burn_in_captions: bool,
}

impl RenderOptions {
    /// Stable filename suffix so identical options map to the same
    /// storage key.
    pub fn key_suffix(&self) -> String {
        let aspect = match self.aspect_ratio.as_deref() {
            Some(a) => a.replace(':', "x"),
            None => "source".to_string(),
        };
        if self.burn_in_captions {
            format!("{}_cap", aspect)
        } else {
            aspect
        }
    }
}

/// Request to render one stored candidate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderRequest {
    pub analysis_id: String,
    pub clip_id: String,
    #[serde(default)]
    pub options: RenderOptions,
}

/// Compact candidate view persisted in the record's `top_clips` list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipSummary {
    pub start: f64,
    pub end: f64,
    pub score: u8,
    pub reason: String,
}

/// The persistent record of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRecord {
    /// Unique record id (UUID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Caller's content id
    pub content_id: String,
    /// Validated source URL
    pub video_url: String,
    /// Probed container metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,
    /// Number of transcript segments (0 when transcription degraded)
    pub transcript_len: u32,
    /// Number of detected (or fallback) scenes
    pub scene_count: u32,
    /// Ranked clip candidates, immutable once stored
    pub clip_candidates: Vec<ClipCandidate>,
    /// Run status
    pub status: AnalysisStatus,
    /// Failure reason when status is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// When the run started
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Create a new pending record for a run.
    pub fn new(
        user_id: impl Into<String>,
        content_id: impl Into<String>,
        video_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            content_id: content_id.into(),
            video_url: video_url.into(),
            metadata: None,
            transcript_len: 0,
            scene_count: 0,
            clip_candidates: Vec::new(),
            status: AnalysisStatus::Pending,
            failure_reason: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the record completed. No-op on an already-terminal record.
    pub fn complete(mut self) -> Self {
        if !self.status.is_terminal() {
            self.status = AnalysisStatus::Completed;
        }
        self
    }

    /// Mark the record failed with a reason. No-op on an
    /// already-terminal record.
    pub fn fail(mut self, reason: impl Into<String>) -> Self {
        if !self.status.is_terminal() {
            self.status = AnalysisStatus::Failed;
            self.failure_reason = Some(reason.into());
        }
        self
    }

    /// Find a stored candidate by id.
    pub fn candidate(&self, clip_id: &str) -> Option<&ClipCandidate> {
        self.clip_candidates.iter().find(|c| c.id == clip_id)
    }

    /// The top `n` candidates as compact summaries.
    pub fn top_clips(&self, n: usize) -> Vec<ClipSummary> {
        self.clip_candidates
            .iter()
            .take(n)
            .map(|c| ClipSummary {
                start: c.start,
                end: c.end,
                score: c.score,
                reason: c.reason.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_terminal() {
        assert!(!AnalysisStatus::Pending.is_terminal());
        assert!(AnalysisStatus::Completed.is_terminal());
        assert!(AnalysisStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        let record = AnalysisRecord::new("u1", "c1", "https://example.com/v");
        assert_eq!(record.status, AnalysisStatus::Pending);

        let completed = record.complete();
        assert_eq!(completed.status, AnalysisStatus::Completed);

        // A terminal record never regresses
        let still_completed = completed.fail("too late");
        assert_eq!(still_completed.status, AnalysisStatus::Completed);
        assert!(still_completed.failure_reason.is_none());
    }

    #[test]
    fn test_fail_records_reason() {
        let record = AnalysisRecord::new("u1", "c1", "https://example.com/v").fail("probe failed");
        assert_eq!(record.status, AnalysisStatus::Failed);
        assert_eq!(record.failure_reason.as_deref(), Some("probe failed"));
    }

    #[test]
    fn test_candidate_lookup() {
        let mut record = AnalysisRecord::new("u1", "c1", "https://example.com/v");
        let candidate = ClipCandidate::new(0.0, 30.0, 75);
        let id = candidate.id.clone();
        record.clip_candidates.push(candidate);

        assert!(record.candidate(&id).is_some());
        assert!(record.candidate("missing").is_none());
    }

    #[test]
    fn test_render_options_key_suffix() {
        assert_eq!(RenderOptions::default().key_suffix(), "source");

        let opts = RenderOptions {
            aspect_ratio: Some("9:16".to_string()),
            burn_in_captions: true,
        };
        assert_eq!(opts.key_suffix(), "9x16_cap");

        // Equal options yield equal suffixes (render idempotency key)
        assert_eq!(opts.key_suffix(), opts.clone().key_suffix());
    }
}
