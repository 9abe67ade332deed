//! Clip candidate and rendered-clip models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Target platform a candidate is suited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Tiktok,
    InstagramReels,
    YoutubeShorts,
    Twitter,
    Linkedin,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tiktok => "tiktok",
            Self::InstagramReels => "instagram_reels",
            Self::YoutubeShorts => "youtube_shorts",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scored, ranked sub-interval proposed for extraction.
///
/// Generated only from scored segments; immutable once stored on an
/// analysis record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipCandidate {
    /// Unique candidate id (UUID)
    pub id: String,
    /// Start offset into the source, seconds
    pub start: f64,
    /// End offset into the source, seconds (always > start)
    pub end: f64,
    /// Final candidate duration, seconds
    pub duration: f64,
    /// Engagement score inherited from the segment, in [0, 100]
    pub score: u8,
    /// Human-readable explanation of which signals fired
    pub reason: String,
    /// Suggested target platforms for the final duration
    pub platforms: Vec<Platform>,
    /// Suggested caption derived from the overlapping transcript
    pub caption: String,
}

impl ClipCandidate {
    pub fn new(start: f64, end: f64, score: u8) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start,
            end,
            duration: end - start,
            score,
            reason: String::new(),
            platforms: Vec::new(),
            caption: String::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}

/// A clip rendered from a stored candidate and uploaded to durable storage.
///
/// Created only by an explicit render request, never during analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderedClip {
    /// Owning user
    pub user_id: String,
    /// Source content id
    pub content_id: String,
    /// The analysis this clip was selected from
    pub analysis_id: String,
    /// The candidate that was rendered
    pub clip_id: String,
    /// Clip range in source seconds
    pub start: f64,
    pub end: f64,
    /// Output duration, seconds
    pub duration: f64,
    /// Score inherited from the candidate
    pub score: u8,
    /// Retrievable storage URL
    pub url: String,
    /// Candidate reason, carried for display
    pub reason: String,
    /// Suggested platforms, carried for display
    pub platforms: Vec<Platform>,
    /// Suggested caption, carried for display
    pub caption: String,
    /// When the render completed
    pub created_at: DateTime<Utc>,
}

impl RenderedClip {
    /// Build a rendered-clip record from its candidate.
    pub fn from_candidate(
        user_id: impl Into<String>,
        content_id: impl Into<String>,
        analysis_id: impl Into<String>,
        candidate: &ClipCandidate,
        url: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            content_id: content_id.into(),
            analysis_id: analysis_id.into(),
            clip_id: candidate.id.clone(),
            start: candidate.start,
            end: candidate.end,
            duration: candidate.duration,
            score: candidate.score,
            url: url.into(),
            reason: candidate.reason.clone(),
            platforms: candidate.platforms.clone(),
            caption: candidate.caption.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_builder() {
        let candidate = ClipCandidate::new(10.0, 55.0, 80)
            .with_reason("strong opening hook")
            .with_platforms(vec![Platform::Tiktok, Platform::YoutubeShorts])
            .with_caption("Watch this.");

        assert_eq!(candidate.duration, 45.0);
        assert_eq!(candidate.platforms.len(), 2);
        assert!(!candidate.id.is_empty());
    }

    #[test]
    fn test_rendered_clip_carries_candidate_fields() {
        let candidate = ClipCandidate::new(0.0, 30.0, 90).with_caption("Hello!");
        let clip = RenderedClip::from_candidate("u1", "c1", "a1", &candidate, "https://cdn/x.mp4");

        assert_eq!(clip.clip_id, candidate.id);
        assert_eq!(clip.duration, 30.0);
        assert_eq!(clip.score, 90);
        assert_eq!(clip.caption, "Hello!");
    }

    #[test]
    fn test_platform_serialization() {
        let json = serde_json::to_string(&Platform::InstagramReels).unwrap();
        assert_eq!(json, "\"instagram_reels\"");
        assert_eq!(Platform::InstagramReels.as_str(), "instagram_reels");
        assert_eq!(Platform::Tiktok.to_string(), "tiktok");
    }
}
