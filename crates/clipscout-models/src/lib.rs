//! Shared data models for the ClipScout pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Analysis records and their lifecycle status
//! - Validated media sources and probed video metadata
//! - Transcript segments, scenes, scored segments
//! - Clip candidates and rendered-clip records
//! - Encoding configuration and timestamp utilities

pub mod analysis;
pub mod clip;
pub mod encoding;
pub mod scene;
pub mod source;
pub mod timestamp;
pub mod transcript;
pub mod video;

// Re-export common types
pub use analysis::{AnalysisRecord, AnalysisStatus, AnalyzeRequest, RenderOptions, RenderRequest};
pub use clip::{ClipCandidate, Platform, RenderedClip};
pub use encoding::EncodingConfig;
pub use scene::{Scene, ScoredSegment};
pub use source::MediaSource;
pub use timestamp::{format_seconds, format_srt};
pub use transcript::{TranscriptSegment, WordToken};
pub use video::VideoMetadata;
