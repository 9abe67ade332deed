//! Analysis and render orchestration.
//!
//! [`VideoAnalyzer`] owns one run end to end: secure fetch into a
//! run-scoped working directory, concurrent probe and audio extraction,
//! transcription (degrading to empty), scene detection (falling back to
//! fixed windows), deterministic scoring, candidate selection and
//! persistence. Render requests run independently per stored candidate.
//!
//! Collaborators are injected: the transcriber, scene detector,
//! analysis store and object store are all interface-typed, with no-op
//! and in-memory implementations for test contexts.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod logging;
pub mod render_job;
pub mod scoring;
pub mod selector;
pub mod store;

pub use analyzer::VideoAnalyzer;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::{init_tracing, RunLogger};
pub use scoring::{score_segment, ENGAGEMENT_KEYWORDS};
pub use selector::select_clips;
pub use store::{AnalysisStore, MemoryAnalysisStore, StoreError};
