//! Analysis persistence boundary.
//!
//! Production deployments plug their own backend in behind
//! [`AnalysisStore`]; [`MemoryAnalysisStore`] serves tests and
//! single-node setups. All writes are keyed by analysis id and clip id
//! so concurrent runs never collide.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use clipscout_models::{AnalysisRecord, RenderedClip};

/// Persistence error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("analysis {0} not found")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// External persistence collaborator for analysis records and
/// rendered-clip metadata.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist an analysis record (insert or replace by id).
    async fn put_analysis(&self, record: &AnalysisRecord) -> Result<(), StoreError>;

    /// Load an analysis record by id.
    async fn get_analysis(&self, analysis_id: &str) -> Result<AnalysisRecord, StoreError>;

    /// Persist a rendered-clip record.
    async fn put_rendered_clip(&self, clip: &RenderedClip) -> Result<(), StoreError>;

    /// List rendered clips for an analysis.
    async fn list_rendered_clips(&self, analysis_id: &str) -> Result<Vec<RenderedClip>, StoreError>;
}

/// In-memory store for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryAnalysisStore {
    analyses: RwLock<HashMap<String, AnalysisRecord>>,
    clips: RwLock<HashMap<String, Vec<RenderedClip>>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored analyses (test helper).
    pub async fn analysis_count(&self) -> usize {
        self.analyses.read().await.len()
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn put_analysis(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        self.analyses
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_analysis(&self, analysis_id: &str) -> Result<AnalysisRecord, StoreError> {
        self.analyses
            .read()
            .await
            .get(analysis_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(analysis_id.to_string()))
    }

    async fn put_rendered_clip(&self, clip: &RenderedClip) -> Result<(), StoreError> {
        self.clips
            .write()
            .await
            .entry(clip.analysis_id.clone())
            .or_default()
            .push(clip.clone());
        Ok(())
    }

    async fn list_rendered_clips(&self, analysis_id: &str) -> Result<Vec<RenderedClip>, StoreError> {
        Ok(self
            .clips
            .read()
            .await
            .get(analysis_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipscout_models::ClipCandidate;

    #[tokio::test]
    async fn test_analysis_roundtrip() {
        let store = MemoryAnalysisStore::new();
        let record = AnalysisRecord::new("u1", "c1", "https://example.com/v").complete();
        store.put_analysis(&record).await.unwrap();

        let loaded = store.get_analysis(&record.id).await.unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.status, record.status);
    }

    #[tokio::test]
    async fn test_missing_analysis() {
        let store = MemoryAnalysisStore::new();
        assert!(matches!(
            store.get_analysis("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rendered_clips_keyed_by_analysis() {
        let store = MemoryAnalysisStore::new();
        let candidate = ClipCandidate::new(0.0, 30.0, 80);
        let clip = RenderedClip::from_candidate("u1", "c1", "a1", &candidate, "https://cdn/c.mp4");

        store.put_rendered_clip(&clip).await.unwrap();
        store.put_rendered_clip(&clip).await.unwrap();

        assert_eq!(store.list_rendered_clips("a1").await.unwrap().len(), 2);
        assert!(store.list_rendered_clips("other").await.unwrap().is_empty());
    }
}
