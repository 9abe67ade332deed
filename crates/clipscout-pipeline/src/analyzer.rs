//! The analysis run orchestrator.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use clipscout_fetch::MediaFetcher;
use clipscout_media::{
    detect_scenes, extract_audio, probe_video, FfmpegSceneDetector, SceneDetector,
};
use clipscout_models::{AnalysisRecord, AnalyzeRequest, ScoredSegment};
use clipscout_storage::ObjectStore;
use clipscout_transcribe::{run_transcription, Transcriber};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::scoring::score_segment;
use crate::selector::select_clips;
use crate::store::AnalysisStore;

/// One-stop orchestrator for analysis runs and render requests.
///
/// All collaborators are injected; none are constructed from ambient
/// state inside business logic.
pub struct VideoAnalyzer {
    pub(crate) config: PipelineConfig,
    pub(crate) fetcher: MediaFetcher,
    pub(crate) detector: Arc<dyn SceneDetector>,
    pub(crate) transcriber: Arc<dyn Transcriber>,
    pub(crate) store: Arc<dyn AnalysisStore>,
    pub(crate) objects: Arc<ObjectStore>,
}

impl VideoAnalyzer {
    pub fn new(
        config: PipelineConfig,
        fetcher: MediaFetcher,
        detector: Arc<dyn SceneDetector>,
        transcriber: Arc<dyn Transcriber>,
        store: Arc<dyn AnalysisStore>,
        objects: Arc<ObjectStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            detector,
            transcriber,
            store,
            objects,
        }
    }

    /// Analyzer wired with the bundled FFmpeg scene detector at the
    /// configured threshold; the remaining collaborators stay injected.
    pub fn with_default_detector(
        config: PipelineConfig,
        fetcher: MediaFetcher,
        transcriber: Arc<dyn Transcriber>,
        store: Arc<dyn AnalysisStore>,
        objects: Arc<ObjectStore>,
    ) -> Self {
        let detector = Arc::new(FfmpegSceneDetector::new(config.scene_threshold));
        Self::new(config, fetcher, detector, transcriber, store, objects)
    }

    /// Run a full analysis.
    pub async fn analyze(&self, request: AnalyzeRequest) -> PipelineResult<AnalysisRecord> {
        self.run_analysis(request, None).await
    }

    /// Run a full analysis that the caller can cancel at any stage
    /// boundary by flipping the watch channel to `true`.
    pub async fn analyze_with_cancel(
        &self,
        request: AnalyzeRequest,
        cancel: watch::Receiver<bool>,
    ) -> PipelineResult<AnalysisRecord> {
        self.run_analysis(request, Some(cancel)).await
    }

    async fn run_analysis(
        &self,
        request: AnalyzeRequest,
        cancel: Option<watch::Receiver<bool>>,
    ) -> PipelineResult<AnalysisRecord> {
        let record = AnalysisRecord::new(&request.user_id, &request.content_id, &request.video_url);
        let logger = RunLogger::new(&record.id, "analyze");

        // Run-scoped working directory, removed on every exit path
        // when `workdir` drops.
        let workdir = tempfile::Builder::new()
            .prefix("clipscout-")
            .tempdir_in(&self.config.work_root)?;

        let result = self
            .run_stages(&request, &record, workdir.path(), &cancel, &logger)
            .await;

        match result {
            Ok(completed) => {
                self.store.put_analysis(&completed).await?;
                logger.completed(&format!(
                    "{} scenes, {} candidates",
                    completed.scene_count,
                    completed.clip_candidates.len()
                ));
                Ok(completed)
            }
            Err(PipelineError::Cancelled) => {
                // Partial results are discarded, nothing is persisted.
                logger.degraded("run", "cancelled by caller");
                Err(PipelineError::Cancelled)
            }
            Err(e) => {
                let failed = record.fail(e.reason());
                if let Err(store_err) = self.store.put_analysis(&failed).await {
                    warn!(
                        analysis_id = %failed.id,
                        error = %store_err,
                        "failed to persist failed analysis record"
                    );
                }
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &AnalyzeRequest,
        base: &AnalysisRecord,
        work: &Path,
        cancel: &Option<watch::Receiver<bool>>,
        logger: &RunLogger,
    ) -> PipelineResult<AnalysisRecord> {
        ensure_live(cancel)?;

        // Stage 1: secure fetch. Fatal on any failure.
        let source_path = work.join("source.mp4");
        self.fetcher.fetch(&request.video_url, &source_path).await?;
        logger.stage_done("fetch");
        ensure_live(cancel)?;

        // Stage 2: probe and audio extraction, concurrently — both
        // only read the downloaded file. Probe failure is fatal;
        // audio failure degrades to an empty transcript.
        let audio_path = work.join("audio.wav");
        let (probe_result, audio_result) = tokio::join!(
            tokio::time::timeout(self.config.probe_timeout, probe_video(&source_path)),
            extract_audio(&source_path, &audio_path, self.config.audio_timeout),
        );
        let metadata = probe_result.map_err(|_| {
            PipelineError::stage_timeout("probe", self.config.probe_timeout.as_secs())
        })??;
        logger.stage_done("probe");

        let audio = match audio_result {
            Ok(path) => Some(path),
            Err(e) => {
                logger.degraded("audio", &e.to_string());
                None
            }
        };
        ensure_live(cancel)?;

        // Stage 3: transcription. Never fatal; the adapter owns audio
        // cleanup on the paths it reaches.
        let transcript = match audio {
            Some(path) => {
                match tokio::time::timeout(
                    self.config.transcribe_timeout,
                    run_transcription(self.transcriber.as_ref(), &path),
                )
                .await
                {
                    Ok(segments) => segments,
                    Err(_) => {
                        logger.degraded("transcribe", "stage timed out");
                        tokio::fs::remove_file(&path).await.ok();
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };
        logger.stage_done("transcribe");
        ensure_live(cancel)?;

        // Stage 4: scene detection with fixed-window fallback.
        let scenes = detect_scenes(
            self.detector.as_ref(),
            &source_path,
            metadata.duration,
            self.config.detect_timeout,
        )
        .await;
        logger.stage_done("scenes");
        ensure_live(cancel)?;

        // Stage 5: deterministic scoring and selection.
        let scored: Vec<ScoredSegment> = scenes
            .iter()
            .map(|scene| score_segment(scene, &transcript, &metadata))
            .collect();
        let candidates = select_clips(&scored, metadata.duration);
        logger.stage_done("select");

        let mut record = base.clone();
        record.transcript_len = transcript.len() as u32;
        record.scene_count = scenes.len() as u32;
        record.metadata = Some(metadata);
        record.clip_candidates = candidates;
        Ok(record.complete())
    }
}

/// Cancellation check at a stage boundary.
fn ensure_live(cancel: &Option<watch::Receiver<bool>>) -> PipelineResult<()> {
    if let Some(rx) = cancel {
        if *rx.borrow() {
            return Err(PipelineError::Cancelled);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_live() {
        assert!(ensure_live(&None).is_ok());

        let (tx, rx) = watch::channel(false);
        assert!(ensure_live(&Some(rx.clone())).is_ok());

        tx.send(true).unwrap();
        assert!(matches!(
            ensure_live(&Some(rx)),
            Err(PipelineError::Cancelled)
        ));
    }
}
