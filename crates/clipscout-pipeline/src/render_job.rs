//! Render requests against stored clip candidates.
//!
//! Renders run independently of analysis and of each other: a failure
//! here fails only this request, never the parent record. Output keys
//! are deterministic per `(analysis, clip, options)`, so re-invoking
//! the same request re-renders the same range and produces a clip of
//! identical duration.

use tracing::warn;

use clipscout_media::{generate_thumbnail, render_clip, AspectRatio, FfmpegRunner, RenderSpec};
use clipscout_models::{format_seconds, format_srt, RenderOptions, RenderRequest, RenderedClip};
use clipscout_storage::thumbnail_key;

use crate::analyzer::VideoAnalyzer;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::store::StoreError;

impl VideoAnalyzer {
    /// Render one stored candidate and upload the result.
    pub async fn render(&self, request: RenderRequest) -> PipelineResult<RenderedClip> {
        let logger = RunLogger::new(&request.analysis_id, "render");

        let record = self
            .store
            .get_analysis(&request.analysis_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => PipelineError::AnalysisNotFound(id),
                other => PipelineError::Store(other),
            })?;

        let candidate = record
            .candidate(&request.clip_id)
            .ok_or_else(|| PipelineError::ClipNotFound {
                analysis_id: request.analysis_id.clone(),
                clip_id: request.clip_id.clone(),
            })?
            .clone();

        let aspect = parse_aspect(&request.options)?;

        // Working directory for this render only; removed on drop.
        let workdir = tempfile::Builder::new()
            .prefix("clipscout-render-")
            .tempdir_in(&self.config.work_root)?;

        // The analysis run's temporary file is long gone; renders
        // re-acquire the source through the same validated fetch path.
        let source_path = workdir.path().join("source.mp4");
        self.fetcher.fetch(&record.video_url, &source_path).await?;
        logger.stage_done("fetch");

        let mut spec = RenderSpec::new(candidate.start, candidate.end).with_aspect(aspect);
        if request.options.burn_in_captions && !candidate.caption.is_empty() {
            let srt_path = workdir.path().join("caption.srt");
            tokio::fs::write(
                &srt_path,
                caption_srt(&candidate.caption, candidate.duration),
            )
            .await?;
            spec = spec.with_subtitles(srt_path);
        }

        let filename = format!("clip_{}_{}.mp4", candidate.id, request.options.key_suffix());
        let output_path = workdir.path().join(&filename);
        render_clip(
            &source_path,
            &output_path,
            &spec,
            &self.config.encoding,
            FfmpegRunner::new().with_timeout(self.config.render_timeout),
        )
        .await?;
        logger.stage_done("render");

        let thumb_path = output_path.with_extension("jpg");
        if let Err(e) = generate_thumbnail(&output_path, &thumb_path).await {
            warn!(clip_id = %candidate.id, error = %e, "thumbnail generation failed");
        }

        let key = self
            .objects
            .upload_clip(
                &output_path,
                &record.user_id,
                &record.content_id,
                &record.id,
                &filename,
            )
            .await?;

        if thumb_path.exists() {
            if let Err(e) = self
                .objects
                .upload_file(&thumb_path, &thumbnail_key(&key), "image/jpeg")
                .await
            {
                warn!(clip_id = %candidate.id, error = %e, "thumbnail upload failed");
            }
        }

        let url = self
            .objects
            .presign_get(&key, self.config.presign_expiry)
            .await?;
        logger.stage_done("upload");

        let clip = RenderedClip::from_candidate(
            &record.user_id,
            &record.content_id,
            &record.id,
            &candidate,
            url,
        );
        self.store.put_rendered_clip(&clip).await?;
        logger.completed(&format!(
            "clip {} ({} to {}) rendered",
            candidate.id,
            format_seconds(candidate.start),
            format_seconds(candidate.end)
        ));
        Ok(clip)
    }
}

fn parse_aspect(options: &RenderOptions) -> PipelineResult<AspectRatio> {
    match options.aspect_ratio.as_deref() {
        None => Ok(AspectRatio::Source),
        Some(s) => AspectRatio::parse(s).ok_or_else(|| {
            PipelineError::InvalidOptions(format!("unsupported aspect ratio '{}'", s))
        }),
    }
}

/// A single SRT cue spanning the whole clip.
fn caption_srt(caption: &str, duration: f64) -> String {
    format!(
        "1\n{} --> {}\n{}\n",
        format_srt(0.0),
        format_srt(duration.max(0.0)),
        caption.trim()
    )
}
