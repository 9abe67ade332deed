//! Clip rendering: range extraction, reformat, caption burn-in.

use std::path::{Path, PathBuf};

use tracing::info;

use clipscout_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Portrait reformat: scale to height, then center-crop to 9:16.
/// No distortion — excess width is cropped, never squeezed.
pub const FILTER_PORTRAIT: &str = "scale=-2:1920,crop=1080:1920";

/// Output framing for a rendered clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    /// Keep the source framing
    #[default]
    Source,
    /// Vertical 9:16 via scale-then-crop
    Vertical,
}

impl AspectRatio {
    /// Parse a caller-supplied aspect string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "9:16" | "vertical" | "portrait" => Some(Self::Vertical),
            "source" | "original" => Some(Self::Source),
            _ => None,
        }
    }

    fn filter(&self) -> Option<&'static str> {
        match self {
            Self::Source => None,
            Self::Vertical => Some(FILTER_PORTRAIT),
        }
    }
}

/// What to render from a source.
#[derive(Debug, Clone)]
pub struct RenderSpec {
    /// Clip start in source seconds
    pub start: f64,
    /// Clip end in source seconds (must exceed start)
    pub end: f64,
    /// Output framing
    pub aspect: AspectRatio,
    /// Subtitle file to burn in, if any
    pub subtitles: Option<PathBuf>,
}

impl RenderSpec {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            aspect: AspectRatio::Source,
            subtitles: None,
        }
    }

    pub fn with_aspect(mut self, aspect: AspectRatio) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_subtitles(mut self, path: impl Into<PathBuf>) -> Self {
        self.subtitles = Some(path.into());
        self
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Render `[spec.start, spec.end]` from `input` into `output`,
/// re-encoding to the delivery codec.
pub async fn render_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    spec: &RenderSpec,
    encoding: &EncodingConfig,
    runner: FfmpegRunner,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let cmd = build_render_command(input, output, spec, encoding)?;
    runner.run(&cmd).await?;

    info!(
        input = %input.display(),
        output = %output.display(),
        start = spec.start,
        duration = spec.duration(),
        "rendered clip"
    );
    Ok(())
}

fn build_render_command(
    input: &Path,
    output: &Path,
    spec: &RenderSpec,
    encoding: &EncodingConfig,
) -> MediaResult<FfmpegCommand> {
    if !(spec.end > spec.start) {
        return Err(MediaError::invalid_range(format!(
            "end ({:.3}) must exceed start ({:.3})",
            spec.end, spec.start
        )));
    }
    if spec.start < 0.0 {
        return Err(MediaError::invalid_range("start must be non-negative"));
    }

    let mut filters: Vec<String> = Vec::new();
    if let Some(aspect) = spec.aspect.filter() {
        filters.push(aspect.to_string());
    }
    if let Some(srt) = &spec.subtitles {
        filters.push(format!(
            "subtitles={}",
            escape_filter_path(&srt.to_string_lossy())
        ));
    }

    let mut cmd = FfmpegCommand::new(input, output)
        .seek(spec.start)
        .duration(spec.duration());
    if !filters.is_empty() {
        cmd = cmd.video_filter(filters.join(","));
    }
    Ok(cmd.output_args(encoding.to_ffmpeg_args()))
}

/// Escape a path for use inside an FFmpeg filter argument.
fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}
