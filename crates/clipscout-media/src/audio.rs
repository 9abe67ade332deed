//! Audio track extraction for transcription input.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Sample rate expected by speech-to-text backends.
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;

/// Extract a mono 16 kHz PCM WAV track from a video file.
///
/// The output feeds the transcription adapter. Callers treat failure as
/// non-fatal: an analysis proceeds with an empty transcript when no
/// audio can be extracted.
pub async fn extract_audio(
    video_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    timeout: Duration,
) -> MediaResult<PathBuf> {
    let video_path = video_path.as_ref();
    let out_path = out_path.as_ref();

    let cmd = FfmpegCommand::new(video_path, out_path)
        .no_video()
        .audio_codec("pcm_s16le")
        .audio_channels(1)
        .audio_rate(TRANSCRIPTION_SAMPLE_RATE);

    FfmpegRunner::new().with_timeout(timeout).run(&cmd).await?;

    info!(
        video = %video_path.display(),
        audio = %out_path.display(),
        "extracted transcription audio"
    );
    Ok(out_path.to_path_buf())
}
