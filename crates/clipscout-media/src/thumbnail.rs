//! Thumbnail generation.

use std::path::Path;

use clipscout_models::encoding::{THUMBNAIL_SCALE_WIDTH, THUMBNAIL_TIMESTAMP};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Generate a thumbnail frame from a rendered clip.
pub async fn generate_thumbnail(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video_path.as_ref(), output_path.as_ref())
        .input_arg("-ss")
        .input_arg(THUMBNAIL_TIMESTAMP)
        .single_frame()
        .video_filter(format!("scale={}:-2", THUMBNAIL_SCALE_WIDTH));

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_command() {
        let args = FfmpegCommand::new("clip.mp4", "clip.jpg")
            .input_arg("-ss")
            .input_arg(THUMBNAIL_TIMESTAMP)
            .single_frame()
            .video_filter(format!("scale={}:-2", THUMBNAIL_SCALE_WIDTH))
            .build_args();
        assert!(args.contains(&"-vframes".to_string()));
        assert!(args.contains(&"scale=480:-2".to_string()));
    }
}
