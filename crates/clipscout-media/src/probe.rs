//! FFprobe container metadata extraction.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use clipscout_models::VideoMetadata;

use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a video file for container and stream metadata.
///
/// Downstream stages need the duration as an upper bound, so any
/// failure here is fatal to the analysis run.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoMetadata> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "ffprobe exited with non-zero status".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    let metadata = build_metadata(&probe)?;

    debug!(
        path = %path.display(),
        duration = metadata.duration,
        width = metadata.width,
        height = metadata.height,
        has_audio = metadata.has_audio,
        "probed video"
    );

    Ok(metadata)
}

fn build_metadata(probe: &FfprobeOutput) -> MediaResult<VideoMetadata> {
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("no video stream found".to_string()))?;

    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);
    if duration <= 0.0 {
        return Err(MediaError::InvalidVideo(
            "container reports no duration".to_string(),
        ));
    }

    let file_size = probe
        .format
        .size
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let frame_rate = video_stream
        .avg_frame_rate
        .as_deref()
        .or(video_stream.r_frame_rate.as_deref())
        .and_then(parse_frame_rate)
        .unwrap_or(30.0);

    Ok(VideoMetadata::new(
        duration,
        video_stream.width.unwrap_or(0),
        video_stream.height.unwrap_or(0),
        frame_rate,
        has_audio,
        file_size,
    ))
}

/// Parse a frame-rate string, either a fraction ("30000/1001") or a
/// bare decimal ("29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
        assert!(parse_frame_rate("garbage").is_none());
    }

    fn probe_fixture(streams: Vec<FfprobeStream>, duration: &str) -> FfprobeOutput {
        FfprobeOutput {
            format: FfprobeFormat {
                duration: Some(duration.to_string()),
                size: Some("1048576".to_string()),
            },
            streams,
        }
    }

    fn video_stream() -> FfprobeStream {
        FfprobeStream {
            codec_type: "video".to_string(),
            width: Some(1920),
            height: Some(1080),
            r_frame_rate: Some("30/1".to_string()),
            avg_frame_rate: Some("30000/1001".to_string()),
        }
    }

    fn audio_stream() -> FfprobeStream {
        FfprobeStream {
            codec_type: "audio".to_string(),
            width: None,
            height: None,
            r_frame_rate: None,
            avg_frame_rate: None,
        }
    }

    #[test]
    fn test_build_metadata() {
        let probe = probe_fixture(vec![video_stream(), audio_stream()], "130.5");
        let meta = build_metadata(&probe).unwrap();
        assert!((meta.duration - 130.5).abs() < 0.001);
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.aspect_ratio, "16:9");
        assert!(meta.has_audio);
        assert!((meta.frame_rate - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_build_metadata_without_audio() {
        let probe = probe_fixture(vec![video_stream()], "60");
        let meta = build_metadata(&probe).unwrap();
        assert!(!meta.has_audio);
    }

    #[test]
    fn test_build_metadata_rejects_missing_video_stream() {
        let probe = probe_fixture(vec![audio_stream()], "60");
        assert!(matches!(
            build_metadata(&probe),
            Err(MediaError::InvalidVideo(_))
        ));
    }

    #[test]
    fn test_build_metadata_rejects_zero_duration() {
        let probe = probe_fixture(vec![video_stream()], "0");
        assert!(matches!(
            build_metadata(&probe),
            Err(MediaError::InvalidVideo(_))
        ));
    }
}
