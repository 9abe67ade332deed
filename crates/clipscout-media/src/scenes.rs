//! Scene boundary detection.
//!
//! The primary detector is a swappable strategy ([`SceneDetector`]);
//! the bundled implementation marks a boundary wherever FFmpeg's
//! frame-difference signal exceeds a threshold. Whenever the primary
//! detector fails, times out or produces nothing usable, analysis falls
//! back to fixed-width windows that exactly partition the video — that
//! partition invariant is the hard contract, the primary detector's
//! exact boundary semantics are not.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use clipscout_models::Scene;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Minimum scene length; shorter segments are merged forward.
pub const MIN_SCENE_SECS: f64 = 2.0;

/// Fixed window width used by the fallback partition.
pub const FALLBACK_WINDOW_SECS: f64 = 10.0;

/// Default frame-difference threshold for the primary detector.
pub const DEFAULT_SCENE_THRESHOLD: f64 = 0.4;

/// A strategy producing scene boundaries for a video.
#[async_trait]
pub trait SceneDetector: Send + Sync {
    async fn detect(&self, video: &Path, duration: f64) -> MediaResult<Vec<Scene>>;
}

/// Run the detector with a bounded timeout, falling back to fixed
/// windows on error, timeout or an empty result.
pub async fn detect_scenes(
    detector: &dyn SceneDetector,
    video: &Path,
    duration: f64,
    timeout: Duration,
) -> Vec<Scene> {
    match tokio::time::timeout(timeout, detector.detect(video, duration)).await {
        Ok(Ok(scenes)) if !scenes.is_empty() => {
            info!(scene_count = scenes.len(), "scene detection complete");
            scenes
        }
        Ok(Ok(_)) => {
            warn!("scene detector returned no scenes, using fixed windows");
            fallback_scenes(duration)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "scene detection failed, using fixed windows");
            fallback_scenes(duration)
        }
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "scene detection timed out, using fixed windows"
            );
            fallback_scenes(duration)
        }
    }
}

/// Fixed-width windows exactly partitioning `[0, duration]`.
///
/// Consecutive windows share edges and the final window is truncated to
/// end at `duration` — no gap, no overlap.
pub fn fallback_scenes(duration: f64) -> Vec<Scene> {
    let mut scenes = Vec::new();
    let mut start = 0.0;
    while start < duration {
        let end = (start + FALLBACK_WINDOW_SECS).min(duration);
        scenes.push(Scene::new(start, end));
        start = end;
    }
    scenes
}

/// Primary detector: FFmpeg frame-difference signal.
///
/// Runs `select='gt(scene,t)',showinfo` as an analysis pass and reads
/// the selected frames' `pts_time` marks from the diagnostic output.
pub struct FfmpegSceneDetector {
    threshold: f64,
    timeout: Option<Duration>,
}

impl FfmpegSceneDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            timeout: None,
        }
    }

    /// Bound the ffmpeg analysis pass itself (in addition to the
    /// caller-level timeout in [`detect_scenes`]).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for FfmpegSceneDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_THRESHOLD)
    }
}

#[async_trait]
impl SceneDetector for FfmpegSceneDetector {
    async fn detect(&self, video: &Path, duration: f64) -> MediaResult<Vec<Scene>> {
        let filter = format!("select='gt(scene,{})',showinfo", self.threshold);
        let cmd = FfmpegCommand::analysis(video).video_filter(filter).no_audio();

        let mut runner = FfmpegRunner::new();
        if let Some(timeout) = self.timeout {
            runner = runner.with_timeout(timeout);
        }

        let lines = runner.run_capturing(&cmd).await?;
        let boundaries = parse_boundary_times(&lines);
        Ok(scenes_from_boundaries(&boundaries, duration, MIN_SCENE_SECS))
    }
}

/// Pull `pts_time:` marks out of showinfo diagnostic lines.
fn parse_boundary_times(lines: &[String]) -> Vec<f64> {
    let pattern = Regex::new(r"pts_time:([0-9]+(?:\.[0-9]+)?)").expect("valid regex");
    lines
        .iter()
        .filter_map(|line| {
            pattern
                .captures(line)
                .and_then(|caps| caps[1].parse::<f64>().ok())
        })
        .collect()
}

/// Turn boundary times into scenes covering `[0, duration]`, merging
/// segments shorter than `min_len` forward into their successor.
fn scenes_from_boundaries(boundaries: &[f64], duration: f64, min_len: f64) -> Vec<Scene> {
    let mut edges: Vec<f64> = boundaries
        .iter()
        .copied()
        .filter(|t| *t > 0.0 && *t < duration)
        .collect();
    edges.sort_by(|a, b| a.partial_cmp(b).expect("finite boundary times"));
    edges.dedup_by(|a, b| (*a - *b).abs() < 1e-6);

    let mut scenes = Vec::new();
    let mut start = 0.0;
    for edge in edges {
        // Dropping the boundary merges the short segment into the next
        if edge - start < min_len {
            continue;
        }
        scenes.push(Scene::new(start, edge));
        start = edge;
    }

    if duration - start >= min_len || scenes.is_empty() {
        if duration > start {
            scenes.push(Scene::new(start, duration));
        }
    } else if let Some(last) = scenes.last_mut() {
        // Trailing short segment has no successor; absorb it backward
        last.end = duration;
    }

    scenes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partitions(scenes: &[Scene], duration: f64) {
        assert!(!scenes.is_empty());
        assert_eq!(scenes[0].start, 0.0);
        for pair in scenes.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap at {:?}", pair);
        }
        assert_eq!(scenes.last().unwrap().end, duration);
    }

    #[test]
    fn test_fallback_exactly_partitions() {
        for duration in [130.0, 25.0, 10.0, 9.9, 0.3, 100.05] {
            let scenes = fallback_scenes(duration);
            assert_partitions(&scenes, duration);
            for scene in &scenes {
                assert!(scene.duration() <= FALLBACK_WINDOW_SECS + 1e-9);
                assert!(scene.duration() > 0.0);
            }
        }
    }

    #[test]
    fn test_fallback_truncates_final_window() {
        let scenes = fallback_scenes(25.0);
        assert_eq!(scenes.len(), 3);
        assert_eq!(scenes[2].start, 20.0);
        assert_eq!(scenes[2].end, 25.0);
    }

    #[test]
    fn test_fallback_empty_for_zero_duration() {
        assert!(fallback_scenes(0.0).is_empty());
    }

    #[test]
    fn test_parse_boundary_times() {
        let lines = vec![
            "[Parsed_showinfo_1 @ 0x5578] n:   0 pts:  375375 pts_time:12.512 duration:1".to_string(),
            "frame=   42 fps=0.0 q=-0.0".to_string(),
            "[Parsed_showinfo_1 @ 0x5578] n:   1 pts: 1126125 pts_time:37.537 duration:1".to_string(),
        ];
        let times = parse_boundary_times(&lines);
        assert_eq!(times, vec![12.512, 37.537]);
    }

    #[test]
    fn test_scenes_from_boundaries() {
        let scenes = scenes_from_boundaries(&[12.5, 37.5], 60.0, MIN_SCENE_SECS);
        assert_eq!(scenes.len(), 3);
        assert_partitions(&scenes, 60.0);
        assert_eq!(scenes[1].start, 12.5);
        assert_eq!(scenes[1].end, 37.5);
    }

    #[test]
    fn test_short_segments_merge_forward() {
        // Boundary at 1.0 would create a 1s scene; it merges into the next
        let scenes = scenes_from_boundaries(&[1.0, 20.0], 60.0, MIN_SCENE_SECS);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0], Scene::new(0.0, 20.0));
        assert_eq!(scenes[1], Scene::new(20.0, 60.0));
    }

    #[test]
    fn test_trailing_short_segment_merges_backward() {
        let scenes = scenes_from_boundaries(&[30.0, 59.5], 60.0, MIN_SCENE_SECS);
        assert_eq!(scenes.len(), 2);
        assert_partitions(&scenes, 60.0);
        assert_eq!(scenes[1], Scene::new(30.0, 60.0));
    }

    #[test]
    fn test_out_of_range_boundaries_ignored() {
        let scenes = scenes_from_boundaries(&[-5.0, 0.0, 30.0, 60.0, 75.0], 60.0, MIN_SCENE_SECS);
        assert_eq!(scenes.len(), 2);
        assert_partitions(&scenes, 60.0);
    }

    #[test]
    fn test_no_boundaries_yields_single_scene() {
        let scenes = scenes_from_boundaries(&[], 45.0, MIN_SCENE_SECS);
        assert_eq!(scenes, vec![Scene::new(0.0, 45.0)]);
    }

    struct FailingDetector;

    #[async_trait]
    impl SceneDetector for FailingDetector {
        async fn detect(&self, _video: &Path, _duration: f64) -> MediaResult<Vec<Scene>> {
            Err(crate::error::MediaError::ffmpeg_failed(
                "detector blew up",
                None,
                Some(1),
            ))
        }
    }

    struct SlowDetector;

    #[async_trait]
    impl SceneDetector for SlowDetector {
        async fn detect(&self, _video: &Path, duration: f64) -> MediaResult<Vec<Scene>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![Scene::new(0.0, duration)])
        }
    }

    #[tokio::test]
    async fn test_detector_failure_falls_back_to_partition() {
        let scenes = detect_scenes(
            &FailingDetector,
            Path::new("/nonexistent.mp4"),
            130.0,
            Duration::from_secs(5),
        )
        .await;
        assert_partitions(&scenes, 130.0);
        assert_eq!(scenes.len(), 13);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detector_timeout_falls_back_to_partition() {
        let scenes = detect_scenes(
            &SlowDetector,
            Path::new("/nonexistent.mp4"),
            50.0,
            Duration::from_secs(1),
        )
        .await;
        assert_partitions(&scenes, 50.0);
        assert_eq!(scenes.len(), 5);
    }
}
