//! FFmpeg CLI wrapper for video processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and execution with timeouts and
//!   cancellation
//! - Container metadata probing via FFprobe
//! - Audio track extraction for transcription input
//! - Scene boundary detection with a fixed-window fallback
//! - Clip rendering (range extraction, portrait reformat, caption
//!   burn-in) and thumbnail generation

pub mod audio;
pub mod command;
pub mod error;
pub mod probe;
pub mod render;
pub mod scenes;
pub mod thumbnail;

pub use audio::extract_audio;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::probe_video;
pub use render::{render_clip, AspectRatio, RenderSpec};
pub use scenes::{detect_scenes, fallback_scenes, FfmpegSceneDetector, SceneDetector};
pub use thumbnail::generate_thumbnail;
