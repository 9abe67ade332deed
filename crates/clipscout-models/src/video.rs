//! Probed video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Technical metadata extracted from a video container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub frame_rate: f64,
    /// Whether the container has at least one audio stream
    pub has_audio: bool,
    /// File size in bytes
    pub file_size: u64,
    /// Derived `width:height` aspect ratio string (e.g. "16:9")
    pub aspect_ratio: String,
}

impl VideoMetadata {
    /// Build metadata, deriving the aspect ratio from the dimensions.
    pub fn new(
        duration: f64,
        width: u32,
        height: u32,
        frame_rate: f64,
        has_audio: bool,
        file_size: u64,
    ) -> Self {
        Self {
            duration,
            width,
            height,
            frame_rate,
            has_audio,
            file_size,
            aspect_ratio: derive_aspect_ratio(width, height),
        }
    }

    /// True when the frame is taller than it is wide.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// Reduce `width:height` to its simplest ratio string.
pub fn derive_aspect_ratio(width: u32, height: u32) -> String {
    if width == 0 || height == 0 {
        return format!("{}:{}", width, height);
    }
    let d = gcd(width, height);
    format!("{}:{}", width / d, height / d)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_derivation() {
        assert_eq!(derive_aspect_ratio(1920, 1080), "16:9");
        assert_eq!(derive_aspect_ratio(1080, 1920), "9:16");
        assert_eq!(derive_aspect_ratio(640, 480), "4:3");
        assert_eq!(derive_aspect_ratio(0, 1080), "0:1080");
    }

    #[test]
    fn test_metadata_new() {
        let meta = VideoMetadata::new(130.0, 1920, 1080, 29.97, true, 1024);
        assert_eq!(meta.aspect_ratio, "16:9");
        assert!(!meta.is_portrait());
        assert!(meta.has_audio);
    }
}
