//! Scene and scored-segment models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A contiguous time interval between two detected visual boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scene {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds (always > start)
    pub end: f64,
}

impl Scene {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Scene length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when this scene overlaps `[start, end]` at all.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.end > start
    }
}

/// A scene annotated with its engagement score and the signals behind it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScoredSegment {
    /// The underlying scene
    pub scene: Scene,
    /// Transcript text overlapping the scene
    pub text: String,
    /// Engagement score, always in [0, 100]
    pub score: u8,
    /// Word count of the overlapping text
    pub word_count: usize,
    /// Distinct engagement keywords matched
    pub keyword_matches: usize,
    /// Whether the overlapping text poses a question
    pub has_question: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_duration() {
        let scene = Scene::new(10.0, 45.5);
        assert!((scene.duration() - 35.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scene_overlaps() {
        let scene = Scene::new(10.0, 20.0);
        assert!(scene.overlaps(15.0, 25.0));
        assert!(scene.overlaps(0.0, 11.0));
        assert!(!scene.overlaps(20.0, 30.0));
        assert!(!scene.overlaps(0.0, 10.0));
    }
}
