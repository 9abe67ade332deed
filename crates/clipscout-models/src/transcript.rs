//! Time-coded transcript models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A time-coded span of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds (always > start)
    pub end: f64,
    /// Recognized text
    pub text: String,
    /// Optional word-level tokens
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordToken>,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
        }
    }

    /// Seconds of overlap between this segment and `[start, end]`.
    pub fn overlap(&self, start: f64, end: f64) -> f64 {
        (self.end.min(end) - self.start.max(start)).max(0.0)
    }
}

/// A single recognized word with its own timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WordToken {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let seg = TranscriptSegment::new(2.0, 8.0, "hello");
        assert_eq!(seg.overlap(0.0, 10.0), 6.0);
        assert_eq!(seg.overlap(5.0, 6.0), 1.0);
        assert_eq!(seg.overlap(8.0, 12.0), 0.0);
        assert_eq!(seg.overlap(0.0, 1.0), 0.0);
    }
}
