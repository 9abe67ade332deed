//! Deterministic engagement scoring.
//!
//! `score_segment` is pure: same scene, transcript and metadata always
//! produce the same score, and the result is clamped to [0, 100].

use clipscout_models::{Scene, ScoredSegment, TranscriptSegment, VideoMetadata};

/// Fixed keyword list matched case-insensitively against the
/// overlapping transcript text. Each distinct keyword counts once.
pub const ENGAGEMENT_KEYWORDS: &[&str] = &[
    "amazing",
    "incredible",
    "unbelievable",
    "insane",
    "crazy",
    "shocking",
    "secret",
    "revealed",
    "truth",
    "mistake",
    "wrong",
    "best",
    "worst",
    "never",
    "always",
    "free",
    "easy",
    "hack",
    "trick",
    "watch",
    "wait",
    "important",
];

/// Base score every segment starts from.
const BASE_SCORE: i32 = 50;
/// Bonus for scenes starting in the first five seconds.
const EARLY_HOOK_BONUS: i32 = 20;
/// Bonus for durations in the short-form sweet spot.
const PACING_BONUS: i32 = 15;
/// Penalty for too-short or too-long segments.
const PACING_PENALTY: i32 = 20;
/// Per-keyword bonus.
const KEYWORD_BONUS: i32 = 5;
/// Bonus when the text poses a question.
const QUESTION_BONUS: i32 = 10;
/// Per-exclamation bonus and its cap.
const EXCLAMATION_BONUS: i32 = 3;
const EXCLAMATION_CAP: i32 = 15;
/// Bonus for a speech-dense word count.
const WORD_COUNT_BONUS: i32 = 10;

/// Concatenate transcript text overlapping `[start, end]`.
pub fn overlapping_text(transcript: &[TranscriptSegment], start: f64, end: f64) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in transcript {
        if segment.overlap(start, end) > 0.0 {
            let trimmed = segment.text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
    parts.join(" ")
}

/// Score a scene against the transcript.
pub fn score_segment(
    scene: &Scene,
    transcript: &[TranscriptSegment],
    metadata: &VideoMetadata,
) -> ScoredSegment {
    // Scenes never extend past the probed duration; clamp defensively
    // so a bad detector cannot pull in out-of-range transcript text.
    let window_end = if metadata.duration > 0.0 {
        scene.end.min(metadata.duration)
    } else {
        scene.end
    };
    let text = overlapping_text(transcript, scene.start, window_end);
    let lowered = text.to_lowercase();

    let word_count = text.split_whitespace().count();
    let keyword_matches = ENGAGEMENT_KEYWORDS
        .iter()
        .filter(|k| lowered.contains(*k))
        .count();
    let has_question = text.contains('?');
    let exclamations = text.matches('!').count();

    let mut score = BASE_SCORE;

    if scene.start < 5.0 {
        score += EARLY_HOOK_BONUS;
    }

    let duration = scene.duration();
    if (30.0..=60.0).contains(&duration) {
        score += PACING_BONUS;
    } else if duration < 15.0 || duration > 90.0 {
        score -= PACING_PENALTY;
    }

    score += keyword_matches as i32 * KEYWORD_BONUS;

    if has_question {
        score += QUESTION_BONUS;
    }

    score += (exclamations as i32 * EXCLAMATION_BONUS).min(EXCLAMATION_CAP);

    if (50..=150).contains(&word_count) {
        score += WORD_COUNT_BONUS;
    }

    ScoredSegment {
        scene: *scene,
        text,
        score: score.clamp(0, 100) as u8,
        word_count,
        keyword_matches,
        has_question,
    }
}
