//! Clip candidate selection.
//!
//! Ranks scored segments, trims them into deliverable durations and
//! annotates each candidate with platforms, a reason string and a
//! suggested caption. Extended ranges may overlap a neighboring
//! candidate; overlaps are intentionally left as-is.

use clipscout_models::{ClipCandidate, Platform, ScoredSegment};

/// How many segments are considered for candidacy.
const MAX_CANDIDATES: usize = 20;
/// Raw segment durations outside this band are discarded.
const MIN_RAW_SECS: f64 = 10.0;
const MAX_RAW_SECS: f64 = 120.0;
/// Hard cap on candidate duration, truncating from the segment start.
const MAX_CLIP_SECS: f64 = 60.0;
/// Candidates shorter than this are extended toward the target.
const EXTEND_BELOW_SECS: f64 = 30.0;
const EXTEND_TARGET_SECS: f64 = 45.0;
/// Caption length bound when no sentence break is found early enough.
const CAPTION_MAX_CHARS: usize = 100;

/// Select ranked clip candidates from scored segments.
///
/// `total_duration` bounds extension of short candidates.
pub fn select_clips(scored: &[ScoredSegment], total_duration: f64) -> Vec<ClipCandidate> {
    let mut ranked: Vec<&ScoredSegment> = scored.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(MAX_CANDIDATES);

    let mut candidates = Vec::new();
    for segment in ranked {
        let raw = segment.scene.duration();
        if !(MIN_RAW_SECS..=MAX_RAW_SECS).contains(&raw) {
            continue;
        }

        let start = segment.scene.start;
        let mut end = segment.scene.end.min(start + MAX_CLIP_SECS);

        if end - start < EXTEND_BELOW_SECS {
            let limit = if total_duration > 0.0 {
                total_duration
            } else {
                segment.scene.end
            };
            end = end.max((start + EXTEND_TARGET_SECS).min(limit));
        }

        let duration = end - start;
        let candidate = ClipCandidate::new(start, end, segment.score)
            .with_reason(build_reason(segment))
            .with_platforms(platforms_for(duration))
            .with_caption(suggest_caption(&segment.text));
        candidates.push(candidate);
    }

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// Suggested platforms for a final clip duration.
pub fn platforms_for(duration: f64) -> Vec<Platform> {
    let mut platforms = Vec::new();
    if duration <= 60.0 {
        platforms.extend([
            Platform::Tiktok,
            Platform::InstagramReels,
            Platform::YoutubeShorts,
        ]);
    }
    if duration <= 90.0 {
        platforms.push(Platform::Twitter);
    }
    if duration > 30.0 {
        platforms.push(Platform::Linkedin);
    }
    platforms
}

/// Human-readable explanation of which score contributors fired.
fn build_reason(segment: &ScoredSegment) -> String {
    let mut parts: Vec<String> = Vec::new();

    if segment.scene.start < 5.0 {
        parts.push("strong opening hook".to_string());
    }
    if segment.has_question {
        parts.push("poses a question".to_string());
    }
    if segment.keyword_matches > 0 {
        let plural = if segment.keyword_matches == 1 { "" } else { "s" };
        parts.push(format!(
            "{} engagement keyword{}",
            segment.keyword_matches, plural
        ));
    }
    let duration = segment.scene.duration();
    if (30.0..=60.0).contains(&duration) {
        parts.push("well-paced length".to_string());
    }

    let summary = if parts.is_empty() {
        "steady segment".to_string()
    } else {
        parts.join(", ")
    };

    if segment.score >= 80 {
        format!("High viral potential: {}", summary)
    } else {
        format!("Worth a look: {}", summary)
    }
}

/// First sentence of the overlap text, or its first ~100 characters.
fn suggest_caption(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let sentence_end = trimmed
        .char_indices()
        .find(|(_, c)| matches!(c, '.' | '!' | '?'))
        .map(|(i, c)| i + c.len_utf8());

    let candidate = match sentence_end {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };

    if candidate.chars().count() <= CAPTION_MAX_CHARS {
        return candidate.trim().to_string();
    }
    candidate
        .chars()
        .take(CAPTION_MAX_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}
