//! Timestamp formatting.
//!
//! Clip ranges travel as seconds internally; these helpers produce the
//! `HH:MM:SS` strings logs and subtitle cues expect.

/// Format seconds as `HH:MM:SS` (or `HH:MM:SS.mmm` for fractional input).
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Format seconds as an SRT cue timestamp (`HH:MM:SS,mmm`).
pub fn format_srt(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = (total_secs % 60.0).floor() as u32;
    let millis = ((total_secs - total_secs.floor()) * 1000.0).round() as u32;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis.min(999))
}
