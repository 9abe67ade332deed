//! Key layout and content-type helpers for rendered clips.

use std::path::Path;

use crate::client::ObjectStore;
use crate::error::StorageResult;

/// Storage key for a rendered clip.
///
/// Keys are scoped by (user, content, analysis) so concurrent runs and
/// renders never collide.
pub fn clip_key(user_id: &str, content_id: &str, analysis_id: &str, filename: &str) -> String {
    format!("{}/{}/{}/clips/{}", user_id, content_id, analysis_id, filename)
}

/// Thumbnail key next to a clip key.
pub fn thumbnail_key(clip_key: &str) -> String {
    match clip_key.rsplit_once('.') {
        Some((stem, _)) => format!("{}.jpg", stem),
        None => format!("{}.jpg", clip_key),
    }
}

/// Infer a content type from a filename.
pub fn content_type_for(filename: &str) -> &'static str {
    if filename.ends_with(".mp4") {
        "video/mp4"
    } else if filename.ends_with(".jpg") || filename.ends_with(".jpeg") {
        "image/jpeg"
    } else if filename.ends_with(".srt") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

impl ObjectStore {
    /// Upload a rendered clip, returning its key.
    pub async fn upload_clip(
        &self,
        path: impl AsRef<Path>,
        user_id: &str,
        content_id: &str,
        analysis_id: &str,
        filename: &str,
    ) -> StorageResult<String> {
        let key = clip_key(user_id, content_id, analysis_id, filename);
        self.upload_file(path, &key, content_type_for(filename))
            .await?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_key_layout() {
        assert_eq!(
            clip_key("u1", "c1", "a1", "clip_x_9x16.mp4"),
            "u1/c1/a1/clips/clip_x_9x16.mp4"
        );
    }

    #[test]
    fn test_thumbnail_key() {
        assert_eq!(
            thumbnail_key("u1/c1/a1/clips/clip.mp4"),
            "u1/c1/a1/clips/clip.jpg"
        );
        assert_eq!(thumbnail_key("noext"), "noext.jpg");
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }
}
