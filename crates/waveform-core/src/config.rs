//! Configuration module
//!
//! This module provides the upload rule configuration used by batch
//! uploaders: accepted content types, maximum file size, and batch capacity.
//! Defaults match the label CMS conventions (web images at 5 MB, audio and
//! video at 100 MB, ten items per batch); environment variables override.

use std::env;

// Common constants
const MAX_IMAGE_SIZE_MB: u64 = 5;
const MAX_AUDIO_SIZE_MB: u64 = 100;
const MAX_VIDEO_SIZE_MB: u64 = 100;
const MAX_BATCH_ITEMS: usize = 10;

/// Upload rules enforced by a batch uploader instance.
///
/// `allowed_content_types` entries are lowercase MIME types; a trailing
/// `/*` wildcard accepts the whole top-level type (e.g. `audio/*`).
#[derive(Clone, Debug)]
pub struct UploadRules {
    pub allowed_content_types: Vec<String>,
    pub max_file_size_bytes: u64,
    pub max_files: usize,
}

impl UploadRules {
    /// Rules for cover art and other web images.
    pub fn images() -> Self {
        Self {
            allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
            max_file_size_bytes: MAX_IMAGE_SIZE_MB * 1024 * 1024,
            max_files: MAX_BATCH_ITEMS,
        }
    }

    /// Rules for audio masters and previews.
    pub fn audio() -> Self {
        Self {
            allowed_content_types: vec![
                "audio/mpeg".to_string(),
                "audio/mp4".to_string(),
                "audio/wav".to_string(),
                "audio/x-wav".to_string(),
                "audio/flac".to_string(),
                "audio/ogg".to_string(),
            ],
            max_file_size_bytes: MAX_AUDIO_SIZE_MB * 1024 * 1024,
            max_files: MAX_BATCH_ITEMS,
        }
    }

    /// Rules for video content.
    pub fn video() -> Self {
        Self {
            allowed_content_types: vec![
                "video/mp4".to_string(),
                "video/quicktime".to_string(),
                "video/webm".to_string(),
                "video/x-matroska".to_string(),
            ],
            max_file_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            max_files: MAX_BATCH_ITEMS,
        }
    }

    /// Combined rules for mixed audio/video uploaders.
    pub fn audio_video() -> Self {
        let audio = Self::audio();
        let video = Self::video();
        let mut allowed = audio.allowed_content_types;
        allowed.extend(video.allowed_content_types);
        Self {
            allowed_content_types: allowed,
            max_file_size_bytes: audio.max_file_size_bytes.max(video.max_file_size_bytes),
            max_files: MAX_BATCH_ITEMS,
        }
    }

    /// Apply environment overrides on top of these rules.
    ///
    /// `WAVEFORM_ALLOWED_CONTENT_TYPES` is a comma-separated list;
    /// `WAVEFORM_MAX_FILE_SIZE_MB` and `WAVEFORM_MAX_FILES` must parse as
    /// numbers or the defaults are kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(types) = env::var("WAVEFORM_ALLOWED_CONTENT_TYPES") {
            let parsed: Vec<String> = types
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                self.allowed_content_types = parsed;
            }
        }

        self.max_file_size_bytes = env::var("WAVEFORM_MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(self.max_file_size_bytes);

        self.max_files = env::var("WAVEFORM_MAX_FILES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(self.max_files);

        self
    }

    /// Check a MIME type against the allowlist (case-insensitive, with
    /// `type/*` wildcard support).
    pub fn allows_content_type(&self, content_type: &str) -> bool {
        let ct = content_type.trim().to_lowercase();
        self.allowed_content_types.iter().any(|allowed| {
            if let Some(prefix) = allowed.strip_suffix("/*") {
                ct.starts_with(prefix) && ct.get(prefix.len()..prefix.len() + 1) == Some("/")
            } else {
                allowed == &ct
            }
        })
    }

    /// Size limit in whole megabytes, for user-facing messages.
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_bytes / (1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_defaults() {
        let rules = UploadRules::images();
        assert_eq!(rules.max_file_size_bytes, 5 * 1024 * 1024);
        assert_eq!(rules.max_files, 10);
        assert!(rules.allows_content_type("image/jpeg"));
        assert!(!rules.allows_content_type("image/tiff"));
    }

    #[test]
    fn test_allows_content_type_is_case_insensitive() {
        let rules = UploadRules::images();
        assert!(rules.allows_content_type("IMAGE/PNG"));
        assert!(rules.allows_content_type(" image/webp "));
    }

    #[test]
    fn test_wildcard_allowlist() {
        let rules = UploadRules {
            allowed_content_types: vec!["audio/*".to_string()],
            max_file_size_bytes: 100 * 1024 * 1024,
            max_files: 10,
        };
        assert!(rules.allows_content_type("audio/flac"));
        assert!(!rules.allows_content_type("video/mp4"));
        // "audio" alone is not a full MIME type
        assert!(!rules.allows_content_type("audio"));
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("WAVEFORM_MAX_FILE_SIZE_MB", "2");
        env::set_var("WAVEFORM_MAX_FILES", "4");
        env::set_var("WAVEFORM_ALLOWED_CONTENT_TYPES", "image/png, image/webp");

        let rules = UploadRules::images().with_env_overrides();
        assert_eq!(rules.max_file_size_bytes, 2 * 1024 * 1024);
        assert_eq!(rules.max_files, 4);
        assert_eq!(
            rules.allowed_content_types,
            vec!["image/png".to_string(), "image/webp".to_string()]
        );

        env::remove_var("WAVEFORM_MAX_FILE_SIZE_MB");
        env::remove_var("WAVEFORM_MAX_FILES");
        env::remove_var("WAVEFORM_ALLOWED_CONTENT_TYPES");
    }

    #[test]
    fn test_audio_video_takes_larger_limit() {
        let rules = UploadRules::audio_video();
        assert_eq!(rules.max_file_size_bytes, 100 * 1024 * 1024);
        assert!(rules.allows_content_type("audio/flac"));
        assert!(rules.allows_content_type("video/mp4"));
    }
}
