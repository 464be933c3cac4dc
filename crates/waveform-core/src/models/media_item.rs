//! Client-held media item lifecycle record.
//!
//! A `MediaItem` tracks one selected file from selection through validation,
//! upload, and removal. Phase is derived from field state rather than stored,
//! so an item can never report two terminal states at once: the transition
//! methods clear the opposing terminal field before setting the new one.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::presigned::UploadDescriptor;

/// Media kind, derived from the MIME type's top-level type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.trim().to_lowercase();
        if ct.starts_with("image/") {
            Some(MediaKind::Image)
        } else if ct.starts_with("audio/") {
            Some(MediaKind::Audio)
        } else if ct.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Lifecycle phase of a media item.
///
/// `Idle` is transient (constructed but not yet validated). `Invalid`,
/// `Uploaded`, and `Failed` are terminal; a failed file is retried by
/// removing it and selecting it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPhase {
    Idle,
    Invalid,
    Ready,
    Uploading,
    Uploaded,
    Failed,
}

/// One file's full upload lifecycle record.
#[derive(Debug, Clone)]
pub struct MediaItem {
    /// Locally generated identity, stable for the session.
    pub id: Uuid,
    /// Raw file payload; present only until the upload completes.
    file: Option<Bytes>,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    pub kind: Option<MediaKind>,
    /// Playback duration in seconds, when known (audio/video).
    pub duration: Option<f64>,
    upload_progress: u8,
    is_uploading: bool,
    validated: bool,
    uploaded_url: Option<String>,
    storage_key: Option<String>,
    error: Option<String>,
    /// Persisted position; meaningful only once the item is uploaded.
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        file: Bytes,
        duration: Option<f64>,
    ) -> Self {
        let content_type = content_type.into();
        let file_size = file.len() as u64;
        Self {
            id: Uuid::new_v4(),
            kind: MediaKind::from_content_type(&content_type),
            file: Some(file),
            file_name: file_name.into(),
            file_size,
            content_type,
            duration,
            upload_progress: 0,
            is_uploading: false,
            validated: false,
            uploaded_url: None,
            storage_key: None,
            error: None,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    /// Descriptor for the presigned-URL issuer.
    pub fn descriptor(&self) -> UploadDescriptor {
        UploadDescriptor {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            file_size: self.file_size,
        }
    }

    pub fn phase(&self) -> ItemPhase {
        if self.is_uploading {
            ItemPhase::Uploading
        } else if self.uploaded_url.is_some() {
            ItemPhase::Uploaded
        } else if self.error.is_some() {
            if self.validated {
                ItemPhase::Failed
            } else {
                ItemPhase::Invalid
            }
        } else if self.validated {
            ItemPhase::Ready
        } else {
            ItemPhase::Idle
        }
    }

    /// Whether this item should be included in the next upload run.
    pub fn is_ready(&self) -> bool {
        self.phase() == ItemPhase::Ready && self.file.is_some()
    }

    pub fn mark_valid(&mut self) {
        self.validated = true;
    }

    /// Validation rejection: terminal, never uploaded.
    pub fn mark_invalid(&mut self, message: impl Into<String>) {
        self.validated = false;
        self.error = Some(message.into());
    }

    pub fn begin_upload(&mut self) {
        if self.is_ready() {
            self.is_uploading = true;
            self.upload_progress = 0;
        }
    }

    pub fn set_progress(&mut self, percent: u8) {
        if self.is_uploading {
            self.upload_progress = percent.min(100);
        }
    }

    /// Successful upload: the file payload is released, only the remote
    /// URLs remain.
    pub fn complete_upload(&mut self, storage_key: impl Into<String>, cdn_url: impl Into<String>) {
        self.is_uploading = false;
        self.error = None;
        self.upload_progress = 100;
        self.storage_key = Some(storage_key.into());
        self.uploaded_url = Some(cdn_url.into());
        self.file = None;
    }

    pub fn fail_upload(&mut self, message: impl Into<String>) {
        self.is_uploading = false;
        self.uploaded_url = None;
        self.storage_key = None;
        self.error = Some(message.into());
    }

    /// Drop the local file payload (the in-memory preview resource).
    pub fn release_file(&mut self) {
        self.file = None;
    }

    pub fn file(&self) -> Option<&Bytes> {
        self.file.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    pub fn upload_progress(&self) -> u8 {
        self.upload_progress
    }

    pub fn uploaded_url(&self) -> Option<&str> {
        self.uploaded_url.as_deref()
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
