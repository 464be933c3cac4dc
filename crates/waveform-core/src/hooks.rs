//! Seam traits for the upload pipeline.
//!
//! The batch manager talks to the CMS API only through these traits, so the
//! pipeline can run against the real `waveform-api-client` or against mocks
//! in tests. Error strings (not `AppError`) cross these seams: every failure
//! behind them is either surfaced per-item or logged, never fatal.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{PresignedTarget, UploadDescriptor};

/// Issues one-shot presigned upload targets for a batch of descriptors.
///
/// Implementations must return one target per descriptor, in descriptor
/// order, or an error.
#[async_trait]
pub trait PresignedUrlProvider: Send + Sync {
    async fn get_presigned_upload_urls(
        &self,
        entity_type: &str,
        sub_category: &str,
        descriptors: &[UploadDescriptor],
    ) -> Result<Vec<PresignedTarget>, String>;
}

/// Persists the display order of uploaded media items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn persist_order(&self, ordered_ids: &[Uuid]) -> Result<(), String>;
}

/// Deletes a media item on the server (storage object plus database record).
#[async_trait]
pub trait MediaDeleter: Send + Sync {
    async fn delete_media_item(&self, id: Uuid) -> Result<(), String>;
}

/// No-op deleter for batches whose items have no server-side records.
pub struct NoOpMediaDeleter;

#[async_trait]
impl MediaDeleter for NoOpMediaDeleter {
    async fn delete_media_item(&self, _id: Uuid) -> Result<(), String> {
        Ok(())
    }
}
