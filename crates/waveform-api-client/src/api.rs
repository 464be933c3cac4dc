//! Domain methods for the CMS API client.
//!
//! All endpoints speak the standard `{success, data?, error?}` envelope with
//! camelCase field names. The seam traits from `waveform_core::hooks` are
//! implemented here so the upload pipeline can use an `ApiClient` directly.

use crate::{api_prefix, ApiClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;
use waveform_core::hooks::{MediaDeleter, OrderStore, PresignedUrlProvider};
use waveform_core::models::{ApiEnvelope, PresignedTarget, UploadDescriptor};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignedUrlsRequest<'a> {
    entity_type: &'a str,
    sub_category: &'a str,
    files: &'a [UploadDescriptor],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistOrderRequest<'a> {
    ordered_ids: &'a [Uuid],
}

impl ApiClient {
    /// Request one presigned upload target per descriptor.
    ///
    /// A `success: false` envelope or an empty `data` array are both
    /// failures; callers must not attempt any upload in that case.
    pub async fn get_presigned_upload_urls(
        &self,
        entity_type: &str,
        sub_category: &str,
        descriptors: &[UploadDescriptor],
    ) -> Result<Vec<PresignedTarget>> {
        if descriptors.is_empty() {
            return Err(anyhow::anyhow!("No files to request upload URLs for"));
        }
        for descriptor in descriptors {
            descriptor
                .validate()
                .with_context(|| format!("Invalid upload descriptor: {}", descriptor.file_name))?;
        }

        let request = PresignedUrlsRequest {
            entity_type,
            sub_category,
            files: descriptors,
        };
        let envelope: ApiEnvelope<Vec<PresignedTarget>> = self
            .post_json(&format!("{}/media/upload-urls", api_prefix()), &request)
            .await?;

        if !envelope.success {
            return Err(anyhow::anyhow!(envelope
                .error
                .unwrap_or_else(|| "Failed to get upload URL".to_string())));
        }
        let targets = match envelope.data {
            Some(targets) if !targets.is_empty() => targets,
            _ => return Err(anyhow::anyhow!("Failed to get upload URL")),
        };
        if targets.len() != descriptors.len() {
            return Err(anyhow::anyhow!(
                "Expected {} upload URLs, received {}",
                descriptors.len(),
                targets.len()
            ));
        }

        Ok(targets)
    }

    /// Persist the display order of uploaded media items.
    pub async fn persist_order(&self, ordered_ids: &[Uuid]) -> Result<()> {
        let request = PersistOrderRequest { ordered_ids };
        let envelope: ApiEnvelope<serde_json::Value> = self
            .post_json(&format!("{}/media/order", api_prefix()), &request)
            .await?;

        if !envelope.success {
            return Err(anyhow::anyhow!(envelope
                .error
                .unwrap_or_else(|| "Failed to persist media order".to_string())));
        }
        Ok(())
    }

    /// Delete a media item on the server (storage object and database record).
    pub async fn delete_media_item(&self, id: Uuid) -> Result<()> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .delete_json(&format!("{}/media/{}", api_prefix(), id))
            .await?;

        if !envelope.success {
            return Err(anyhow::anyhow!(envelope
                .error
                .unwrap_or_else(|| "Failed to delete media item".to_string())));
        }
        Ok(())
    }
}

#[async_trait]
impl PresignedUrlProvider for ApiClient {
    async fn get_presigned_upload_urls(
        &self,
        entity_type: &str,
        sub_category: &str,
        descriptors: &[UploadDescriptor],
    ) -> std::result::Result<Vec<PresignedTarget>, String> {
        ApiClient::get_presigned_upload_urls(self, entity_type, sub_category, descriptors)
            .await
            .map_err(|e| format!("{:#}", e))
    }
}

#[async_trait]
impl OrderStore for ApiClient {
    async fn persist_order(&self, ordered_ids: &[Uuid]) -> std::result::Result<(), String> {
        ApiClient::persist_order(self, ordered_ids)
            .await
            .map_err(|e| format!("{:#}", e))
    }
}

#[async_trait]
impl MediaDeleter for ApiClient {
    async fn delete_media_item(&self, id: Uuid) -> std::result::Result<(), String> {
        ApiClient::delete_media_item(self, id)
            .await
            .map_err(|e| format!("{:#}", e))
    }
}
