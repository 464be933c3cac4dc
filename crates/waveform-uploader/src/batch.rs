//! Batch lifecycle manager.
//!
//! A `MediaBatch` owns the ordered collection of media items one uploader
//! instance displays. Files are validated on entry, capped by batch capacity,
//! and uploaded concurrently on demand; reorder and delete reconciliation
//! live in [`crate::reconcile`].

use bytes::Bytes;
use std::sync::Arc;
use uuid::Uuid;
use waveform_core::{
    validate_file, AppError, MediaItem, PresignedUrlProvider, UploadRules,
};

use crate::direct::{BatchProgressSink, DirectUploader};

/// Per-item progress events keyed by item id.
pub type ItemProgressEvent = Arc<dyn Fn(Uuid, u8) + Send + Sync>;

/// One file offered to the batch (a selected or dropped file).
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
    /// Playback duration in seconds, when the caller has probed it.
    pub duration: Option<f64>,
}

/// What happened to a set of offered files.
///
/// `rejected` files occupy a batch slot with an inline error; `dropped`
/// files exceeded capacity and were discarded silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub rejected: usize,
    pub dropped: usize,
}

/// Ordered collection of media items for one uploader instance.
pub struct MediaBatch {
    pub(crate) entity_type: String,
    pub(crate) sub_category: String,
    pub(crate) rules: UploadRules,
    pub(crate) items: Vec<MediaItem>,
    pub(crate) busy: bool,
    pub(crate) pending_delete: Option<Uuid>,
}

impl MediaBatch {
    pub fn new(
        entity_type: impl Into<String>,
        sub_category: impl Into<String>,
        rules: UploadRules,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            sub_category: sub_category.into(),
            rules,
            items: Vec::new(),
            busy: false,
            pending_delete: None,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Capacity reached; further files will be dropped.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.rules.max_files
    }

    pub fn remaining_capacity(&self) -> usize {
        self.rules.max_files.saturating_sub(self.items.len())
    }

    /// A reorder or delete reconciliation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn pending_delete(&self) -> Option<Uuid> {
        self.pending_delete
    }

    /// Validate and admit offered files.
    ///
    /// Invalid files still take a slot so the rejection is visible inline;
    /// files beyond remaining capacity are dropped without queueing.
    pub fn add_files(&mut self, candidates: Vec<CandidateFile>) -> AddOutcome {
        let mut outcome = AddOutcome::default();

        for candidate in candidates {
            if self.is_full() {
                tracing::debug!(file_name = %candidate.file_name, "batch full, dropping file");
                outcome.dropped += 1;
                continue;
            }

            let mut item = MediaItem::new(
                candidate.file_name,
                candidate.content_type,
                candidate.bytes,
                candidate.duration,
            );
            match validate_file(&item.descriptor(), &self.rules) {
                Ok(()) => {
                    item.mark_valid();
                    outcome.added += 1;
                }
                Err(rejection) => {
                    tracing::debug!(
                        file_name = %item.file_name,
                        reason = %rejection,
                        "rejected file at selection"
                    );
                    item.mark_invalid(rejection.message());
                    outcome.rejected += 1;
                }
            }
            item.sort_order = self.items.len() as i32;
            self.items.push(item);
        }

        outcome
    }

    /// Reflect an externally observed progress event onto an item.
    pub fn apply_progress(&mut self, id: Uuid, percent: u8) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.set_progress(percent);
        }
    }

    /// Upload every item currently in the ready state.
    ///
    /// Items that are already uploaded, invalid, or failed are left
    /// untouched. One item's failure never halts or rolls back the others;
    /// issuer failure marks the selected items failed and returns normally.
    #[tracing::instrument(
        skip(self, provider, uploader, progress),
        fields(entity_type = %self.entity_type, sub_category = %self.sub_category)
    )]
    pub async fn start_upload(
        &mut self,
        provider: &dyn PresignedUrlProvider,
        uploader: &DirectUploader,
        progress: Option<ItemProgressEvent>,
    ) -> Result<(), AppError> {
        let ready: Vec<usize> = (0..self.items.len())
            .filter(|&i| self.items[i].is_ready())
            .collect();
        if ready.is_empty() {
            tracing::debug!("no items ready to upload");
            return Ok(());
        }

        let descriptors: Vec<_> = ready.iter().map(|&i| self.items[i].descriptor()).collect();
        let targets = match provider
            .get_presigned_upload_urls(&self.entity_type, &self.sub_category, &descriptors)
            .await
        {
            Ok(targets) if targets.len() == ready.len() => targets,
            Ok(targets) => {
                tracing::warn!(
                    expected = ready.len(),
                    received = targets.len(),
                    "issuer returned wrong number of targets"
                );
                for &i in &ready {
                    self.items[i].fail_upload("Failed to get upload URL");
                }
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(error = %err, "presigned URL issuance failed");
                for &i in &ready {
                    self.items[i].fail_upload("Failed to get upload URL");
                }
                return Ok(());
            }
        };

        let ids: Vec<Uuid> = ready.iter().map(|&i| self.items[i].id).collect();
        let files: Vec<(Bytes, String)> = ready
            .iter()
            .map(|&i| {
                let item = &self.items[i];
                (
                    item.file().cloned().unwrap_or_default(),
                    item.content_type.clone(),
                )
            })
            .collect();
        for &i in &ready {
            self.items[i].begin_upload();
        }

        let batch_progress: Option<BatchProgressSink> = progress.map(|sink| {
            let ids = ids.clone();
            Arc::new(move |index: usize, pct: u8| {
                if let Some(id) = ids.get(index) {
                    sink(*id, pct);
                }
            }) as BatchProgressSink
        });

        let outcomes = uploader.upload_many(&files, &targets, batch_progress).await?;

        for (&i, outcome) in ready.iter().zip(&outcomes) {
            if outcome.success {
                tracing::info!(
                    media_id = %self.items[i].id,
                    storage_key = %outcome.storage_key,
                    "upload completed"
                );
                self.items[i]
                    .complete_upload(outcome.storage_key.clone(), outcome.cdn_url.clone());
            } else {
                let message = outcome
                    .error
                    .clone()
                    .unwrap_or_else(|| "Upload failed".to_string());
                tracing::warn!(media_id = %self.items[i].id, error = %message, "upload failed");
                self.items[i].fail_upload(message);
            }
        }

        Ok(())
    }
}
