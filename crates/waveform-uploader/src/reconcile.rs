//! Reorder and delete reconciliation.
//!
//! Local state is the source of truth for the current session: reorder and
//! delete mutate the batch immediately and optimistically, then reconcile
//! with the server. A failed persistence call is logged and never rolled
//! back; the recovery path is a follow-up reorder or a reload. Overlapping
//! reconciliations are refused (not queued) via the batch busy flag.

use uuid::Uuid;
use waveform_core::{AppError, MediaDeleter, OrderStore};

use crate::batch::MediaBatch;

impl MediaBatch {
    /// Reassign ascending sort_order to match current positions.
    pub(crate) fn resequence(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.sort_order = index as i32;
        }
    }

    /// Ids of items with a durable server identity, in display order.
    /// Only these are eligible for persisted ordering.
    pub fn ordered_uploaded_ids(&self) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|item| item.uploaded_url().is_some())
            .map(|item| item.id)
            .collect()
    }

    /// Move an item and resequence every sort_order; applied immediately,
    /// before any network confirmation.
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> Result<(), AppError> {
        if self.busy {
            return Err(AppError::BatchBusy);
        }
        if old_index >= self.items.len() {
            return Err(AppError::InvalidInput(format!(
                "No item at index {}",
                old_index
            )));
        }

        let item = self.items.remove(old_index);
        let new_index = new_index.min(self.items.len());
        self.items.insert(new_index, item);
        self.resequence();
        Ok(())
    }

    /// Persist the current order of uploaded items.
    ///
    /// Returns `Ok` even when the store fails: the optimistic local order is
    /// kept and the failure is logged as the side channel. Only the busy
    /// guard produces an error.
    #[tracing::instrument(skip(self, store), fields(entity_type = %self.entity_type))]
    pub async fn persist_reorder(&mut self, store: &dyn OrderStore) -> Result<(), AppError> {
        if self.busy {
            return Err(AppError::BatchBusy);
        }
        let eligible = self.ordered_uploaded_ids();
        if eligible.is_empty() {
            return Ok(());
        }

        self.busy = true;
        let result = store.persist_order(&eligible).await;
        self.busy = false;

        if let Err(err) = result {
            tracing::warn!(
                error = %err,
                count = eligible.len(),
                "failed to persist media order; keeping local order"
            );
        }
        Ok(())
    }

    /// Drag-reorder: optimistic local move, then persistence for the
    /// uploaded subset.
    pub async fn reorder_and_persist(
        &mut self,
        old_index: usize,
        new_index: usize,
        store: &dyn OrderStore,
    ) -> Result<(), AppError> {
        self.reorder(old_index, new_index)?;
        self.persist_reorder(store).await
    }

    /// First step of the two-step delete: arm a confirmation for an item.
    pub fn request_delete(&mut self, id: Uuid) -> Result<(), AppError> {
        if !self.items.iter().any(|item| item.id == id) {
            return Err(AppError::NotFound(format!("No media item {}", id)));
        }
        self.pending_delete = Some(id);
        Ok(())
    }

    /// Abandon the pending confirmation; the collection is untouched and no
    /// server call is made.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Confirm the armed deletion.
    ///
    /// For an uploaded item with a configured deleter, the server delete is
    /// attempted first; its failure is logged and local removal proceeds
    /// regardless (the orphaned server record is cleaned up out-of-band).
    /// Returns the removed item's id, or `None` when nothing was pending.
    #[tracing::instrument(skip(self, deleter), fields(entity_type = %self.entity_type))]
    pub async fn confirm_delete(
        &mut self,
        deleter: Option<&dyn MediaDeleter>,
    ) -> Result<Option<Uuid>, AppError> {
        if self.busy {
            return Err(AppError::BatchBusy);
        }
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };

        self.busy = true;
        if self.items[position].uploaded_url().is_some() {
            if let Some(deleter) = deleter {
                if let Err(err) = deleter.delete_media_item(id).await {
                    tracing::warn!(
                        media_id = %id,
                        error = %err,
                        "server-side delete failed; removing locally anyway"
                    );
                }
            }
        } else {
            // never uploaded: release the local preview payload
            self.items[position].release_file();
        }

        self.items.remove(position);
        self.resequence();
        self.busy = false;

        tracing::info!(media_id = %id, "media item removed");
        Ok(Some(id))
    }
}
