//! Waveform Uploader
//!
//! Client-side pipeline for direct-to-object-storage media uploads: a batch
//! lifecycle manager over per-item state machines, a direct PUT uploader
//! against presigned URLs, and reorder/delete reconciliation against the CMS
//! API. Bytes never pass through the application server; only presigned
//! issuance, order persistence, and deletion do.

pub mod batch;
pub mod dedup;
pub mod direct;
mod progress;
mod reconcile;

pub use batch::{AddOutcome, CandidateFile, ItemProgressEvent, MediaBatch};
pub use dedup::{dedup_key, UploadPlan};
pub use direct::{BatchProgressSink, DirectUploader, ItemProgressSink, UploadOutcome};

// Re-export core types callers need alongside the pipeline
pub use waveform_core::{
    AppError, ItemPhase, MediaDeleter, MediaItem, MediaKind, NoOpMediaDeleter, OrderStore,
    PresignedTarget, PresignedUrlProvider, UploadDescriptor, UploadRules,
};
