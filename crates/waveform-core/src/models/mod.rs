//! Domain models

pub mod media_item;
pub mod presigned;

pub use media_item::{ItemPhase, MediaItem, MediaKind};
pub use presigned::{ApiEnvelope, PresignedTarget, UploadDescriptor};
