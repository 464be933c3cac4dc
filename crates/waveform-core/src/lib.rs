//! Waveform Core Library
//!
//! This crate provides core domain models, error types, configuration, and
//! validation that are shared across all Waveform pipeline components.

pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::UploadRules;
pub use error::AppError;
pub use hooks::{MediaDeleter, NoOpMediaDeleter, OrderStore, PresignedUrlProvider};
pub use models::{
    ApiEnvelope, ItemPhase, MediaItem, MediaKind, PresignedTarget, UploadDescriptor,
};
pub use validation::{validate_file, FileRejection};
