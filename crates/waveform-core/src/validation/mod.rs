//! File validation against upload rules.
//!
//! Type and size checks are reported separately so a file with a disallowed
//! type gets a type message regardless of its size.

use crate::config::UploadRules;
use crate::models::UploadDescriptor;

/// Why a candidate file was rejected at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRejection {
    UnsupportedType { content_type: String },
    TooLarge { file_size: u64, max_bytes: u64 },
}

impl FileRejection {
    /// Human-readable message shown inline on the rejected item.
    pub fn message(&self) -> String {
        match self {
            FileRejection::UnsupportedType { content_type } => {
                format!("File type \"{}\" is not allowed", content_type)
            }
            FileRejection::TooLarge {
                file_size,
                max_bytes,
            } => {
                format!(
                    "File is too large: {} bytes exceeds the {} MB limit",
                    file_size,
                    max_bytes / (1024 * 1024)
                )
            }
        }
    }
}

impl std::fmt::Display for FileRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Check one candidate file against the batch rules.
pub fn validate_file(
    descriptor: &UploadDescriptor,
    rules: &UploadRules,
) -> Result<(), FileRejection> {
    if !rules.allows_content_type(&descriptor.content_type) {
        return Err(FileRejection::UnsupportedType {
            content_type: descriptor.content_type.clone(),
        });
    }

    if descriptor.file_size > rules.max_file_size_bytes {
        return Err(FileRejection::TooLarge {
            file_size: descriptor.file_size,
            max_bytes: rules.max_file_size_bytes,
        });
    }

    Ok(())
}
