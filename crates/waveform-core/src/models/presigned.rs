//! Wire models for presigned upload issuance.
//!
//! These types match the CMS API contract, which uses camelCase field names
//! on the wire.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One file's descriptor, sent to the presigned-URL issuer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    /// Original filename
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    /// Content type (MIME type)
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
    /// File size in bytes
    #[validate(range(min = 1, message = "File size must be at least 1 byte"))]
    pub file_size: u64,
}

/// One-shot upload target returned by the issuer.
///
/// `upload_url` is a time-limited PUT URL and is never reused; a retried
/// upload must request a fresh target. `cdn_url` is the public read URL the
/// object will have once uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedTarget {
    pub upload_url: String,
    pub storage_key: String,
    pub cdn_url: String,
}

/// Standard CMS API response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let descriptor = UploadDescriptor {
            file_name: "cover.png".to_string(),
            content_type: "image/png".to_string(),
            file_size: 1024,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["fileName"], "cover.png");
        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["fileSize"], 1024);
    }

    #[test]
    fn test_descriptor_rejects_empty_filename() {
        let descriptor = UploadDescriptor {
            file_name: String::new(),
            content_type: "image/png".to_string(),
            file_size: 1024,
        };
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_descriptor_rejects_zero_size() {
        let descriptor = UploadDescriptor {
            file_name: "cover.png".to_string(),
            content_type: "image/png".to_string(),
            file_size: 0,
        };
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_envelope_failure_without_data() {
        let envelope: ApiEnvelope<Vec<PresignedTarget>> =
            serde_json::from_str(r#"{"success":false,"error":"nope"}"#).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_envelope_success_with_targets() {
        let body = r#"{
            "success": true,
            "data": [{
                "uploadUrl": "https://bucket.example/put?sig=abc",
                "storageKey": "releases/coverart/cover.png",
                "cdnUrl": "https://cdn.example/releases/coverart/cover.png"
            }]
        }"#;
        let envelope: ApiEnvelope<Vec<PresignedTarget>> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let targets = envelope.data.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].storage_key, "releases/coverart/cover.png");
    }
}
