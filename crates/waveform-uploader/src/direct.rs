//! Direct-to-storage uploader.
//!
//! Uploads raw file bytes straight to a presigned URL with a single PUT; the
//! application server never sees the payload. Per-item failures are carried
//! in the returned [`UploadOutcome`], never thrown: partial failure across a
//! batch is a normal result, not an error. The only fatal condition is a
//! files/targets length mismatch, which is rejected before any network call.

use bytes::Bytes;
use futures::future::join_all;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::sync::Arc;
use waveform_core::{AppError, PresignedTarget};

use crate::progress::{chunked_body, DEFAULT_CHUNK_SIZE};

/// Per-item progress sink (0-100).
pub type ItemProgressSink = Arc<dyn Fn(u8) + Send + Sync>;

/// Batch progress sink: (input index, 0-100).
pub type BatchProgressSink = Arc<dyn Fn(usize, u8) + Send + Sync>;

/// Result of one direct upload.
///
/// `storage_key` and `cdn_url` are populated from the target even on
/// failure, so callers can still display the intended destination.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub success: bool,
    pub storage_key: String,
    pub cdn_url: String,
    pub error: Option<String>,
}

impl UploadOutcome {
    fn ok(target: &PresignedTarget) -> Self {
        Self {
            success: true,
            storage_key: target.storage_key.clone(),
            cdn_url: target.cdn_url.clone(),
            error: None,
        }
    }

    fn failed(target: &PresignedTarget, error: String) -> Self {
        Self {
            success: false,
            storage_key: target.storage_key.clone(),
            cdn_url: target.cdn_url.clone(),
            error: Some(error),
        }
    }
}

/// Extract a displayable message from a transport error.
pub(crate) fn transport_error_message(err: &dyn std::error::Error) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        "Upload failed".to_string()
    } else {
        message
    }
}

/// Compose the error string for a rejected PUT.
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    let mut message = format!(
        "Upload failed: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    if !body.is_empty() {
        message.push_str(" - ");
        message.push_str(body);
    }
    message
}

/// Uploader for presigned PUT targets.
#[derive(Clone, Debug)]
pub struct DirectUploader {
    client: reqwest::Client,
    chunk_size: usize,
    verify_readback: bool,
}

impl Default for DirectUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectUploader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify_readback: false,
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify_readback: false,
        }
    }

    /// Enable a best-effort read-back of the CDN URL after each successful
    /// upload. A failed read-back logs a warning and never downgrades the
    /// upload to a failure.
    pub fn verify_readback(mut self, enabled: bool) -> Self {
        self.verify_readback = enabled;
        self
    }

    /// PUT one file to its presigned target.
    pub async fn upload_one(
        &self,
        file: Bytes,
        content_type: &str,
        target: &PresignedTarget,
        progress: Option<ItemProgressSink>,
    ) -> UploadOutcome {
        let total = file.len() as u64;
        let body = chunked_body(file, self.chunk_size, progress.clone());

        let result = self
            .client
            .put(&target.upload_url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                if let Some(progress) = &progress {
                    progress(100);
                }
                if self.verify_readback {
                    self.check_cdn_readback(&target.cdn_url).await;
                }
                UploadOutcome::ok(target)
            }
            Ok(response) => {
                let status = response.status();
                let body_text = response.text().await.unwrap_or_default();
                UploadOutcome::failed(target, rejection_message(status, &body_text))
            }
            Err(err) => UploadOutcome::failed(target, transport_error_message(&err)),
        }
    }

    /// PUT all files to their targets concurrently.
    ///
    /// Fails fast with [`AppError::LengthMismatch`] before any network call
    /// when the slices disagree; otherwise returns one outcome per input
    /// pair, in input order, whatever the individual results.
    pub async fn upload_many(
        &self,
        files: &[(Bytes, String)],
        targets: &[PresignedTarget],
        progress: Option<BatchProgressSink>,
    ) -> Result<Vec<UploadOutcome>, AppError> {
        if files.len() != targets.len() {
            return Err(AppError::LengthMismatch {
                files: files.len(),
                targets: targets.len(),
            });
        }

        let uploads = files
            .iter()
            .zip(targets)
            .enumerate()
            .map(|(index, ((bytes, content_type), target))| {
                let per_item: Option<ItemProgressSink> = progress.clone().map(|sink| {
                    Arc::new(move |pct: u8| sink(index, pct)) as ItemProgressSink
                });
                self.upload_one(bytes.clone(), content_type, target, per_item)
            });

        Ok(join_all(uploads).await)
    }

    /// Best-effort CDN availability probe; warn-only by contract.
    async fn check_cdn_readback(&self, cdn_url: &str) {
        match self.client.get(cdn_url).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(
                    cdn_url = %cdn_url,
                    status = response.status().as_u16(),
                    "CDN read-back check failed"
                );
            }
            Err(err) => {
                tracing::warn!(cdn_url = %cdn_url, error = %err, "CDN read-back check failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn target(server_url: &str, path: &str) -> PresignedTarget {
        PresignedTarget {
            upload_url: format!("{}{}", server_url, path),
            storage_key: format!("releases{}", path),
            cdn_url: format!("https://cdn.example{}", path),
        }
    }

    #[tokio::test]
    async fn test_upload_one_success_sends_raw_body_and_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/coverart/cover.png")
            .match_header("content-type", "image/png")
            .match_body("fake png bytes")
            .with_status(200)
            .create_async()
            .await;

        let reported: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let reported = reported.clone();
            Arc::new(move |pct: u8| reported.lock().unwrap().push(pct)) as ItemProgressSink
        };

        let uploader = DirectUploader::new();
        let target = target(&server.url(), "/coverart/cover.png");
        let outcome = uploader
            .upload_one(
                Bytes::from_static(b"fake png bytes"),
                "image/png",
                &target,
                Some(sink),
            )
            .await;

        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.storage_key, "releases/coverart/cover.png");
        assert_eq!(outcome.cdn_url, "https://cdn.example/coverart/cover.png");
        assert_eq!(reported.lock().unwrap().last(), Some(&100));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_one_non_2xx_composes_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/coverart/cover.png")
            .with_status(403)
            .with_body("Access Denied")
            .create_async()
            .await;

        let uploader = DirectUploader::new();
        let target = target(&server.url(), "/coverart/cover.png");
        let outcome = uploader
            .upload_one(Bytes::from_static(b"x"), "image/png", &target, None)
            .await;

        assert!(!outcome.success);
        let error = outcome.error.unwrap();
        assert!(error.contains("403"), "error was: {}", error);
        assert!(error.contains("Access Denied"), "error was: {}", error);
        // destination still reported on failure
        assert_eq!(outcome.storage_key, "releases/coverart/cover.png");
        assert_eq!(outcome.cdn_url, "https://cdn.example/coverart/cover.png");
    }

    #[tokio::test]
    async fn test_upload_one_non_2xx_without_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/a")
            .with_status(500)
            .create_async()
            .await;

        let uploader = DirectUploader::new();
        let outcome = uploader
            .upload_one(
                Bytes::from_static(b"x"),
                "audio/mpeg",
                &target(&server.url(), "/a"),
                None,
            )
            .await;

        assert_eq!(
            outcome.error.as_deref(),
            Some("Upload failed: 500 Internal Server Error")
        );
    }

    #[tokio::test]
    async fn test_upload_one_transport_failure_is_captured() {
        // nothing listens here; connection is refused
        let target = PresignedTarget {
            upload_url: "http://127.0.0.1:1/unreachable".to_string(),
            storage_key: "releases/unreachable".to_string(),
            cdn_url: "https://cdn.example/unreachable".to_string(),
        };

        let uploader = DirectUploader::new();
        let outcome = uploader
            .upload_one(Bytes::from_static(b"x"), "audio/mpeg", &target, None)
            .await;

        assert!(!outcome.success);
        assert!(!outcome.error.unwrap().is_empty());
        assert_eq!(outcome.storage_key, "releases/unreachable");
    }

    #[test]
    fn test_transport_error_message_extraction() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "Network error");
        assert_eq!(transport_error_message(&err), "Network error");

        #[derive(Debug)]
        struct Silent;
        impl std::fmt::Display for Silent {
            fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                Ok(())
            }
        }
        impl std::error::Error for Silent {}
        assert_eq!(transport_error_message(&Silent), "Upload failed");
    }

    #[tokio::test]
    async fn test_upload_many_rejects_length_mismatch_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let uploader = DirectUploader::new();
        let files = vec![
            (Bytes::from_static(b"a"), "audio/mpeg".to_string()),
            (Bytes::from_static(b"b"), "audio/mpeg".to_string()),
        ];
        let targets = vec![target(&server.url(), "/only-one")];

        let err = uploader.upload_many(&files, &targets, None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::LengthMismatch {
                files: 2,
                targets: 1
            }
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_many_preserves_order_across_partial_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/ok")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("PUT", "/broken")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let uploader = DirectUploader::new();
        let files = vec![
            (Bytes::from_static(b"a"), "audio/mpeg".to_string()),
            (Bytes::from_static(b"b"), "audio/mpeg".to_string()),
        ];
        let targets = vec![target(&server.url(), "/ok"), target(&server.url(), "/broken")];

        let outcomes = uploader.upload_many(&files, &targets, None).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[1].error.as_deref().unwrap().contains("500"));
    }
}
