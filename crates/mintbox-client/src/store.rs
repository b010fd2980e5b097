//! Storage submitter: uploads a packaged record and returns its identifiers.
//!
//! The client is constructed explicitly by the caller and reused across
//! pipeline invocations; there is no module-level singleton. Each binary
//! attachment is uploaded as a multipart POST, then the resolved
//! `metadata.json`. Transient failures (connect errors, timeouts, 429, 5xx)
//! are retried per attempt with exponential backoff; authentication and
//! service rejections are surfaced immediately.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;

use mintbox_core::{
    MediaAsset, NftRecord, StoreConfig, StoreError, StoreResult, StoredProperties, StoredRecord,
    UploadResult,
};

/// Characters escaped in the path segment of an ipfs:// URI.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/');

/// Retry policy for transient submission failures.
///
/// Retries re-send the same in-flight attempt only; the submission as a
/// whole is non-idempotent and is never re-triggered from the outside.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Content-addressed store accepting one packaged record per call.
#[async_trait]
pub trait NftStore: Send + Sync {
    /// Submit the record as a single atomic unit and block until the service
    /// acknowledges it with a content identifier.
    async fn store(&self, record: &NftRecord) -> StoreResult<UploadResult>;
}

/// nft.storage-compatible HTTP client with bearer auth.
#[derive(Clone, Debug)]
pub struct NftStorageClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

/// Service response envelope: `{"ok": true, "value": {"cid": "..."}}`.
#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    ok: bool,
    value: UploadValue,
}

#[derive(Debug, Deserialize)]
struct UploadValue {
    cid: String,
}

impl NftStorageClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One upload attempt for a binary attachment. Rebuilt per retry.
    async fn upload_asset_once(&self, asset: &MediaAsset) -> StoreResult<String> {
        let part = multipart::Part::bytes(asset.bytes.to_vec())
            .file_name(asset.name.clone())
            .mime_str(&asset.content_type)
            .map_err(|e| {
                StoreError::Submission(format!(
                    "invalid content type '{}': {}",
                    asset.content_type, e
                ))
            })?;
        let form = multipart::Form::new().part("file", part);
        self.post_upload(form).await
    }

    /// One upload attempt for the resolved metadata document.
    async fn upload_metadata_once(&self, record: &StoredRecord) -> StoreResult<String> {
        let body = serde_json::to_vec(record)
            .map_err(|e| StoreError::Submission(format!("failed to encode metadata: {}", e)))?;
        let part = multipart::Part::bytes(body)
            .file_name("metadata.json".to_string())
            .mime_str("application/json")
            .map_err(|e| StoreError::Submission(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);
        self.post_upload(form).await
    }

    async fn post_upload(&self, form: multipart::Form) -> StoreResult<String> {
        let mut request = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, &body));
        }

        let envelope: UploadEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::Submission(format!("failed to parse upload response: {}", e)))?;

        if !envelope.ok {
            return Err(StoreError::Submission(
                "service reported an unsuccessful upload".to_string(),
            ));
        }

        Ok(envelope.value.cid)
    }
}

#[async_trait]
impl NftStore for NftStorageClient {
    async fn store(&self, record: &NftRecord) -> StoreResult<UploadResult> {
        if self.token.is_none() {
            return Err(StoreError::Authentication(
                "no API token configured; set NFT_STORAGE_KEY".to_string(),
            ));
        }

        let image_cid = with_retries(&self.retry, "image upload", || {
            self.upload_asset_once(&record.image)
        })
        .await?;
        tracing::debug!(cid = %image_cid, name = %record.image.name, "image attachment stored");

        let properties = match &record.properties {
            Some(props) => {
                let video_cid = with_retries(&self.retry, "video upload", || {
                    self.upload_asset_once(&props.video)
                })
                .await?;
                tracing::debug!(cid = %video_cid, name = %props.video.name, "video attachment stored");
                Some(StoredProperties {
                    content_type: props.content_type.clone(),
                    video: ipfs_uri(&video_cid, &props.video.name),
                })
            }
            None => None,
        };

        let stored = StoredRecord {
            name: record.metadata.name.clone(),
            description: record.metadata.description.clone(),
            external_url: record.metadata.external_url.clone(),
            attributes: record.metadata.attributes.clone(),
            image: ipfs_uri(&image_cid, &record.image.name),
            properties,
        };

        let cid = with_retries(&self.retry, "metadata upload", || {
            self.upload_metadata_once(&stored)
        })
        .await?;

        Ok(UploadResult {
            metadata_uri: format!("ipfs://{}/metadata.json", cid),
            cid,
            record: stored,
        })
    }
}

/// Locator URI for a named attachment under its content identifier.
fn ipfs_uri(cid: &str, name: &str) -> String {
    format!("ipfs://{}/{}", cid, utf8_percent_encode(name, PATH_SEGMENT))
}

fn classify_status(status: StatusCode, body: &str) -> StoreError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        StoreError::Authentication(format!("service returned {}: {}", status, body))
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StoreError::TransientNetwork(format!("service returned {}: {}", status, body))
    } else {
        StoreError::Submission(format!("service returned {}: {}", status, body))
    }
}

/// Run `attempt` up to `max_attempts` times, doubling the delay after each
/// retryable failure. Non-retryable errors propagate immediately.
pub(crate) async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut attempt: F,
) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut delay = policy.base_delay;
    let mut attempt_no = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt_no < policy.max_attempts => {
                tracing::warn!(
                    attempt = attempt_no,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "{} failed, retrying",
                    what
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt_no += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mintbox_core::NftMetadata;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn no_delay() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
        }
    }

    fn jpeg_record() -> NftRecord {
        NftRecord {
            metadata: NftMetadata {
                name: "A".to_string(),
                description: "d".to_string(),
                ..Default::default()
            },
            image: MediaAsset {
                bytes: Bytes::from_static(b"\xff\xd8\xff"),
                content_type: "image/jpeg".to_string(),
                name: "photo.jpg".to_string(),
            },
            properties: None,
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_retries(&no_delay(), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(StoreError::TransientNetwork(format!("attempt {}", n)))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: StoreResult<()> = with_retries(&no_delay(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::TransientNetwork("connection reset".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(StoreError::TransientNetwork(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: StoreResult<()> = with_retries(&no_delay(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::Authentication("bad token".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(StoreError::Authentication(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_any_attempt() {
        let client = NftStorageClient::new(&StoreConfig::default()).unwrap();
        let result = client.store(&jpeg_record()).await;
        assert!(matches!(result, Err(StoreError::Authentication(_))));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "bad key"),
            StoreError::Authentication(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "no scope"),
            StoreError::Authentication(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            StoreError::TransientNetwork(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, "maintenance"),
            StoreError::TransientNetwork(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::PAYLOAD_TOO_LARGE, "too big"),
            StoreError::Submission(_)
        ));
    }

    #[test]
    fn test_ipfs_uri_escapes_names() {
        assert_eq!(
            ipfs_uri("bafyabc", "TEST 4 - string-theory.gif"),
            "ipfs://bafyabc/TEST%204%20-%20string-theory.gif"
        );
        assert_eq!(ipfs_uri("bafyabc", "photo.jpg"), "ipfs://bafyabc/photo.jpg");
    }
}
