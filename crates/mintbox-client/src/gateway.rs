//! Gateway URL derivation.
//!
//! ipfs:// locators are only reachable from IPFS-aware browsers or a local
//! node; an HTTP gateway bridges them to conventional web requests. This is
//! pure string substitution for observability output, nothing downstream
//! consumes it.

use mintbox_core::UploadResult;

/// Human-readable gateway URLs for one upload result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayUrls {
    pub metadata: String,
    pub image: String,
    pub video: Option<String>,
}

/// Bridge an ipfs:// locator to an HTTP URL on the given gateway host.
/// URIs with any other scheme are returned unchanged.
pub fn http_url(gateway_host: &str, uri: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(rest) => format!("https://{}/ipfs/{}", gateway_host, rest),
        None => uri.to_string(),
    }
}

/// Derive gateway URLs for the metadata document, the primary image, and the
/// video attachment if present.
pub fn derive(gateway_host: &str, result: &UploadResult) -> GatewayUrls {
    GatewayUrls {
        metadata: http_url(gateway_host, &result.metadata_uri),
        image: http_url(gateway_host, &result.record.image),
        video: result
            .record
            .properties
            .as_ref()
            .map(|p| http_url(gateway_host, &p.video)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintbox_core::{StoredProperties, StoredRecord};

    fn sample_result() -> UploadResult {
        UploadResult {
            cid: "bafyreidrdhqlfsyyo5sp5ejpnap4qllzbh7iofbdsgsar5dwtpy73xspie".to_string(),
            metadata_uri:
                "ipfs://bafyreidrdhqlfsyyo5sp5ejpnap4qllzbh7iofbdsgsar5dwtpy73xspie/metadata.json"
                    .to_string(),
            record: StoredRecord {
                name: "TEST 8".to_string(),
                description: "d".to_string(),
                external_url: String::new(),
                attributes: vec![],
                image: "ipfs://bafythumb/clip.png".to_string(),
                properties: Some(StoredProperties {
                    content_type: "video/mp4".to_string(),
                    video: "ipfs://bafyvideo/clip.mp4".to_string(),
                }),
            },
        }
    }

    #[test]
    fn test_scheme_substitution() {
        let urls = derive("nftstorage.link", &sample_result());
        assert_eq!(
            urls.metadata,
            "https://nftstorage.link/ipfs/bafyreidrdhqlfsyyo5sp5ejpnap4qllzbh7iofbdsgsar5dwtpy73xspie/metadata.json"
        );
        assert_eq!(urls.image, "https://nftstorage.link/ipfs/bafythumb/clip.png");
        assert_eq!(
            urls.video.as_deref(),
            Some("https://nftstorage.link/ipfs/bafyvideo/clip.mp4")
        );
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let result = sample_result();
        let first = derive("nftstorage.link", &result);
        let second = derive("nftstorage.link", &result);
        assert_eq!(first, second);

        // Already-bridged URLs pass through unchanged.
        assert_eq!(http_url("nftstorage.link", &first.image), first.image);
    }

    #[test]
    fn test_no_video_urls_for_still_images() {
        let mut result = sample_result();
        result.record.properties = None;
        let urls = derive("nftstorage.link", &result);
        assert!(urls.video.is_none());
    }
}
