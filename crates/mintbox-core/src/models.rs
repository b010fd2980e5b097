//! Domain models for the upload pipeline.
//!
//! `MediaAsset` carries raw bytes as the canonical in-memory representation;
//! encoding happens only at the HTTP boundary. `NftRecord` is the packaged
//! form before submission, `StoredRecord`/`UploadResult` the terminal form
//! echoed back by the storage service.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Raw file content with its declared content type and logical name.
///
/// Immutable once loaded; owned by the pipeline invocation that loaded it.
#[derive(Clone, Debug)]
pub struct MediaAsset {
    pub bytes: Bytes,
    pub content_type: String,
    /// Attachment file name, e.g. "sailboat-starry-night.mp4".
    pub name: String,
}

impl MediaAsset {
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }
}

/// One trait entry of the descriptive record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// Caller-supplied descriptive fields.
#[derive(Clone, Debug, Default)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub external_url: String,
    pub attributes: Vec<Attribute>,
}

/// Video attachment relocated out of the `image` slot.
#[derive(Clone, Debug)]
pub struct VideoProperties {
    /// Original content type of the source asset, e.g. "video/mp4".
    pub content_type: String,
    pub video: MediaAsset,
}

/// Packaged record: descriptive fields plus binary attachments.
///
/// Invariant: `image` is always a still image. For video sources a derived
/// thumbnail occupies `image` and the raw video lives in `properties`.
#[derive(Clone, Debug)]
pub struct NftRecord {
    pub metadata: NftMetadata,
    pub image: MediaAsset,
    pub properties: Option<VideoProperties>,
}

/// The metadata document as stored, attachments resolved to ipfs:// URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub name: String,
    pub description: String,
    pub external_url: String,
    pub attributes: Vec<Attribute>,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<StoredProperties>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProperties {
    #[serde(rename = "type")]
    pub content_type: String,
    pub video: String,
}

/// Terminal result of one successful submission. Never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResult {
    /// Content identifier of the stored metadata document.
    pub cid: String,
    /// Locator URI, e.g. "ipfs://{cid}/metadata.json".
    pub metadata_uri: String,
    pub record: StoredRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video() {
        let video = MediaAsset {
            bytes: Bytes::from_static(b"mp4"),
            content_type: "video/mp4".to_string(),
            name: "clip.mp4".to_string(),
        };
        assert!(video.is_video());

        let image = MediaAsset {
            bytes: Bytes::from_static(b"gif"),
            content_type: "image/gif".to_string(),
            name: "anim.gif".to_string(),
        };
        assert!(!image.is_video());
    }

    #[test]
    fn test_stored_record_serialization() {
        let record = StoredRecord {
            name: "A".to_string(),
            description: "d".to_string(),
            external_url: String::new(),
            attributes: vec![Attribute {
                trait_type: "background".to_string(),
                value: "starry".to_string(),
            }],
            image: "ipfs://bafyimage/photo.jpg".to_string(),
            properties: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["image"], "ipfs://bafyimage/photo.jpg");
        assert_eq!(json["attributes"][0]["trait_type"], "background");
        // No properties key for still images.
        assert!(json.get("properties").is_none());
    }

    #[test]
    fn test_stored_properties_type_field_name() {
        let record = StoredRecord {
            name: "A".to_string(),
            description: "d".to_string(),
            external_url: String::new(),
            attributes: vec![],
            image: "ipfs://bafythumb/clip.png".to_string(),
            properties: Some(StoredProperties {
                content_type: "video/mp4".to_string(),
                video: "ipfs://bafyvideo/clip.mp4".to_string(),
            }),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["properties"]["type"], "video/mp4");

        let roundtrip: StoredRecord = serde_json::from_value(json).unwrap();
        assert_eq!(roundtrip, record);
    }
}
