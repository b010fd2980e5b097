//! File loader: raw bytes plus a content type derived from the extension.

use std::path::Path;

use mintbox_core::{MediaAsset, StoreError, StoreResult};

/// Map a file extension to its content type.
///
/// Only the still-image and video formats the packager understands are
/// mapped; anything else is an `UnknownType` error.
pub fn content_type_for(path: &Path) -> StoreResult<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| StoreError::UnknownType {
            extension: String::new(),
        })?;

    let content_type = match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        _ => return Err(StoreError::UnknownType { extension }),
    };

    Ok(content_type)
}

/// Read a local file into a [`MediaAsset`]. The source file is not touched
/// beyond the read.
pub async fn load_asset(path: &Path) -> StoreResult<MediaAsset> {
    let content_type = content_type_for(path)?;

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            StoreError::Read {
                path: path.display().to_string(),
                source: e,
            }
        }
    })?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();

    tracing::debug!(path = %path.display(), content_type, size = bytes.len(), "loaded media file");

    Ok(MediaAsset {
        bytes: bytes.into(),
        content_type: content_type.to_string(),
        name,
    })
}
