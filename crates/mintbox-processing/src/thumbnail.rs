//! Thumbnail deriver: a representative still frame for video assets.
//!
//! The external encoder only accepts file paths, so the video bytes are
//! staged into the invocation's scratch directory and the produced image is
//! read back into memory. Failures abort the pipeline; a video must never be
//! stored with a missing or wrong `image` attachment.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use mintbox_core::{MediaAsset, StoreError, StoreResult};

/// Fixed target width; height is auto-derived preserving aspect ratio.
pub const THUMBNAIL_WIDTH: u32 = 250;

/// Derives a still-image asset from a video asset.
#[async_trait]
pub trait Thumbnailer: Send + Sync {
    /// Stage `video` under `scratch` and return the derived thumbnail.
    async fn derive(&self, video: &MediaAsset, scratch: &Path) -> StoreResult<MediaAsset>;
}

/// ffmpeg-backed thumbnailer.
pub struct FfmpegThumbnailer {
    ffmpeg_path: String,
}

impl FfmpegThumbnailer {
    pub fn new(ffmpeg_path: impl Into<String>) -> StoreResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();

        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(StoreError::ThumbnailGeneration(format!(
                "invalid encoder path: {}",
                ffmpeg_path
            )));
        }

        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl Thumbnailer for FfmpegThumbnailer {
    async fn derive(&self, video: &MediaAsset, scratch: &Path) -> StoreResult<MediaAsset> {
        let input_path = scratch.join(&video.name);
        tokio::fs::write(&input_path, &video.bytes)
            .await
            .map_err(|e| StoreError::Read {
                path: input_path.display().to_string(),
                source: e,
            })?;

        let thumbnail_name = match video.name.rsplit_once('.') {
            Some((stem, _)) => format!("{}.png", stem),
            None => format!("{}.png", video.name),
        };
        let output_path = scratch.join(&thumbnail_name);

        let scale = format!("scale={}:-2", THUMBNAIL_WIDTH);
        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(&input_path)
            .args(["-vf", &scale, "-vframes", "1", "-y"])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                StoreError::ThumbnailGeneration(format!(
                    "failed to execute {}: {}",
                    self.ffmpeg_path, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoreError::ThumbnailGeneration(format!(
                "encoder exited with {}: {}",
                output.status, stderr
            )));
        }

        let bytes = tokio::fs::read(&output_path).await.map_err(|_| {
            StoreError::ThumbnailGeneration("encoder produced no output file".to_string())
        })?;

        tracing::debug!(
            video = %video.name,
            thumbnail = %thumbnail_name,
            size = bytes.len(),
            "derived video thumbnail"
        );

        Ok(MediaAsset {
            bytes: bytes.into(),
            content_type: "image/png".to_string(),
            name: thumbnail_name,
        })
    }
}
