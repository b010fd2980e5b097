//! Metadata packager: pure assembly of the record to be stored.
//!
//! No network calls happen here. The only failure mode is a propagated
//! thumbnailer error on the video branch.

use std::path::Path;

use mintbox_core::{MediaAsset, NftMetadata, NftRecord, StoreResult, VideoProperties};

use crate::thumbnail::Thumbnailer;

/// Assemble an [`NftRecord`] from a loaded asset and descriptive fields.
///
/// Still images become the `image` attachment directly. Videos get a derived
/// thumbnail in `image` and are relocated into `properties.video`, keeping
/// the invariant that `image` is never a video.
pub async fn package_record(
    asset: MediaAsset,
    metadata: NftMetadata,
    thumbnailer: &dyn Thumbnailer,
    scratch: &Path,
) -> StoreResult<NftRecord> {
    if !asset.is_video() {
        return Ok(NftRecord {
            metadata,
            image: asset,
            properties: None,
        });
    }

    let thumbnail = thumbnailer.derive(&asset, scratch).await?;
    let content_type = asset.content_type.clone();

    Ok(NftRecord {
        metadata,
        image: thumbnail,
        properties: Some(VideoProperties {
            content_type,
            video: asset,
        }),
    })
}
