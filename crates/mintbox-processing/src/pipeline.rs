//! Pipeline orchestration: load → package → submit → report.
//!
//! Each invocation gets its own scratch directory, so concurrent invocations
//! never share temporary file names. Cleanup runs after submission whether
//! the pipeline succeeded or not, and its own failures only warn.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use mintbox_client::{gateway, GatewayUrls, NftStore};
use mintbox_core::{NftMetadata, StoreError, StoreResult, UploadResult};

use crate::loader;
use crate::packager;
use crate::thumbnail::Thumbnailer;

/// Result of one pipeline invocation: the stored identifiers plus the
/// derived gateway URLs for display.
#[derive(Clone, Debug)]
pub struct StoreOutcome {
    pub result: UploadResult,
    pub gateway: GatewayUrls,
}

/// Run one upload pipeline invocation for a local media file.
///
/// The cancellation token is honored between stages; once the submission is
/// in flight it runs to completion and a late cancellation is logged rather
/// than silently dropping an upload the service already accepted.
pub async fn store_nft(
    store: &dyn NftStore,
    thumbnailer: &dyn Thumbnailer,
    gateway_host: &str,
    path: &Path,
    metadata: NftMetadata,
    cancel: &CancellationToken,
) -> StoreResult<StoreOutcome> {
    let invocation_id = Uuid::new_v4();
    let span = tracing::info_span!("store_nft", %invocation_id, path = %path.display());

    async move {
        let scratch = tempfile::tempdir().map_err(|e| StoreError::Read {
            path: std::env::temp_dir().display().to_string(),
            source: e,
        })?;

        let outcome = run_stages(
            store,
            thumbnailer,
            gateway_host,
            path,
            metadata,
            cancel,
            scratch.path(),
        )
        .await;

        // Cleanup always runs; a failed removal never masks the pipeline result.
        if let Err(e) = scratch.close() {
            tracing::warn!(error = %e, "failed to remove scratch directory");
        }

        outcome
    }
    .instrument(span)
    .await
}

async fn run_stages(
    store: &dyn NftStore,
    thumbnailer: &dyn Thumbnailer,
    gateway_host: &str,
    path: &Path,
    metadata: NftMetadata,
    cancel: &CancellationToken,
    scratch: &Path,
) -> StoreResult<StoreOutcome> {
    ensure_not_cancelled(cancel, "load")?;
    let asset = loader::load_asset(path).await?;

    ensure_not_cancelled(cancel, "package")?;
    let record = packager::package_record(asset, metadata, thumbnailer, scratch).await?;

    ensure_not_cancelled(cancel, "submit")?;
    let result = store.store(&record).await?;
    if cancel.is_cancelled() {
        tracing::warn!(
            cid = %result.cid,
            "cancelled while the submission was in flight; the upload completed and is addressable"
        );
    }

    let gateway = gateway::derive(gateway_host, &result);
    tracing::info!(cid = %result.cid, uri = %result.metadata_uri, "stored nft metadata");

    Ok(StoreOutcome { result, gateway })
}

fn ensure_not_cancelled(cancel: &CancellationToken, stage: &'static str) -> StoreResult<()> {
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled { stage });
    }
    Ok(())
}
