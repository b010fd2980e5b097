use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use mintbox_client::NftStorageClient;
use mintbox_core::{Attribute, NftMetadata, StoreConfig};
use mintbox_processing::{store_nft, FfmpegThumbnailer, StoreOutcome};

#[derive(Parser, Debug)]
#[command(name = "mintbox")]
#[command(about = "Package local media with NFT metadata and upload it to content-addressed storage")]
struct Args {
    /// Media files to upload (image or video)
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// NFT name
    #[arg(long)]
    name: String,

    /// NFT description
    #[arg(long, default_value = "")]
    description: String,

    /// External URL embedded in the metadata record
    #[arg(long, default_value = "")]
    external_url: String,

    /// Attribute as trait_type=value (repeatable)
    #[arg(long = "attribute", value_name = "TRAIT=VALUE")]
    attributes: Vec<String>,

    /// Maximum concurrent uploads for batches
    #[arg(long, default_value = "4")]
    concurrency: usize,
}

fn parse_attribute(raw: &str) -> Result<Attribute> {
    let (trait_type, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid attribute '{}'. Expected TRAIT=VALUE", raw))?;
    Ok(Attribute {
        trait_type: trait_type.to_string(),
        value: value.to_string(),
    })
}

fn print_outcome(path: &Path, outcome: &StoreOutcome) -> Result<()> {
    let result = &outcome.result;
    println!();
    println!("{}", path.display());
    println!("  Content ID (CID): {}", result.cid);
    println!("  Metadata URI:     {}", result.metadata_uri);
    println!("  Metadata gateway: {}", outcome.gateway.metadata);
    println!("  Image gateway:    {}", outcome.gateway.image);
    if let Some(video) = &outcome.gateway.video {
        println!("  Video gateway:    {}", video);
    }
    println!("  Stored record:");
    let pretty = serde_json::to_string_pretty(&result.record)?;
    for line in pretty.lines() {
        println!("    {}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let attributes = args
        .attributes
        .iter()
        .map(|raw| parse_attribute(raw))
        .collect::<Result<Vec<_>>>()?;

    let config = StoreConfig::from_env();
    let client = Arc::new(NftStorageClient::new(&config)?);
    let thumbnailer = Arc::new(FfmpegThumbnailer::new(config.ffmpeg_path.clone())?);

    // Ctrl-C stops new stages; an in-flight submission still completes.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, no further stages will start");
                cancel.cancel();
            }
        });
    }

    let metadata = NftMetadata {
        name: args.name,
        description: args.description,
        external_url: args.external_url,
        attributes,
    };

    let semaphore = Arc::new(Semaphore::new(args.concurrency.max(1)));
    let mut handles = Vec::new();
    for path in args.files {
        let client = client.clone();
        let thumbnailer = thumbnailer.clone();
        let metadata = metadata.clone();
        let gateway_host = config.gateway_host.clone();
        let cancel = cancel.clone();
        let permit = semaphore.clone().acquire_owned().await?;

        handles.push(tokio::spawn(async move {
            let result = store_nft(
                client.as_ref(),
                thumbnailer.as_ref(),
                &gateway_host,
                &path,
                metadata,
                &cancel,
            )
            .await;
            drop(permit);
            (path, result)
        }));
    }

    let mut first_error: Option<anyhow::Error> = None;
    for handle in handles {
        let (path, result) = handle.await?;
        match result {
            Ok(outcome) => print_outcome(&path, &outcome)?,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    stage = e.stage(),
                    error = %e,
                    "upload failed"
                );
                if first_error.is_none() {
                    first_error = Some(e.into());
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute() {
        let attr = parse_attribute("background=starry").unwrap();
        assert_eq!(attr.trait_type, "background");
        assert_eq!(attr.value, "starry");

        // Values may contain '='.
        let attr = parse_attribute("formula=e=mc2").unwrap();
        assert_eq!(attr.trait_type, "formula");
        assert_eq!(attr.value, "e=mc2");

        assert!(parse_attribute("no-separator").is_err());
    }
}
