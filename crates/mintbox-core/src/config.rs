//! Configuration module
//!
//! Environment-driven settings for the storage client and the thumbnail
//! tool. A missing API token is not an error at load time; it surfaces as an
//! authentication failure at first network use.

use std::env;

const DEFAULT_API_URL: &str = "https://api.nft.storage";
const DEFAULT_GATEWAY_HOST: &str = "nftstorage.link";
const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Settings for one storage client and its pipeline invocations.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Base URL of the storage service API.
    pub api_url: String,
    /// API token. Checked at first submission, not at load time.
    pub token: Option<String>,
    /// Host substituted for the ipfs:// scheme in gateway URLs.
    pub gateway_host: String,
    /// Path to the external thumbnail encoder binary.
    pub ffmpeg_path: String,
}

impl StoreConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("NFT_STORAGE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: env::var("NFT_STORAGE_KEY").ok().filter(|t| !t.is_empty()),
            gateway_host: env::var("NFT_STORAGE_GATEWAY_HOST")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_HOST.to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH")
                .unwrap_or_else(|_| DEFAULT_FFMPEG_PATH.to_string()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            gateway_host: DEFAULT_GATEWAY_HOST.to_string(),
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
        }
    }
}
