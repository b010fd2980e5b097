//! HTTP client for an nft.storage-compatible content-addressed store.
//!
//! Provides the [`NftStore`] trait (one atomic "store record" operation) and
//! its reqwest-backed implementation with bearer auth and an attempt-scoped
//! retry policy, plus gateway URL derivation for human-readable output.

pub mod gateway;
pub mod store;

pub use gateway::GatewayUrls;
pub use store::{NftStorageClient, NftStore, RetryPolicy};
