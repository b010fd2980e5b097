//! Core types for the mintbox upload pipeline.
//!
//! This crate holds the error taxonomy, the domain models (media assets,
//! metadata records, upload results), and the environment-driven
//! configuration shared by the processing and client crates.

pub mod config;
pub mod error;
pub mod models;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use models::{
    Attribute, MediaAsset, NftMetadata, NftRecord, StoredProperties, StoredRecord, UploadResult,
    VideoProperties,
};
