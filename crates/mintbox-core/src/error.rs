//! Error types module
//!
//! All pipeline stages report failures through the `StoreError` enum. Local
//! I/O and type-detection errors abort immediately; thumbnail failures abort
//! the pipeline; only `TransientNetwork` is retryable. Authentication and
//! submission rejections are never retried.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("No content type mapping for extension '{extension}'")]
    UnknownType { extension: String },

    #[error("Thumbnail generation failed: {0}")]
    ThumbnailGeneration(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    #[error("Submission rejected: {0}")]
    Submission(String),

    #[error("Cancelled before {stage}")]
    Cancelled { stage: &'static str },
}

/// Result type for pipeline operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Whether the retry policy may re-send the failed attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::TransientNetwork(_))
    }

    /// Pipeline stage the error originates from, for top-level diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            StoreError::FileNotFound { .. } | StoreError::Read { .. } => "load",
            StoreError::UnknownType { .. } => "type-detection",
            StoreError::ThumbnailGeneration(_) => "thumbnail",
            StoreError::Authentication(_)
            | StoreError::TransientNetwork(_)
            | StoreError::Submission(_) => "submit",
            StoreError::Cancelled { stage } => stage,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            StoreError::TransientNetwork(err.to_string())
        } else {
            StoreError::Submission(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(StoreError::TransientNetwork("connection reset".into()).is_retryable());

        assert!(!StoreError::Authentication("missing token".into()).is_retryable());
        assert!(!StoreError::Submission("payload too large".into()).is_retryable());
        assert!(!StoreError::ThumbnailGeneration("ffmpeg exited 1".into()).is_retryable());
        assert!(!StoreError::UnknownType {
            extension: "xyz".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_stage_attribution() {
        let err = StoreError::FileNotFound {
            path: "/tmp/a.png".into(),
        };
        assert_eq!(err.stage(), "load");

        let err = StoreError::Cancelled { stage: "submit" };
        assert_eq!(err.stage(), "submit");

        let err = StoreError::ThumbnailGeneration("no output".into());
        assert_eq!(err.stage(), "thumbnail");
    }

    #[test]
    fn test_read_error_keeps_source() {
        use std::error::Error;

        let err = StoreError::Read {
            path: "/tmp/a.png".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/a.png"));
    }
}
