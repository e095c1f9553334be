//! Error types for building and sending multipart uploads.
//!
//! # Design
//! Transport failures are passed through from ureq unchanged; the client never
//! retries or reinterprets them. `is_transport` groups the variants that mean
//! "the request never produced a response", which is what callers usually
//! branch on.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The target is not an absolute `http` or `https` URL.
    #[error("invalid upload url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// DNS, TCP, TLS, protocol or timeout failure reported by ureq.
    #[error(transparent)]
    Transport(#[from] ureq::Error),

    /// The caller's `CancelToken` fired before a response arrived.
    #[error("upload cancelled")]
    Cancelled,

    /// No response arrived within the configured timeout.
    #[error("upload timed out after {0:?}")]
    TimedOut(Duration),

    /// The worker thread running the transport exited without a result.
    #[error("upload worker exited without a response")]
    WorkerLost,

    #[error("failed to start upload worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// Strict framing rejected a field that would corrupt the body.
    #[error("unsafe multipart framing: {0}")]
    Framing(String),

    #[error("invalid client config: {0}")]
    Config(String),
}

impl UploadError {
    /// True when the request could not be delivered or answered.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            UploadError::InvalidUrl { .. } | UploadError::Transport(_) | UploadError::TimedOut(_)
        )
    }
}
