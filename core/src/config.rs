//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UploadError;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Settings for an `UploadClient`. Every field has a default, so `{}` is a
/// valid document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Overrides the user agent derived from program metadata.
    pub user_agent: Option<String>,
    /// Whole-request timeout in milliseconds. `0` disables it.
    pub timeout_ms: u64,
    /// Reject fields that would corrupt the multipart framing.
    pub strict_framing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            strict_framing: false,
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, UploadError> {
        serde_json::from_str(raw).map_err(|e| UploadError::Config(e.to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}
