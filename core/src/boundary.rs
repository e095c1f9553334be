//! Per-request multipart boundary tokens.

use std::fmt;

use uuid::Uuid;

const BOUNDARY_PREFIX: &str = "----------";

/// The delimiter separating parts of one multipart body.
///
/// Generated boundaries are ten dashes followed by the 32 hex digits of a
/// random v4 UUID. Field content is not scanned for the token unless strict
/// framing is enabled on the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    pub fn generate() -> Self {
        Self(format!("{BOUNDARY_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Use a fixed token. Intended for deterministic encoding in tests and
    /// test vectors.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.0)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
