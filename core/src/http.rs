//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe an upload request and its response as plain data.
//! `UploadClient::build_post` produces an `HttpRequest` without touching the
//! network; a `Transport` (or a C host through the FFI crate) executes it and
//! hands back an `HttpResponse`.
//!
//! Bodies are `Vec<u8>` rather than `String`: multipart payloads carry raw
//! file bytes and must survive the round trip unmodified.

use std::borrow::Cow;

/// An upload request described as plain data. Always sent as `POST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The raw response to an upload: status, headers, and the full body.
///
/// Non-2xx statuses are data here, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
