//! Executing `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the I/O seam: the client builds requests as data and hands
//! them to a transport. `UreqTransport` is the blocking implementation. It
//! disables ureq's status-as-error behavior so 4xx/5xx responses come back as
//! data and only delivery failures become errors. Response bodies are read in
//! full whatever their size.

use std::time::Duration;

use tracing::debug;

use crate::error::UploadError;
use crate::http::{HttpRequest, HttpResponse};

/// Sends one upload request and returns the raw response.
pub trait Transport: Send + Sync + 'static {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, UploadError>;
}

/// Blocking transport backed by a ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds the whole exchange: resolve, connect, send and
    /// receive. `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, UploadError> {
        let mut builder = self.agent.post(request.url.as_str());
        for (name, value) in &request.headers {
            // ureq derives Content-Length from the sized body, which has the same value.
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.send(request.body.as_slice())?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // ureq caps in-memory bodies at 10 MiB unless told otherwise.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        debug!(url = %request.url, status, bytes = body.len(), "upload response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
