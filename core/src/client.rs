//! Multipart upload client.
//!
//! # Design
//! `UploadClient` holds a user agent, its config and a shared transport, and
//! carries no per-call state. Each upload is split into `build_post`, which
//! produces an `HttpRequest` with a fresh boundary and never touches the
//! network, and a transport round trip. `post` does both; `post_cancellable`
//! runs the round trip on a worker thread bounded by a `CancelToken` and the
//! configured timeout.

use std::sync::Arc;

use ureq::http::Uri;

use crate::boundary::Boundary;
use crate::cancel::{run_cancellable, CancelToken};
use crate::config::ClientConfig;
use crate::encoder::{check_framing, encode_body};
use crate::error::UploadError;
use crate::http::{HttpRequest, HttpResponse};
use crate::metadata::MetadataProvider;
use crate::transport::{Transport, UreqTransport};
use crate::types::MultipartForm;

/// Builds and sends `multipart/form-data` POST requests.
pub struct UploadClient<T = UreqTransport> {
    user_agent: String,
    config: ClientConfig,
    transport: Arc<T>,
}

impl<T> Clone for UploadClient<T> {
    fn clone(&self) -> Self {
        Self {
            user_agent: self.user_agent.clone(),
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl UploadClient<UreqTransport> {
    pub fn new(user_agent: &str) -> Self {
        Self::with_config(user_agent, ClientConfig::default())
    }

    /// Explicit user agent; `config.user_agent` is ignored.
    pub fn with_config(user_agent: &str, config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(user_agent, config, transport)
    }

    /// User agent from `config`, falling back to `name/version` of the program.
    pub fn from_config(config: ClientConfig, program: &impl MetadataProvider) -> Self {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| program.program_info().user_agent());
        Self::with_config(&user_agent, config)
    }

    pub fn from_program(program: &impl MetadataProvider) -> Self {
        Self::from_config(ClientConfig::default(), program)
    }
}

impl<T> UploadClient<T> {
    pub fn with_transport(user_agent: &str, config: ClientConfig, transport: T) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the POST for `form` with a freshly generated boundary.
    pub fn build_post(&self, url: &str, form: &MultipartForm) -> Result<HttpRequest, UploadError> {
        self.build_post_with_boundary(url, form, &Boundary::generate())
    }

    /// Build the POST for `form` using a caller-chosen boundary.
    pub fn build_post_with_boundary(
        &self,
        url: &str,
        form: &MultipartForm,
        boundary: &Boundary,
    ) -> Result<HttpRequest, UploadError> {
        validate_url(url)?;
        if self.config.strict_framing {
            check_framing(form, boundary)?;
        }

        let body = encode_body(form, boundary);
        Ok(HttpRequest {
            url: url.to_string(),
            headers: vec![
                ("content-type".to_string(), boundary.content_type()),
                ("user-agent".to_string(), self.user_agent.clone()),
                ("content-length".to_string(), body.len().to_string()),
            ],
            body,
        })
    }
}

impl<T: Transport> UploadClient<T> {
    /// Encode `form` and POST it, blocking until the full response arrives.
    ///
    /// Any status is returned as a response; only delivery failures are errors.
    pub fn post(&self, url: &str, form: &MultipartForm) -> Result<HttpResponse, UploadError> {
        let request = self.build_post(url, form)?;
        self.transport.execute(&request)
    }

    /// Like `post`, but returns early when `token` is cancelled or the
    /// configured timeout elapses.
    pub fn post_cancellable(
        &self,
        url: &str,
        form: &MultipartForm,
        token: &CancelToken,
    ) -> Result<HttpResponse, UploadError> {
        let request = self.build_post(url, form)?;
        run_cancellable(Arc::clone(&self.transport), request, token, self.config.timeout())
    }
}

fn validate_url(url: &str) -> Result<(), UploadError> {
    let invalid = |reason: String| UploadError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let uri: Uri = url.parse().map_err(|e| invalid(format!("{e}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => return Err(invalid(format!("unsupported scheme `{other}`"))),
        None => return Err(invalid("missing scheme".to_string())),
    }
    if uri.host().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
