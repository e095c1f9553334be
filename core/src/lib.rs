//! Multipart/form-data uploads over blocking HTTP.
//!
//! # Overview
//! Encodes an ordered set of text and file fields as a `multipart/form-data`
//! body and POSTs it, returning the raw response. Building the request and
//! executing it are separate steps, so the encoding is deterministic and
//! testable without a network, and a foreign host can do the I/O itself.
//!
//! # Design
//! - `MultipartForm` preserves insertion order; order decides body layout.
//! - `Boundary` is generated fresh for every request.
//! - `UploadClient::build_post` produces an `HttpRequest`; a `Transport`
//!   executes it. `UreqTransport` is the blocking default.
//! - `UploadClient::post_cancellable` bounds a post by a `CancelToken` and
//!   the configured timeout.
//! - `ProgramInfo` is captured once with `program_info!()` and injected
//!   where a default user agent is needed.

pub mod boundary;
pub mod cancel;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod http;
pub mod metadata;
pub mod transport;
pub mod types;

pub use boundary::Boundary;
pub use cancel::CancelToken;
pub use client::UploadClient;
pub use config::ClientConfig;
pub use encoder::{check_framing, encode_body};
pub use error::UploadError;
pub use http::{HttpRequest, HttpResponse};
pub use metadata::{MetadataProvider, ProgramInfo};
pub use transport::{Transport, UreqTransport};
pub use types::{FileField, FormField, MultipartForm, DEFAULT_FILE_CONTENT_TYPE};
