//! `multipart/form-data` body assembly.
//!
//! # Design
//! The body is built into a single byte buffer, so file payloads are copied
//! verbatim with no transfer encoding. Parts are written in form order:
//!
//! ```text
//! --{boundary}\r\n
//! Content-Disposition: form-data; name="{name}"[; filename="{filename}"]\r\n
//! [Content-Type: {type}\r\n]
//! \r\n
//! {payload}
//! ```
//!
//! A CRLF separates consecutive parts. The closing `--{boundary}--\r\n` gets a
//! leading CRLF only when at least one part was written, so an empty form
//! encodes to the closing line alone.
//!
//! Names, filenames and values are not escaped. `check_framing` is the
//! opt-in guard for content that would break the framing.

use tracing::debug;

use crate::boundary::Boundary;
use crate::error::UploadError;
use crate::types::{FormField, MultipartForm};

const CRLF: &[u8] = b"\r\n";

/// Encode `form` as a multipart body delimited by `boundary`.
pub fn encode_body(form: &MultipartForm, boundary: &Boundary) -> Vec<u8> {
    let mut body = Vec::with_capacity(estimated_len(form, boundary));

    for (index, (name, field)) in form.iter().enumerate() {
        if index > 0 {
            body.extend_from_slice(CRLF);
        }
        body.extend_from_slice(part_header(boundary, name, field).as_bytes());
        match field {
            FormField::Text { value } => body.extend_from_slice(value.as_bytes()),
            FormField::File(file) => body.extend_from_slice(&file.data),
        }
    }

    if !form.is_empty() {
        body.extend_from_slice(CRLF);
    }
    body.extend_from_slice(b"--");
    body.extend_from_slice(boundary.as_str().as_bytes());
    body.extend_from_slice(b"--");
    body.extend_from_slice(CRLF);

    debug!(parts = form.len(), bytes = body.len(), "encoded multipart body");
    body
}

fn part_header(boundary: &Boundary, name: &str, field: &FormField) -> String {
    match field {
        FormField::Text { .. } => format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n"
        ),
        FormField::File(file) => format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            file.filename_or(name),
            file.content_type_or_default(),
        ),
    }
}

fn estimated_len(form: &MultipartForm, boundary: &Boundary) -> usize {
    // Headers are small next to typical payloads; reserve a flat allowance per part.
    let per_part = boundary.as_str().len() + 128;
    let payload: usize = form
        .iter()
        .map(|(name, field)| {
            name.len()
                + match field {
                    FormField::Text { value } => value.len(),
                    FormField::File(file) => file.data.len(),
                }
        })
        .sum();
    payload + per_part * (form.len() + 1)
}

/// Reject forms whose content would corrupt the multipart framing.
///
/// Names and filenames may not contain `"`, CR or LF. No name, filename or
/// payload may contain the boundary token.
pub fn check_framing(form: &MultipartForm, boundary: &Boundary) -> Result<(), UploadError> {
    let token = boundary.as_str().as_bytes();

    for (name, field) in form.iter() {
        check_header_param("field name", name)?;
        if contains(name.as_bytes(), token) {
            return Err(UploadError::Framing(format!("field name `{name}` contains the boundary")));
        }
        match field {
            FormField::Text { value } => {
                if contains(value.as_bytes(), token) {
                    return Err(UploadError::Framing(format!(
                        "value of `{name}` contains the boundary"
                    )));
                }
            }
            FormField::File(file) => {
                if let Some(filename) = &file.filename {
                    check_header_param("filename", filename)?;
                    if contains(filename.as_bytes(), token) {
                        return Err(UploadError::Framing(format!(
                            "filename of `{name}` contains the boundary"
                        )));
                    }
                }
                if let Some(content_type) = &file.content_type {
                    if content_type.contains(['\r', '\n']) {
                        return Err(UploadError::Framing(format!(
                            "content type of `{name}` contains a line break"
                        )));
                    }
                }
                if contains(&file.data, token) {
                    return Err(UploadError::Framing(format!(
                        "file data of `{name}` contains the boundary"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn check_header_param(what: &str, value: &str) -> Result<(), UploadError> {
    if value.contains(['"', '\r', '\n']) {
        return Err(UploadError::Framing(format!(
            "{what} `{}` contains a quote or line break",
            value.escape_debug()
        )));
    }
    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}
