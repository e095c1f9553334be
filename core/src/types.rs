//! Form field model for multipart uploads.
//!
//! # Design
//! `MultipartForm` is an insertion-ordered map backed by a `Vec`. Order is
//! part of the wire contract: it decides the byte order of parts in the body.
//! Re-inserting an existing name replaces the value in place, so the part
//! keeps its original position.

use serde::{Deserialize, Serialize};

/// Content type written for file parts that do not name one.
pub const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// A single named value in a multipart form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormField {
    /// Sent as UTF-8 with no per-part `Content-Type`.
    Text { value: String },
    /// Sent verbatim with `filename` and `Content-Type` headers.
    File(FileField),
}

/// Raw file payload plus its optional part metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileField {
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileField {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            filename: None,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The filename to announce, falling back to the field name.
    pub fn filename_or<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.filename.as_deref().unwrap_or(field_name)
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_FILE_CONTENT_TYPE)
    }
}

/// Ordered mapping from field name to `FormField`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, FormField)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style text insert.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, FormField::Text { value: value.into() });
        self
    }

    /// Builder-style file insert.
    pub fn file(mut self, name: impl Into<String>, file: FileField) -> Self {
        self.insert(name, FormField::File(file));
        self
    }

    /// Insert or replace a field. A replaced field keeps its position and the
    /// previous value is returned.
    pub fn insert(&mut self, name: impl Into<String>, field: FormField) -> Option<FormField> {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, field)),
            None => {
                self.fields.push((name, field));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FormField> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormField)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }
}

impl<N: Into<String>> FromIterator<(N, FormField)> for MultipartForm {
    fn from_iter<I: IntoIterator<Item = (N, FormField)>>(iter: I) -> Self {
        let mut form = MultipartForm::new();
        form.extend(iter);
        form
    }
}

impl<N: Into<String>> Extend<(N, FormField)> for MultipartForm {
    fn extend<I: IntoIterator<Item = (N, FormField)>>(&mut self, iter: I) {
        for (name, field) in iter {
            self.insert(name, field);
        }
    }
}
