//! Inspectable `multipart/form-data` bodies.
//!
//! A [`MultipartBody`] records each field's name, filename, MIME type, declared
//! size and content. Wire encoding is left to the transport; the declared
//! sizes let it send an exact `Content-Length`, which the vendor requires.
//! Files are referenced by path and only opened when the request is sent.

use std::path::PathBuf;

use bytes::Bytes;
use smol_str::SmolStr;

/// Content of a single form part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    /// Plain text field value
    Text(String),
    /// In-memory bytes
    Bytes(Bytes),
    /// File on disk, read lazily when the body is sent
    File(PathBuf),
}

/// A single field of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    name: SmolStr,
    filename: Option<SmolStr>,
    content_type: Option<SmolStr>,
    size: u64,
    content: PartContent,
}

impl FormPart {
    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename sent in `Content-Disposition`, for file fields
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Per-part `Content-Type`, for file fields
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Declared payload size in bytes. At most this many bytes are sent.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Part payload
    pub fn content(&self) -> &PartContent {
        &self.content
    }

    /// Text value, if this is a text field
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            PartContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Take the payload
    pub fn into_content(self) -> PartContent {
        self.content
    }
}

/// A `multipart/form-data` body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    pub fn text(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.parts.push(FormPart {
            name: name.into(),
            filename: None,
            content_type: None,
            size: value.len() as u64,
            content: PartContent::Text(value),
        });
        self
    }

    /// Add a file field backed by in-memory bytes
    pub fn bytes(
        mut self,
        name: impl Into<SmolStr>,
        bytes: Bytes,
        filename: impl Into<SmolStr>,
        content_type: impl Into<SmolStr>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            size: bytes.len() as u64,
            content: PartContent::Bytes(bytes),
        });
        self
    }

    /// Add a file field backed by a file on disk.
    ///
    /// `size` must be the file's length; at most `size` bytes are read from it.
    pub fn file(
        mut self,
        name: impl Into<SmolStr>,
        path: impl Into<PathBuf>,
        filename: impl Into<SmolStr>,
        size: u64,
        content_type: impl Into<SmolStr>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            size,
            content: PartContent::File(path.into()),
        });
        self
    }

    /// All parts, in order
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// First part with the given field name
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name.as_str() == name)
    }

    /// Take the parts, in order
    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }
}
