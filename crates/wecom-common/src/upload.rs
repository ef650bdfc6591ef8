//! # Upload request builder
//!
//! Shared by every endpoint that accepts a binary payload (temporary media,
//! permanent material, inline images). The payload is sent as a single
//! multipart field named `media`, with the declared size the vendor needs to
//! validate the upload before consuming it.
//!
//! ```no_run
//! # async fn demo() -> Result<(), wecom_common::error::BuildError> {
//! use wecom_common::upload::{MediaKind, PayloadSource, build_upload_request};
//!
//! let req = build_upload_request(
//!     PayloadSource::path("./photo.jpg"),
//!     Some(MediaKind::Image),
//!     "media/upload",
//! )
//! .await?;
//! assert_eq!(req.query_param("type"), Some("image"));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bytes::Bytes;
use http::{HeaderValue, header};
use mime_guess::Mime;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::descriptor::RequestDescriptor;
use crate::error::BuildError;
use crate::multipart::MultipartBody;

/// Name of the multipart field carrying the payload
pub const MEDIA_FIELD: &str = "media";
/// Name of the multipart field carrying the video description
pub const DESCRIPTION_FIELD: &str = "description";

/// Where upload bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// A file on disk; length is read from its metadata
    FilePath {
        /// Location of the file
        path: PathBuf,
        /// Filename reported to the server, instead of the path's basename
        filename: Option<SmolStr>,
    },
    /// Bytes already in memory; nothing can be inferred, so name and type are required
    Buffer {
        /// Payload
        bytes: Bytes,
        /// Filename reported to the server
        filename: SmolStr,
        /// MIME type of the payload
        mime: SmolStr,
    },
}

impl PayloadSource {
    /// File on disk, reported under its basename
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::FilePath {
            path: path.into(),
            filename: None,
        }
    }

    /// File on disk, reported under `filename`
    pub fn path_named(path: impl Into<PathBuf>, filename: impl Into<SmolStr>) -> Self {
        Self::FilePath {
            path: path.into(),
            filename: Some(filename.into()),
        }
    }

    /// In-memory buffer
    pub fn buffer(
        bytes: impl Into<Bytes>,
        filename: impl Into<SmolStr>,
        mime: impl Into<SmolStr>,
    ) -> Self {
        Self::Buffer {
            bytes: bytes.into(),
            filename: filename.into(),
            mime: mime.into(),
        }
    }
}

impl From<PathBuf> for PayloadSource {
    fn from(path: PathBuf) -> Self {
        Self::path(path)
    }
}

impl From<&Path> for PayloadSource {
    fn from(path: &Path) -> Self {
        Self::path(path)
    }
}

/// Media type tag understood by the media and material endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Image
    Image,
    /// Voice recording
    Voice,
    /// Video
    Video,
    /// Thumbnail
    Thumb,
    /// Rich-text article ("news"); listing only, cannot be uploaded as a file
    News,
}

impl MediaKind {
    /// Kinds that can be uploaded as files
    pub const UPLOADABLE: [MediaKind; 4] = [
        MediaKind::Image,
        MediaKind::Voice,
        MediaKind::Video,
        MediaKind::Thumb,
    ];

    /// Wire value, as used for the `type` parameter
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::Thumb => "thumb",
            Self::News => "news",
        }
    }

    /// Whether a file of this kind can be uploaded
    pub const fn is_uploadable(&self) -> bool {
        !matches!(self, Self::News)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "voice" => Ok(Self::Voice),
            "video" => Ok(Self::Video),
            "thumb" => Ok(Self::Thumb),
            "news" => Ok(Self::News),
            other => Err(BuildError::invalid(format!("unknown media kind `{other}`"))),
        }
    }
}

/// Title and introduction attached to a permanent video upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDescription {
    /// Video title
    pub title: String,
    /// Free-form introduction
    pub introduction: String,
}

impl VideoDescription {
    /// Create a description
    pub fn new(title: impl Into<String>, introduction: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            introduction: introduction.into(),
        }
    }
}

/// Builder for an upload [`RequestDescriptor`]
#[derive(Debug, Clone)]
pub struct UploadRequest {
    source: PayloadSource,
    endpoint: SmolStr,
    kind: Option<MediaKind>,
    description: Option<String>,
}

impl UploadRequest {
    /// Upload `source` to the given endpoint path, e.g. `media/upload`
    pub fn new(source: PayloadSource, endpoint: impl Into<SmolStr>) -> Self {
        Self {
            source,
            endpoint: endpoint.into(),
            kind: None,
            description: None,
        }
    }

    /// Tag the upload with a media kind, sent as the `type` query parameter
    pub fn kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Optional variant of [`UploadRequest::kind`]
    pub fn maybe_kind(mut self, kind: Option<MediaKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Attach a JSON-encoded `description` form field
    pub fn description<T: Serialize + ?Sized>(mut self, description: &T) -> Result<Self, BuildError> {
        self.description = Some(serde_json::to_string(description)?);
        Ok(self)
    }

    /// Resolve the payload and produce the descriptor.
    ///
    /// File sources are stat'ed here (asynchronously); nothing is read from
    /// them until the transport streams the body.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint, kind = ?self.kind)))]
    pub async fn build(self) -> Result<RequestDescriptor, BuildError> {
        if let Some(kind) = self.kind {
            if !kind.is_uploadable() {
                return Err(BuildError::invalid(format!(
                    "media kind `{kind}` cannot be uploaded as a file"
                )));
            }
        }

        let mut form = match self.source {
            PayloadSource::FilePath { path, filename } => {
                let metadata = tokio::fs::metadata(&path)
                    .await
                    .map_err(|source| BuildError::FileNotFound {
                        path: path.clone(),
                        source,
                    })?;
                if !metadata.is_file() {
                    return Err(BuildError::invalid(format!(
                        "{} is not a regular file",
                        path.display()
                    )));
                }
                let filename = match filename {
                    Some(name) if name.trim().is_empty() => {
                        return Err(BuildError::invalid("the reported filename must not be empty"));
                    }
                    Some(name) => name,
                    None => path
                        .file_name()
                        .map(|name| SmolStr::new(name.to_string_lossy()))
                        .ok_or_else(|| {
                            BuildError::invalid(format!("{} has no file name", path.display()))
                        })?,
                };
                let mime = mime_guess::from_path(filename.as_str()).first_or_octet_stream();

                #[cfg(feature = "tracing")]
                tracing::debug!(path = %path.display(), size = metadata.len(), %mime, "resolved upload file");

                MultipartBody::new().file(
                    MEDIA_FIELD,
                    path,
                    filename,
                    metadata.len(),
                    mime.essence_str(),
                )
            }
            PayloadSource::Buffer {
                bytes,
                filename,
                mime,
            } => {
                if filename.trim().is_empty() {
                    return Err(BuildError::invalid(
                        "a filename is required when uploading from a buffer",
                    ));
                }
                if mime.trim().is_empty() {
                    return Err(BuildError::invalid(
                        "a MIME type is required when uploading from a buffer",
                    ));
                }
                let mime = parse_mime(&mime)?;
                MultipartBody::new().bytes(MEDIA_FIELD, bytes, filename, mime.as_ref())
            }
        };

        if let Some(description) = self.description {
            form = form.text(DESCRIPTION_FIELD, description);
        }

        let mut descriptor = RequestDescriptor::post(self.endpoint)
            .multipart(form)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(kind) = self.kind {
            descriptor = descriptor.query("type", kind.as_str());
        }
        Ok(descriptor)
    }
}

fn parse_mime(raw: &str) -> Result<Mime, BuildError> {
    raw.trim()
        .parse::<Mime>()
        .map_err(|e| BuildError::invalid(format!("invalid MIME type {raw:?}: {e}")))
}

/// Build an upload descriptor for `source`, tagged with `kind` when the
/// endpoint distinguishes media types.
pub async fn build_upload_request(
    source: PayloadSource,
    kind: Option<MediaKind>,
    endpoint: impl Into<SmolStr>,
) -> Result<RequestDescriptor, BuildError> {
    UploadRequest::new(source, endpoint)
        .maybe_kind(kind)
        .build()
        .await
}
