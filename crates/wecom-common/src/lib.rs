//! Common types for the wecom client: request descriptors, the multipart
//! upload path, the transport abstraction and the error taxonomy.

#![warn(missing_docs)]
pub use bytes;
pub use http;
pub use smol_str;
pub use url;

pub mod descriptor;
pub mod error;
/// Inspectable `multipart/form-data` bodies.
pub mod multipart;
pub mod response;
/// Stream abstractions for HTTP request/response bodies.
pub mod stream;
pub mod transport;
pub mod upload;

pub use descriptor::{RequestBody, RequestDescriptor, ResponseType};
pub use error::{BuildError, ClientError, DecodeError, HttpError, TransportError, VendorApiError};
pub use response::ApiResponse;
pub use stream::ByteStream;
pub use transport::Transport;
#[cfg(feature = "reqwest-client")]
pub use transport::{ReqwestTransport, TransportConfig};
pub use upload::{MediaKind, PayloadSource, UploadRequest, VideoDescription, build_upload_request};
