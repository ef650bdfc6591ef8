//! Responses handed back by a [`Transport`](crate::transport::Transport)

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, DecodeError, VendorApiError};
use crate::stream::ByteStream;

/// Response body, either fully buffered or still streaming
#[derive(Debug)]
enum ResponseBody {
    /// Whole body in memory
    Buffered(Bytes),
    /// Body still on the wire
    Stream(ByteStream),
}

/// Raw response from the API.
///
/// Transports have already rejected non-2xx statuses and JSON bodies carrying a
/// non-zero `errcode`, so anything that reaches the caller is a success.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl ApiResponse {
    /// Response with a buffered body
    pub fn buffered(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Buffered(body.into()),
        }
    }

    /// Response with a streamed body
    pub fn streaming(status: StatusCode, headers: HeaderMap, body: ByteStream) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Stream(body),
        }
    }

    /// `200 OK` with a JSON body and no headers; handy for mock transports
    pub fn json_ok(value: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        Self::buffered(StatusCode::OK, headers, value.to_string())
    }

    /// HTTP status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the body is still a stream
    pub fn is_stream(&self) -> bool {
        matches!(self.body, ResponseBody::Stream(_))
    }

    /// Read the whole body into memory
    pub async fn bytes(self) -> Result<Bytes, DecodeError> {
        match self.body {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Stream(stream) => Ok(stream.collect_bytes().await?),
        }
    }

    /// Read the body and decode it as JSON.
    ///
    /// A streamed body that turns out to be a vendor error document is
    /// reported as [`ClientError::Vendor`].
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let streamed = self.is_stream();
        let bytes = self.bytes().await?;
        if streamed {
            if let Some(err) = VendorApiError::from_body(&bytes) {
                return Err(err.into());
            }
        }
        serde_json::from_slice(&bytes)
            .map_err(DecodeError::from)
            .map_err(ClientError::from)
    }

    /// Body as a byte stream; buffered bodies become a single-chunk stream
    pub fn into_stream(self) -> ByteStream {
        match self.body {
            ResponseBody::Stream(stream) => stream,
            ResponseBody::Buffered(bytes) => {
                ByteStream::new(futures::stream::once(futures::future::ready(Ok(bytes))))
            }
        }
    }
}
