//! Transport abstraction and the reqwest-backed implementation.
//!
//! The client never talks to the network itself: it hands a
//! [`RequestDescriptor`] to whatever [`Transport`] it was constructed with.
//! Base URL, authentication and connection pooling live behind this trait.

use std::future::Future;
use std::sync::Arc;

use crate::descriptor::RequestDescriptor;
use crate::error::ClientError;
use crate::response::ApiResponse;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/";

/// Sends a [`RequestDescriptor`] and returns the raw response.
///
/// Implementations are expected to reject non-2xx statuses with
/// [`ClientError::Http`] and JSON bodies carrying a non-zero `errcode` with
/// [`ClientError::Vendor`].
#[trait_variant::make(Send)]
pub trait Transport {
    /// Perform a single HTTP exchange
    fn request(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<ApiResponse, ClientError>>;
}

impl<T: Transport + Sync> Transport for Arc<T> {
    fn request(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<ApiResponse, ClientError>> + Send {
        self.as_ref().request(request)
    }
}

#[cfg(feature = "reqwest-client")]
pub use self::reqwest_impl::{ReqwestTransport, TransportConfig};

#[cfg(feature = "reqwest-client")]
mod reqwest_impl {
    use std::time::Duration;

    use futures::TryStreamExt;
    use http::header;
    use reqwest::multipart::{Form, Part};
    use smol_str::SmolStr;
    use tokio::io::AsyncReadExt;
    use tokio_util::io::ReaderStream;
    use url::Url;

    use super::{DEFAULT_BASE_URL, Transport};
    use crate::descriptor::{Parts, RequestBody, RequestDescriptor, ResponseType};
    use crate::error::{BuildError, ClientError, HttpError, TransportError, VendorApiError};
    use crate::multipart::{MultipartBody, PartContent};
    use crate::response::ApiResponse;
    use crate::stream::{ByteStream, StreamError};

    /// Settings for [`ReqwestTransport`]
    #[derive(Debug, Clone, bon::Builder)]
    #[builder(start_fn = new)]
    pub struct TransportConfig {
        /// API root; endpoint paths are resolved against it
        #[builder(into, default = SmolStr::new_static(DEFAULT_BASE_URL))]
        pub base_url: SmolStr,
        /// Sent as the `access_token` query parameter on every request
        #[builder(into)]
        pub access_token: Option<SmolStr>,
        /// Per-request timeout
        pub timeout: Option<Duration>,
    }

    impl Default for TransportConfig {
        fn default() -> Self {
            TransportConfig::new().build()
        }
    }

    /// [`Transport`] over a shared [`reqwest::Client`]
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
        base_url: Url,
        access_token: Option<SmolStr>,
        timeout: Option<Duration>,
    }

    impl ReqwestTransport {
        /// Create a transport with a fresh connection pool
        pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
            Self::with_client(reqwest::Client::new(), config)
        }

        /// Create a transport reusing an existing [`reqwest::Client`]
        pub fn with_client(
            client: reqwest::Client,
            config: TransportConfig,
        ) -> Result<Self, TransportError> {
            let base_url = Url::parse(&config.base_url).map_err(|e| {
                TransportError::InvalidRequest(format!("invalid base URL {}: {e}", config.base_url))
            })?;
            Ok(Self {
                client,
                base_url,
                access_token: config.access_token,
                timeout: config.timeout,
            })
        }

        /// API root requests are resolved against
        pub fn base_url(&self) -> &Url {
            &self.base_url
        }

        /// Replace the access token, e.g. after the caller refreshed it
        pub fn set_access_token(&mut self, token: Option<SmolStr>) {
            self.access_token = token;
        }

        fn resolve(&self, request: &RequestDescriptor) -> Result<Url, TransportError> {
            let mut url = request
                .url(&self.base_url)
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            if let Some(token) = &self.access_token {
                url.query_pairs_mut().append_pair("access_token", token);
            }
            Ok(url)
        }
    }

    impl Transport for ReqwestTransport {
        #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, request), fields(method = %request.method(), path = %request.path())))]
        async fn request(&self, request: RequestDescriptor) -> Result<ApiResponse, ClientError> {
            let url = self.resolve(&request)?;
            let Parts {
                method,
                headers,
                body,
                response_type,
                ..
            } = request.into_parts();

            let mut req = self.client.request(method, url).headers(headers);
            if let Some(timeout) = self.timeout {
                req = req.timeout(timeout);
            }
            req = match body {
                RequestBody::Empty => req,
                RequestBody::Json(value) => {
                    req.body(serde_json::to_vec(&value).map_err(BuildError::from)?)
                }
                RequestBody::Multipart(form) => req.multipart(multipart_form(form).await?),
            };

            let resp = req.send().await.map_err(TransportError::from)?;
            let status = resp.status();
            let headers = resp.headers().clone();

            #[cfg(feature = "tracing")]
            tracing::debug!(%status, "response received");

            if !status.is_success() {
                let body = resp.bytes().await.ok();
                return Err(HttpError { status, body }.into());
            }

            let buffer = match response_type {
                ResponseType::Json => true,
                // Media downloads report failures as JSON documents.
                ResponseType::Stream => is_document(&headers),
            };

            if buffer {
                let bytes = resp.bytes().await.map_err(TransportError::from)?;
                if let Some(err) = VendorApiError::from_body(&bytes) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(errcode = err.errcode, errmsg = %err.errmsg, "vendor error");
                    return Err(err.into());
                }
                Ok(ApiResponse::buffered(status, headers, bytes))
            } else {
                let stream = resp.bytes_stream().map_err(StreamError::transport);
                Ok(ApiResponse::streaming(status, headers, ByteStream::new(stream)))
            }
        }
    }

    /// Turn an inspectable form into a reqwest one.
    ///
    /// Every part carries its length, so reqwest sends an exact
    /// `Content-Length` instead of chunked encoding. Files are opened here and
    /// streamed, capped at the size recorded when the form was built.
    async fn multipart_form(body: MultipartBody) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for part in body.into_parts() {
            let name = part.name().to_string();
            let filename = part.filename().map(str::to_string);
            let content_type = part.content_type().map(str::to_string);
            let size = part.size();

            let mut wire = match part.into_content() {
                PartContent::Text(text) => {
                    form = form.text(name, text);
                    continue;
                }
                PartContent::Bytes(bytes) => {
                    Part::stream_with_length(reqwest::Body::from(bytes), size)
                }
                PartContent::File(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .map_err(|source| BuildError::FileNotFound {
                            path: path.clone(),
                            source,
                        })?;
                    let reader = ReaderStream::new(file.take(size));
                    Part::stream_with_length(reqwest::Body::wrap_stream(reader), size)
                }
            };
            if let Some(filename) = filename {
                wire = wire.file_name(filename);
            }
            if let Some(content_type) = content_type {
                wire = wire.mime_str(&content_type).map_err(TransportError::from)?;
            }
            form = form.part(name, wire);
        }
        Ok(form)
    }

    fn is_document(headers: &http::HeaderMap) -> bool {
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| {
                let ct = ct.trim_start().to_ascii_lowercase();
                ct.starts_with("application/json") || ct.starts_with("text/plain")
            })
            .unwrap_or(false)
    }

}
