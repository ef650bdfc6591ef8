//! # Request descriptors
//!
//! A [`RequestDescriptor`] is everything a transport needs to perform one API
//! call: method, path relative to the API root, query parameters, headers, a
//! body and a hint about how the response should be read. Descriptors are
//! built with a consuming builder and handed to a
//! [`Transport`](crate::transport::Transport) exactly once.
//!
//! Authentication (the `access_token` query parameter) and the API base URL are
//! the transport's business and never appear here.

use std::collections::BTreeMap;

use http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use serde::Serialize;
use smol_str::SmolStr;
use url::Url;

use crate::error::BuildError;
use crate::multipart::MultipartBody;

/// How the transport should hand back the response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// Buffer the body; it is expected to be JSON
    #[default]
    Json,
    /// Expose the body as a byte stream (media downloads)
    Stream,
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(serde_json::Value),
    /// `multipart/form-data` upload
    Multipart(MultipartBody),
}

/// A fully-formed API request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: SmolStr,
    headers: HeaderMap,
    query: BTreeMap<SmolStr, String>,
    body: RequestBody,
    response_type: ResponseType,
}

impl RequestDescriptor {
    /// Start a descriptor with an explicit method
    pub fn new(method: Method, path: impl Into<SmolStr>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: BTreeMap::new(),
            body: RequestBody::Empty,
            response_type: ResponseType::Json,
        }
    }

    /// Start a `GET` descriptor
    pub fn get(path: impl Into<SmolStr>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Start a `POST` descriptor
    pub fn post(path: impl Into<SmolStr>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add or replace a query parameter
    pub fn query(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add or replace a header
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `payload` as the JSON body and set `Content-Type: application/json`
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, BuildError> {
        let value = serde_json::to_value(payload)?;
        Ok(self.json_value(value))
    }

    /// Use an already-built JSON value as the body
    pub fn json_value(mut self, value: serde_json::Value) -> Self {
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = RequestBody::Json(value);
        self
    }

    /// Use a multipart form as the body.
    ///
    /// `Content-Type` (with its boundary) and `Content-Length` are set by the
    /// transport when the form is encoded; any `Content-Type` set earlier is dropped.
    pub fn multipart(mut self, form: MultipartBody) -> Self {
        self.headers.remove(header::CONTENT_TYPE);
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Ask the transport for a streamed response body
    pub fn stream_response(mut self) -> Self {
        self.response_type = ResponseType::Stream;
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API root, e.g. `media/upload`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Query parameters, sorted by key
    pub fn query_params(&self) -> &BTreeMap<SmolStr, String> {
        &self.query
    }

    /// Look up a single query parameter
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Request body
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// JSON body, if any
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Multipart body, if any
    pub fn multipart_body(&self) -> Option<&MultipartBody> {
        match &self.body {
            RequestBody::Multipart(form) => Some(form),
            _ => None,
        }
    }

    /// Response handling hint
    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    /// Resolve the full URL against an API base such as
    /// `https://qyapi.weixin.qq.com/cgi-bin/`.
    ///
    /// The base should end with `/`; a missing slash is added so the last path
    /// segment of the base is kept.
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut url = base.join(self.path.trim_start_matches('/'))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Split into owned parts for sending
    pub fn into_parts(self) -> Parts {
        Parts {
            method: self.method,
            path: self.path,
            headers: self.headers,
            query: self.query,
            body: self.body,
            response_type: self.response_type,
        }
    }
}

/// Owned pieces of a [`RequestDescriptor`]
#[derive(Debug)]
pub struct Parts {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API root
    pub path: SmolStr,
    /// Request headers
    pub headers: HeaderMap,
    /// Query parameters
    pub query: BTreeMap<SmolStr, String>,
    /// Request body
    pub body: RequestBody,
    /// Response handling hint
    pub response_type: ResponseType,
}
