//! The API client.
//!
//! [`WeComClient`] owns a [`Transport`] and nothing else. Endpoint methods are
//! added by the modules under [`crate::api`]; each one builds a
//! [`RequestDescriptor`] with the matching free function and submits it here.

use wecom_common::descriptor::RequestDescriptor;
use wecom_common::error::Result;
use wecom_common::response::ApiResponse;
use wecom_common::transport::Transport;

/// WeCom API client over an injected transport
#[derive(Debug, Clone, Default)]
pub struct WeComClient<T> {
    transport: T,
}

impl<T: Transport> WeComClient<T> {
    /// Wrap a transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport, e.g. to swap its access token
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Unwrap the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Submit a prebuilt descriptor.
    ///
    /// Escape hatch for endpoints this crate does not wrap.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, descriptor), fields(method = %descriptor.method(), path = %descriptor.path())))]
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        self.transport.request(descriptor).await
    }
}

#[cfg(feature = "reqwest-client")]
mod basic {
    use wecom_common::error::TransportError;
    use wecom_common::transport::{ReqwestTransport, TransportConfig};

    use super::WeComClient;

    /// Client over the bundled reqwest transport
    pub type BasicClient = WeComClient<ReqwestTransport>;

    impl WeComClient<ReqwestTransport> {
        /// Build a client from transport settings
        pub fn from_config(config: TransportConfig) -> Result<Self, TransportError> {
            Ok(Self::new(ReqwestTransport::new(config)?))
        }

        /// Client against the default API root using `access_token`
        pub fn with_access_token(access_token: impl Into<smol_str::SmolStr>) -> Result<Self, TransportError> {
            Self::from_config(TransportConfig::new().access_token(access_token).build())
        }
    }
}

#[cfg(feature = "reqwest-client")]
pub use basic::BasicClient;
