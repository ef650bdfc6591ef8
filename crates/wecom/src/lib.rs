//! # wecom
//!
//! Typed request builders for the WeCom (enterprise WeChat) API and a thin
//! client that submits them through a pluggable [`Transport`].
//!
//! Every endpoint is available two ways:
//! - a pure function in [`api`] returning a [`RequestDescriptor`], for
//!   inspection or for sending through your own stack;
//! - an async method on [`WeComClient`], which builds the descriptor and hands
//!   it to the transport.
//!
//! ```no_run
//! # async fn demo() -> miette::Result<()> {
//! use wecom::BasicClient;
//! use wecom::api::message::TextMessage;
//!
//! let client = BasicClient::with_access_token("ACCESS_TOKEN")?;
//! client
//!     .send_text(&TextMessage::new().touser("u1").agentid(1).content("hi").build())
//!     .await?;
//! let resp = client.upload_image_media(std::path::Path::new("./photo.jpg")).await?;
//! let uploaded: wecom::api::media::UploadResult = resp.json().await?;
//! println!("{}", uploaded.media_id);
//! # Ok(())
//! # }
//! ```
//!
//! Token acquisition and refresh are left to the caller; the bundled
//! [`ReqwestTransport`] simply appends whatever token it was configured with.

#![warn(missing_docs)]

pub mod api;
pub mod client;

pub use wecom_common as common;
pub use wecom_common::{
    ApiResponse, BuildError, ByteStream, ClientError, MediaKind, PayloadSource, RequestDescriptor,
    Transport, VideoDescription,
};
#[cfg(feature = "reqwest-client")]
pub use wecom_common::{ReqwestTransport, TransportConfig};

#[cfg(feature = "reqwest-client")]
pub use client::BasicClient;
pub use client::WeComClient;
