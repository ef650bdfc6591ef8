//! Temporary media: upload, download, inline images.

use serde::Deserialize;
use smol_str::SmolStr;
use wecom_common::descriptor::RequestDescriptor;
use wecom_common::error::{BuildError, Result};
use wecom_common::response::ApiResponse;
use wecom_common::transport::Transport;
use wecom_common::upload::{MediaKind, PayloadSource, build_upload_request};

use crate::client::WeComClient;

/// `media/upload`
pub const UPLOAD_MEDIA: &str = "media/upload";
/// `media/get`
pub const GET_MEDIA: &str = "media/get";
/// `media/get/jssdk`
pub const GET_MEDIA_HD: &str = "media/get/jssdk";
/// `media/uploadimg`
pub const UPLOAD_IMAGE: &str = "media/uploadimg";

/// Upload temporary media of the given kind
pub async fn upload_media(
    source: PayloadSource,
    kind: MediaKind,
) -> std::result::Result<RequestDescriptor, BuildError> {
    build_upload_request(source, Some(kind), UPLOAD_MEDIA).await
}

/// Download temporary media
pub fn get_media(media_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(GET_MEDIA)
        .query("media_id", media_id)
        .stream_response()
}

/// Download a high-definition voice recording uploaded through JS-SDK
pub fn get_media_hd(media_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(GET_MEDIA_HD)
        .query("media_id", media_id)
        .stream_response()
}

/// Upload an image for use inside message bodies; the response carries a URL
pub async fn upload_image(
    source: PayloadSource,
) -> std::result::Result<RequestDescriptor, BuildError> {
    build_upload_request(source, None, UPLOAD_IMAGE).await
}

/// Response to a media or material upload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    /// Media kind echoed back by the server
    #[serde(rename = "type", default)]
    pub kind: Option<MediaKind>,
    /// Identifier for later downloads and messages
    pub media_id: SmolStr,
    /// Upload timestamp, as sent
    #[serde(default, deserialize_with = "crate::api::string_or_number")]
    pub created_at: Option<String>,
}

/// Response to [`upload_image`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageUrl {
    /// Public URL of the uploaded image
    pub url: String,
}

impl<T: Transport> WeComClient<T> {
    /// Upload temporary media of the given kind
    pub async fn upload_media(
        &self,
        source: impl Into<PayloadSource>,
        kind: MediaKind,
    ) -> Result<ApiResponse> {
        let descriptor = upload_media(source.into(), kind).await?;
        self.request(descriptor).await
    }

    /// Upload a temporary image
    pub async fn upload_image_media(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        self.upload_media(source, MediaKind::Image).await
    }

    /// Upload a temporary voice recording
    pub async fn upload_voice_media(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        self.upload_media(source, MediaKind::Voice).await
    }

    /// Upload a temporary video
    pub async fn upload_video_media(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        self.upload_media(source, MediaKind::Video).await
    }

    /// Upload a temporary thumbnail
    pub async fn upload_thumb_media(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        self.upload_media(source, MediaKind::Thumb).await
    }

    /// Download temporary media; the body is left streaming
    pub async fn get_media(&self, media_id: &str) -> Result<ApiResponse> {
        self.request(get_media(media_id)).await
    }

    /// Download high-definition voice; the body is left streaming
    pub async fn get_media_hd(&self, media_id: &str) -> Result<ApiResponse> {
        self.request(get_media_hd(media_id)).await
    }

    /// Upload an image for use inside message bodies
    pub async fn upload_image(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        let descriptor = upload_image(source.into()).await?;
        self.request(descriptor).await
    }
}
