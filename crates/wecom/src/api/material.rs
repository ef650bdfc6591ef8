//! Permanent material: files, rich-text news articles, listing and counts.

use serde::{Deserialize, Serialize};
use serde_json::json;
use smol_str::SmolStr;
use wecom_common::descriptor::RequestDescriptor;
use wecom_common::error::{BuildError, Result};
use wecom_common::response::ApiResponse;
use wecom_common::transport::Transport;
use wecom_common::upload::{MediaKind, PayloadSource, UploadRequest, VideoDescription};

use crate::client::WeComClient;

/// `material/add_material`
pub const ADD_MATERIAL: &str = "material/add_material";
/// `material/add_news`
pub const ADD_NEWS: &str = "material/add_news";
/// `material/update_news`
pub const UPDATE_NEWS: &str = "material/update_news";
/// `material/get_material`
pub const GET_MATERIAL: &str = "material/get_material";
/// `material/del_material`
pub const DEL_MATERIAL: &str = "material/del_material";
/// `material/get_materialcount`
pub const GET_MATERIAL_COUNT: &str = "material/get_materialcount";
/// `material/batchget_material`
pub const BATCHGET_MATERIAL: &str = "material/batchget_material";

/// One article of a news material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[builder(start_fn = new)]
pub struct NewsArticle {
    /// Title
    #[builder(into)]
    pub title: String,
    /// Permanent material id of the cover image
    #[builder(into)]
    pub thumb_media_id: SmolStr,
    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub author: Option<String>,
    /// Summary shown in previews
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub digest: Option<String>,
    /// `1` shows the cover in the article body, `0` hides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_cover_pic: Option<u8>,
    /// HTML body
    #[builder(into)]
    pub content: String,
    /// "Read more" link
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub content_source_url: Option<String>,
}

/// A news material: one or more articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    /// Articles, in display order
    pub articles: Vec<NewsArticle>,
}

impl From<Vec<NewsArticle>> for News {
    fn from(articles: Vec<NewsArticle>) -> Self {
        Self { articles }
    }
}

/// Replacement of one article inside an existing news material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[builder(start_fn = new)]
pub struct NewsUpdate {
    /// News material to edit
    #[builder(into)]
    pub media_id: SmolStr,
    /// Position of the article to replace, from 0
    pub index: u32,
    /// New article content
    pub articles: Vec<NewsArticle>,
}

/// Upload a permanent file material of the given kind
pub async fn upload_material(
    source: PayloadSource,
    kind: MediaKind,
) -> std::result::Result<RequestDescriptor, BuildError> {
    UploadRequest::new(source, ADD_MATERIAL)
        .kind(kind)
        .build()
        .await
}

/// Upload a permanent video together with its title and introduction
pub async fn upload_video_material(
    source: PayloadSource,
    description: &VideoDescription,
) -> std::result::Result<RequestDescriptor, BuildError> {
    UploadRequest::new(source, ADD_MATERIAL)
        .kind(MediaKind::Video)
        .description(description)?
        .build()
        .await
}

/// Create a permanent news material
pub fn upload_news_material(news: &News) -> std::result::Result<RequestDescriptor, BuildError> {
    RequestDescriptor::post(ADD_NEWS).json(news)
}

/// Replace an article of a permanent news material
pub fn update_news_material(
    update: &NewsUpdate,
) -> std::result::Result<RequestDescriptor, BuildError> {
    RequestDescriptor::post(UPDATE_NEWS).json(update)
}

/// Fetch a permanent material. The vendor expects the id as a JSON body even
/// though the method is `GET`; files come back as a stream.
pub fn get_material(media_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(GET_MATERIAL)
        .json_value(json!({ "media_id": media_id }))
        .stream_response()
}

/// Delete a permanent material
pub fn remove_material(media_id: &str) -> RequestDescriptor {
    RequestDescriptor::post(DEL_MATERIAL).json_value(json!({ "media_id": media_id }))
}

/// Count permanent materials per kind
pub fn get_material_count() -> RequestDescriptor {
    RequestDescriptor::get(GET_MATERIAL_COUNT)
}

/// List permanent materials of one kind, `count` items from `offset`
pub fn get_materials(kind: MediaKind, offset: u32, count: u32) -> RequestDescriptor {
    RequestDescriptor::post(BATCHGET_MATERIAL).json_value(json!({
        "type": kind,
        "offset": offset,
        "count": count,
    }))
}

/// Response to [`get_material_count`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MaterialCount {
    /// Voice materials
    pub voice_count: u64,
    /// Video materials
    pub video_count: u64,
    /// Image materials
    pub image_count: u64,
    /// News materials
    pub news_count: u64,
}

/// Response to [`get_materials`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaterialList {
    /// Materials of this kind in total
    pub total_count: u64,
    /// Materials in this page
    pub item_count: u64,
    /// This page
    pub item: Vec<MaterialItem>,
}

/// One entry of a [`MaterialList`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MaterialItem {
    /// Material id
    pub media_id: SmolStr,
    /// File name, for file materials
    #[serde(default)]
    pub name: Option<String>,
    /// Last update, as sent
    #[serde(default, deserialize_with = "crate::api::string_or_number")]
    pub update_time: Option<String>,
    /// Article content, for news materials
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

impl<T: Transport> WeComClient<T> {
    /// Upload a permanent file material
    pub async fn upload_material(
        &self,
        source: impl Into<PayloadSource>,
        kind: MediaKind,
    ) -> Result<ApiResponse> {
        let descriptor = upload_material(source.into(), kind).await?;
        self.request(descriptor).await
    }

    /// Upload a permanent image
    pub async fn upload_image_material(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        self.upload_material(source, MediaKind::Image).await
    }

    /// Upload a permanent voice recording
    pub async fn upload_voice_material(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        self.upload_material(source, MediaKind::Voice).await
    }

    /// Upload a permanent thumbnail
    pub async fn upload_thumb_material(&self, source: impl Into<PayloadSource>) -> Result<ApiResponse> {
        self.upload_material(source, MediaKind::Thumb).await
    }

    /// Upload a permanent video with its description
    pub async fn upload_video_material(
        &self,
        source: impl Into<PayloadSource>,
        description: &VideoDescription,
    ) -> Result<ApiResponse> {
        let descriptor = upload_video_material(source.into(), description).await?;
        self.request(descriptor).await
    }

    /// Create a permanent news material
    pub async fn upload_news_material(&self, news: &News) -> Result<ApiResponse> {
        self.request(upload_news_material(news)?).await
    }

    /// Replace an article of a permanent news material
    pub async fn update_news_material(&self, update: &NewsUpdate) -> Result<ApiResponse> {
        self.request(update_news_material(update)?).await
    }

    /// Fetch a permanent material; file bodies are left streaming
    pub async fn get_material(&self, media_id: &str) -> Result<ApiResponse> {
        self.request(get_material(media_id)).await
    }

    /// Delete a permanent material
    pub async fn remove_material(&self, media_id: &str) -> Result<ApiResponse> {
        self.request(remove_material(media_id)).await
    }

    /// Count permanent materials per kind
    pub async fn get_material_count(&self) -> Result<ApiResponse> {
        self.request(get_material_count()).await
    }

    /// List permanent materials of one kind
    pub async fn get_materials(&self, kind: MediaKind, offset: u32, count: u32) -> Result<ApiResponse> {
        self.request(get_materials(kind, offset, count)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, header};
    use wecom_common::descriptor::ResponseType;

    fn article() -> NewsArticle {
        NewsArticle::new()
            .title("Quarterly update")
            .thumb_media_id("THUMB")
            .content("<p>hello</p>")
            .show_cover_pic(1)
            .build()
    }

    #[test]
    fn news_is_posted_as_json() {
        let req = upload_news_material(&News::from(vec![article()])).unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), ADD_NEWS);
        assert_eq!(
            req.json_body().unwrap(),
            &json!({
                "articles": [{
                    "title": "Quarterly update",
                    "thumb_media_id": "THUMB",
                    "show_cover_pic": 1,
                    "content": "<p>hello</p>"
                }]
            })
        );
    }

    #[test]
    fn news_update_targets_update_endpoint() {
        let update = NewsUpdate::new()
            .media_id("NEWS")
            .index(2)
            .articles(vec![article()])
            .build();
        let req = update_news_material(&update).unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "material/update_news");
        let body = req.json_body().unwrap();
        assert_eq!(body["media_id"], "NEWS");
        assert_eq!(body["index"], 2);
        assert_eq!(body["articles"][0]["title"], "Quarterly update");
    }

    #[test]
    fn get_material_is_a_get_with_json_body() {
        let req = get_material("MID");
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.json_body(), Some(&json!({"media_id": "MID"})));
        assert_eq!(
            req.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(req.response_type(), ResponseType::Stream);
    }

    #[test]
    fn listing_and_counting() {
        let req = get_materials(MediaKind::News, 0, 20);
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(
            req.json_body(),
            Some(&json!({"type": "news", "offset": 0, "count": 20}))
        );

        let count = get_material_count();
        assert_eq!(count.method(), &Method::GET);
        assert!(count.json_body().is_none());

        let del = remove_material("MID");
        assert_eq!(del.method(), &Method::POST);
        assert_eq!(del.json_body(), Some(&json!({"media_id": "MID"})));
    }

    #[test]
    fn material_views_decode() {
        let count: MaterialCount = serde_json::from_str(
            r#"{"voice_count":1,"video_count":2,"image_count":3,"news_count":4}"#,
        )
        .unwrap();
        assert_eq!(count.image_count, 3);

        let list: MaterialList = serde_json::from_str(
            r#"{"total_count":1,"item_count":1,"item":[{"media_id":"M","name":"a.jpg","update_time":1500000000}]}"#,
        )
        .unwrap();
        assert_eq!(list.item[0].media_id.as_str(), "M");
        assert_eq!(list.item[0].update_time.as_deref(), Some("1500000000"));
    }
}
