use std::collections::VecDeque;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde_json::json;
use tokio::sync::Mutex;
use wecom::api::customer::{ContactScene, ContactType, ContactWay};
use wecom::api::material::{self, MaterialCount};
use wecom::api::media::{self, UploadResult};
use wecom::api::message::{CardMessage, TextMessage};
use wecom::common::descriptor::ResponseType;
use wecom::common::error::{BuildError, VendorApiError};
use wecom::common::stream::ByteStream;
use wecom::{
    ApiResponse, ClientError, MediaKind, PayloadSource, RequestDescriptor, Transport,
    VideoDescription, WeComClient,
};

#[derive(Clone, Default)]
struct MockTransport {
    queue: Arc<Mutex<VecDeque<Result<ApiResponse, ClientError>>>>,
    log: Arc<Mutex<Vec<RequestDescriptor>>>,
}

impl MockTransport {
    async fn push(&self, resp: Result<ApiResponse, ClientError>) {
        self.queue.lock().await.push_back(resp);
    }

    async fn requests(&self) -> Vec<RequestDescriptor> {
        self.log.lock().await.clone()
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<ApiResponse, ClientError>> + Send {
        let log = self.log.clone();
        let queue = self.queue.clone();
        async move {
            log.lock().await.push(request);
            queue
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::json_ok(&json!({"errcode": 0, "errmsg": "ok"}))))
        }
    }
}

fn client() -> (WeComClient<MockTransport>, MockTransport) {
    let mock = MockTransport::default();
    (WeComClient::new(mock.clone()), mock)
}

fn temp_file(dir: &tempfile::TempDir, name: &str, len: usize) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&vec![0x5a; len]).unwrap();
    path
}

#[tokio::test]
async fn send_text_posts_the_expected_document() {
    let (client, mock) = client();
    let resp = client
        .send_text(&TextMessage::new().touser("u1").agentid(1).content("hi").build())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let sent = mock.requests().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method(), &Method::POST);
    assert_eq!(sent[0].path(), "message/send");
    assert_eq!(
        sent[0].json_body().unwrap(),
        &json!({"touser": "u1", "agentid": 1, "msgtype": "text", "text": {"content": "hi"}})
    );
}

#[tokio::test]
async fn card_defaults_button_label_through_the_client() {
    let (client, mock) = client();
    client
        .send_card(
            &CardMessage::new()
                .touser("@all")
                .agentid(1)
                .title("t")
                .description("d")
                .url("https://example.com")
                .build(),
        )
        .await
        .unwrap();
    let sent = mock.requests().await;
    assert_eq!(sent[0].json_body().unwrap()["textcard"]["btntxt"], "详情");
}

#[tokio::test]
async fn media_shortcuts_match_generic_upload() {
    let dir = tempfile::tempdir().unwrap();
    let (client, mock) = client();

    for (i, kind) in MediaKind::UPLOADABLE.into_iter().enumerate() {
        let path = temp_file(&dir, &format!("file-{kind}.bin"), 100 + i);
        let resp = match kind {
            MediaKind::Image => client.upload_image_media(path.as_path()).await,
            MediaKind::Voice => client.upload_voice_media(path.as_path()).await,
            MediaKind::Video => client.upload_video_media(path.as_path()).await,
            MediaKind::Thumb => client.upload_thumb_media(path.as_path()).await,
            MediaKind::News => unreachable!(),
        };
        resp.unwrap();

        let expected = media::upload_media(PayloadSource::path(&path), kind)
            .await
            .unwrap();
        let sent = mock.requests().await;
        let actual = sent.last().unwrap();
        assert_eq!(actual, &expected);
        assert_eq!(actual.query_param("type"), Some(kind.as_str()));
        assert_eq!(
            actual.multipart_body().unwrap().part("media").unwrap().size(),
            (100 + i) as u64
        );
    }
}

#[tokio::test]
async fn material_shortcuts_match_generic_upload() {
    let (client, mock) = client();
    let source = || PayloadSource::buffer(Bytes::from_static(b"\x00\x01"), "x.bin", "application/octet-stream");

    client.upload_image_material(source()).await.unwrap();
    client.upload_voice_material(source()).await.unwrap();
    client.upload_thumb_material(source()).await.unwrap();

    let sent = mock.requests().await;
    for (req, kind) in sent.iter().zip([MediaKind::Image, MediaKind::Voice, MediaKind::Thumb]) {
        let expected = material::upload_material(source(), kind).await.unwrap();
        assert_eq!(req.path(), "material/add_material");
        assert_eq!(req, &expected);
    }
}

#[tokio::test]
async fn video_material_carries_its_description() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(&dir, "intro.mp4", 2048);
    let description = VideoDescription::new("Intro", "A short introduction");

    let (client, mock) = client();
    client
        .upload_video_material(path.as_path(), &description)
        .await
        .unwrap();

    let sent = mock.requests().await;
    let req = &sent[0];
    assert_eq!(req.method(), &Method::POST);
    assert_eq!(req.path(), "material/add_material");
    assert_eq!(req.query_param("type"), Some("video"));
    let form = req.multipart_body().unwrap();
    assert_eq!(form.part("media").unwrap().filename(), Some("intro.mp4"));
    assert_eq!(form.part("media").unwrap().content_type(), Some("video/mp4"));
    let decoded: VideoDescription =
        serde_json::from_str(form.part("description").unwrap().text().unwrap()).unwrap();
    assert_eq!(decoded, description);
}

#[tokio::test]
async fn missing_file_never_reaches_the_transport() {
    let (client, mock) = client();
    let err = client
        .upload_media(PathBuf::from("./no/such/photo.jpg"), MediaKind::Image)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Build(BuildError::FileNotFound { .. })
    ));
    assert!(mock.requests().await.is_empty());
}

#[tokio::test]
async fn vendor_errors_propagate_unchanged() {
    let (client, mock) = client();
    mock.push(Err(VendorApiError {
        errcode: 40014,
        errmsg: "invalid access_token".into(),
    }
    .into()))
        .await;
    let err = client.get_material_count().await.unwrap_err();
    match err {
        ClientError::Vendor(v) => assert_eq!(v.errcode, 40014),
        other => panic!("expected vendor error, got {other:?}"),
    }
}

#[tokio::test]
async fn typed_views_decode_from_responses() {
    let (client, mock) = client();
    mock.push(Ok(ApiResponse::json_ok(&json!({
        "errcode": 0, "errmsg": "ok",
        "voice_count": 1, "video_count": 2, "image_count": 3, "news_count": 4
    }))))
    .await;
    mock.push(Ok(ApiResponse::json_ok(&json!({
        "type": "thumb", "media_id": "THUMB_ID", "created_at": "1380000000"
    }))))
    .await;

    let count: MaterialCount = client.get_material_count().await.unwrap().json().await.unwrap();
    assert_eq!(
        count,
        MaterialCount {
            voice_count: 1,
            video_count: 2,
            image_count: 3,
            news_count: 4
        }
    );

    let uploaded: UploadResult = client
        .upload_thumb_media(PayloadSource::buffer(&b"jpg"[..], "t.jpg", "image/jpeg"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(uploaded.kind, Some(MediaKind::Thumb));
    assert_eq!(uploaded.media_id.as_str(), "THUMB_ID");
}

#[tokio::test]
async fn downloads_request_a_stream() {
    let (client, mock) = client();
    mock.push(Ok(ApiResponse::streaming(
        http::StatusCode::OK,
        http::HeaderMap::new(),
        ByteStream::new(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cd")),
        ])),
    )))
    .await;

    let body = client
        .get_material("MID")
        .await
        .unwrap()
        .into_stream()
        .collect_bytes()
        .await
        .unwrap();
    assert_eq!(&body[..], b"abcd");

    client.get_media("M2").await.unwrap();
    let sent = mock.requests().await;
    assert_eq!(sent[0].method(), &Method::GET);
    assert_eq!(sent[0].path(), "material/get_material");
    assert_eq!(sent[0].json_body(), Some(&json!({"media_id": "MID"})));
    assert_eq!(sent[0].response_type(), ResponseType::Stream);
    assert_eq!(sent[1].path(), "media/get");
    assert_eq!(sent[1].query_param("media_id"), Some("M2"));
    assert_eq!(sent[1].response_type(), ResponseType::Stream);
}

#[tokio::test]
async fn customer_endpoints() {
    let (client, mock) = client();
    client
        .get_customer_contacts(&json!({"cursor": ""}))
        .await
        .unwrap();
    client.get_external_contact("wmEXT").await.unwrap();
    client
        .add_contact_way(
            &ContactWay::new()
                .contact_type(ContactType::Multi)
                .scene(ContactScene::MiniProgram)
                .style(1)
                .party(vec![1, 2])
                .build(),
        )
        .await
        .unwrap();
    client.del_contact_way("cfg").await.unwrap();

    let sent = mock.requests().await;
    let paths: Vec<_> = sent.iter().map(|r| r.path().to_string()).collect();
    assert_eq!(
        paths,
        [
            "crm/get_customer_contacts",
            "crm/get_external_contact",
            "crm/add_contact_way",
            "crm/del_contact_way"
        ]
    );
    assert_eq!(sent[0].method(), &Method::POST);
    assert_eq!(sent[0].json_body(), Some(&json!({"cursor": ""})));
    assert_eq!(sent[1].query_param("external_userid"), Some("wmEXT"));
    assert_eq!(
        sent[2].json_body(),
        Some(&json!({"type": 2, "scene": 1, "style": 1, "party": [1, 2]}))
    );
    assert_eq!(sent[3].json_body(), Some(&json!({"config_id": "cfg"})));
}

#[tokio::test]
async fn shared_transport_behind_arc() {
    let mock = MockTransport::default();
    let client = WeComClient::new(Arc::new(mock.clone()));
    client.remove_material("MID").await.unwrap();
    let sent = mock.requests().await;
    assert_eq!(sent[0].path(), "material/del_material");
}
