//! Application messages pushed to members, departments or tags.
//!
//! [`send`] takes any serializable document. The typed helpers cover the
//! common text, card and markdown messages:
//!
//! ```
//! use wecom::api::message::{TextMessage, send_text};
//!
//! let req = send_text(&TextMessage::new().touser("u1").agentid(1).content("hi").build()).unwrap();
//! assert_eq!(req.json_body().unwrap()["msgtype"], "text");
//! ```

use serde::Serialize;
use smol_str::SmolStr;
use wecom_common::descriptor::RequestDescriptor;
use wecom_common::error::{BuildError, Result};
use wecom_common::response::ApiResponse;
use wecom_common::transport::Transport;

use crate::client::WeComClient;

/// `message/send`
pub const SEND: &str = "message/send";

/// Default card button label ("details")
pub const DEFAULT_CARD_BUTTON: &str = "详情";

/// Recipients of a message. Each list is `|`-separated; absent lists are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recipients {
    /// Member ids, or `@all`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub touser: Option<SmolStr>,
    /// Department ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toparty: Option<SmolStr>,
    /// Tag ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totag: Option<SmolStr>,
}

/// Message payload, tagged by `msgtype`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "msgtype", rename_all = "lowercase")]
pub enum MessageBody {
    /// Plain text
    Text {
        /// Text payload
        text: Content,
    },
    /// Text card with a link button
    #[serde(rename = "textcard")]
    TextCard {
        /// Card payload
        textcard: TextCard,
    },
    /// Markdown
    Markdown {
        /// Markdown payload
        markdown: Content,
    },
}

/// `{content}` payload shared by text and markdown messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    /// Message content
    pub content: String,
}

/// Text card payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextCard {
    /// Card title
    pub title: String,
    /// Card description (limited HTML)
    pub description: String,
    /// Link opened by the button
    pub url: String,
    /// Button label
    pub btntxt: String,
}

/// Complete `message/send` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Recipients
    #[serde(flatten)]
    pub recipients: Recipients,
    /// Sending application
    pub agentid: i64,
    /// Payload
    #[serde(flatten)]
    pub body: MessageBody,
}

/// Text message
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
pub struct TextMessage {
    /// Member ids
    #[builder(into)]
    pub touser: Option<SmolStr>,
    /// Department ids
    #[builder(into)]
    pub toparty: Option<SmolStr>,
    /// Tag ids
    #[builder(into)]
    pub totag: Option<SmolStr>,
    /// Sending application
    pub agentid: i64,
    /// Text
    #[builder(into)]
    pub content: String,
}

/// Text card message
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
pub struct CardMessage {
    /// Member ids
    #[builder(into)]
    pub touser: Option<SmolStr>,
    /// Department ids
    #[builder(into)]
    pub toparty: Option<SmolStr>,
    /// Tag ids
    #[builder(into)]
    pub totag: Option<SmolStr>,
    /// Sending application
    pub agentid: i64,
    /// Card title
    #[builder(into)]
    pub title: String,
    /// Card description
    #[builder(into)]
    pub description: String,
    /// Link opened by the button
    #[builder(into)]
    pub url: String,
    /// Button label, [`DEFAULT_CARD_BUTTON`] when absent or empty
    #[builder(into)]
    pub btntxt: Option<String>,
}

/// Markdown message
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
pub struct MarkdownMessage {
    /// Member ids
    #[builder(into)]
    pub touser: Option<SmolStr>,
    /// Department ids
    #[builder(into)]
    pub toparty: Option<SmolStr>,
    /// Tag ids
    #[builder(into)]
    pub totag: Option<SmolStr>,
    /// Sending application
    pub agentid: i64,
    /// Markdown source
    #[builder(into)]
    pub content: String,
}

impl From<&TextMessage> for Message {
    fn from(msg: &TextMessage) -> Self {
        Message {
            recipients: Recipients {
                touser: msg.touser.clone(),
                toparty: msg.toparty.clone(),
                totag: msg.totag.clone(),
            },
            agentid: msg.agentid,
            body: MessageBody::Text {
                text: Content {
                    content: msg.content.clone(),
                },
            },
        }
    }
}

impl From<&CardMessage> for Message {
    fn from(msg: &CardMessage) -> Self {
        let btntxt = msg
            .btntxt
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_CARD_BUTTON)
            .to_owned();
        Message {
            recipients: Recipients {
                touser: msg.touser.clone(),
                toparty: msg.toparty.clone(),
                totag: msg.totag.clone(),
            },
            agentid: msg.agentid,
            body: MessageBody::TextCard {
                textcard: TextCard {
                    title: msg.title.clone(),
                    description: msg.description.clone(),
                    url: msg.url.clone(),
                    btntxt,
                },
            },
        }
    }
}

impl From<&MarkdownMessage> for Message {
    fn from(msg: &MarkdownMessage) -> Self {
        Message {
            recipients: Recipients {
                touser: msg.touser.clone(),
                toparty: msg.toparty.clone(),
                totag: msg.totag.clone(),
            },
            agentid: msg.agentid,
            body: MessageBody::Markdown {
                markdown: Content {
                    content: msg.content.clone(),
                },
            },
        }
    }
}

/// Send an arbitrary message document
pub fn send<M: Serialize + ?Sized>(message: &M) -> std::result::Result<RequestDescriptor, BuildError> {
    RequestDescriptor::post(SEND).json(message)
}

/// Send a text message
pub fn send_text(message: &TextMessage) -> std::result::Result<RequestDescriptor, BuildError> {
    send(&Message::from(message))
}

/// Send a text card; the button label defaults to [`DEFAULT_CARD_BUTTON`]
pub fn send_card(message: &CardMessage) -> std::result::Result<RequestDescriptor, BuildError> {
    send(&Message::from(message))
}

/// Send a markdown message
pub fn send_markdown(message: &MarkdownMessage) -> std::result::Result<RequestDescriptor, BuildError> {
    send(&Message::from(message))
}

impl<T: Transport> WeComClient<T> {
    /// Send an arbitrary message document
    pub async fn send<M: Serialize + ?Sized>(&self, message: &M) -> Result<ApiResponse> {
        self.request(send(message)?).await
    }

    /// Send a text message
    pub async fn send_text(&self, message: &TextMessage) -> Result<ApiResponse> {
        self.request(send_text(message)?).await
    }

    /// Send a text card
    pub async fn send_card(&self, message: &CardMessage) -> Result<ApiResponse> {
        self.request(send_card(message)?).await
    }

    /// Send a markdown message
    pub async fn send_markdown(&self, message: &MarkdownMessage) -> Result<ApiResponse> {
        self.request(send_markdown(message)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    #[test]
    fn text_message_omits_absent_recipients() {
        let req = send_text(&TextMessage::new().touser("u1").agentid(1).content("hi").build()).unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "message/send");
        assert_eq!(
            req.json_body().unwrap(),
            &json!({"touser": "u1", "agentid": 1, "msgtype": "text", "text": {"content": "hi"}})
        );
    }

    #[test]
    fn card_button_defaults_to_details() {
        let card = CardMessage::new()
            .toparty("2|3")
            .agentid(1000002)
            .title("Delivery")
            .description("<div class=\"gray\">today</div>")
            .url("https://example.com/parcel")
            .build();
        let body = send_card(&card).unwrap().json_body().unwrap().clone();
        assert_eq!(
            body,
            json!({
                "toparty": "2|3",
                "agentid": 1000002,
                "msgtype": "textcard",
                "textcard": {
                    "title": "Delivery",
                    "description": "<div class=\"gray\">today</div>",
                    "url": "https://example.com/parcel",
                    "btntxt": "详情"
                }
            })
        );

        let empty = CardMessage { btntxt: Some(String::new()), ..card.clone() };
        assert_eq!(
            send_card(&empty).unwrap().json_body().unwrap()["textcard"]["btntxt"],
            "详情"
        );

        let custom = CardMessage { btntxt: Some("Open".into()), ..card };
        assert_eq!(
            send_card(&custom).unwrap().json_body().unwrap()["textcard"]["btntxt"],
            "Open"
        );
    }

    #[test]
    fn markdown_message() {
        let msg = MarkdownMessage::new()
            .totag("1")
            .agentid(7)
            .content("**bold**")
            .build();
        assert_eq!(
            send_markdown(&msg).unwrap().json_body().unwrap(),
            &json!({"totag": "1", "agentid": 7, "msgtype": "markdown", "markdown": {"content": "**bold**"}})
        );
    }

    #[test]
    fn arbitrary_documents_pass_through() {
        let doc = json!({"touser": "@all", "msgtype": "image", "agentid": 1, "image": {"media_id": "M"}, "safe": 0});
        let req = send(&doc).unwrap();
        assert_eq!(req.json_body(), Some(&doc));
    }
}
