//! External contacts ("customer contact") and the "contact me" configuration.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use smol_str::SmolStr;
use wecom_common::descriptor::RequestDescriptor;
use wecom_common::error::{BuildError, Result};
use wecom_common::response::ApiResponse;
use wecom_common::transport::Transport;

use crate::client::WeComClient;

/// `crm/get_customer_contacts`
pub const GET_CUSTOMER_CONTACTS: &str = "crm/get_customer_contacts";
/// `crm/get_external_contact_list`
pub const GET_EXTERNAL_CONTACT_LIST: &str = "crm/get_external_contact_list";
/// `crm/get_external_contact`
pub const GET_EXTERNAL_CONTACT: &str = "crm/get_external_contact";
/// `crm/add_contact_way`
pub const ADD_CONTACT_WAY: &str = "crm/add_contact_way";
/// `crm/get_contact_way`
pub const GET_CONTACT_WAY: &str = "crm/get_contact_way";
/// `crm/update_contact_way`
pub const UPDATE_CONTACT_WAY: &str = "crm/update_contact_way";
/// `crm/del_contact_way`
pub const DEL_CONTACT_WAY: &str = "crm/del_contact_way";

/// Who answers a "contact me" entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactType {
    /// A single member (`1`)
    Single,
    /// Several members or departments (`2`)
    Multi,
}

/// Where a "contact me" entry is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactScene {
    /// Inside a mini program (`1`)
    MiniProgram,
    /// Through a QR code (`2`)
    QrCode,
}

impl Serialize for ContactType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::Single => 1,
            Self::Multi => 2,
        })
    }
}

impl Serialize for ContactScene {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::MiniProgram => 1,
            Self::QrCode => 2,
        })
    }
}

/// A new "contact me" entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, bon::Builder)]
#[builder(start_fn = new)]
pub struct ContactWay {
    /// Single or multi member
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    /// Mini program or QR code
    pub scene: ContactScene,
    /// Widget style, for mini program entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u8>,
    /// Free-form note, at most 30 characters
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub remark: Option<String>,
    /// Whether customers are added without confirmation (vendor default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_verify: Option<bool>,
    /// Channel marker echoed back in external contact details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub state: Option<String>,
    /// Member ids; exactly one for [`ContactType::Single`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Vec<SmolStr>>,
    /// Department ids, for [`ContactType::Multi`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<Vec<i64>>,
}

/// Changes to an existing "contact me" entry; absent fields are left as they are
#[derive(Debug, Clone, PartialEq, Eq, Serialize, bon::Builder)]
#[builder(start_fn = new)]
pub struct ContactWayUpdate {
    /// Entry to change
    #[builder(into)]
    pub config_id: SmolStr,
    /// Free-form note
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub remark: Option<String>,
    /// Whether customers are added without confirmation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_verify: Option<bool>,
    /// Widget style
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u8>,
    /// Channel marker
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub state: Option<String>,
    /// Member ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Vec<SmolStr>>,
    /// Department ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<Vec<i64>>,
}

/// Members with the customer contact feature enabled
pub fn get_customer_contacts<P: Serialize + ?Sized>(
    payload: &P,
) -> std::result::Result<RequestDescriptor, BuildError> {
    RequestDescriptor::post(GET_CUSTOMER_CONTACTS).json(payload)
}

/// External contacts of one member
pub fn get_external_contact_list(user_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(GET_EXTERNAL_CONTACT_LIST).query("userid", user_id)
}

/// Details of one external contact
pub fn get_external_contact(external_user_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(GET_EXTERNAL_CONTACT).query("external_userid", external_user_id)
}

/// Create a "contact me" entry
pub fn add_contact_way(way: &ContactWay) -> std::result::Result<RequestDescriptor, BuildError> {
    RequestDescriptor::post(ADD_CONTACT_WAY).json(way)
}

/// Fetch a "contact me" entry
pub fn get_contact_way(config_id: &str) -> RequestDescriptor {
    RequestDescriptor::post(GET_CONTACT_WAY).json_value(json!({ "config_id": config_id }))
}

/// Change a "contact me" entry
pub fn update_contact_way(
    update: &ContactWayUpdate,
) -> std::result::Result<RequestDescriptor, BuildError> {
    RequestDescriptor::post(UPDATE_CONTACT_WAY).json(update)
}

/// Delete a "contact me" entry
pub fn del_contact_way(config_id: &str) -> RequestDescriptor {
    RequestDescriptor::post(DEL_CONTACT_WAY).json_value(json!({ "config_id": config_id }))
}

/// Response to [`add_contact_way`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactWayCreated {
    /// Identifier of the new entry
    pub config_id: SmolStr,
}

/// Response to [`get_external_contact_list`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalContactList {
    /// External user ids
    #[serde(default)]
    pub external_userid: Vec<SmolStr>,
}

impl<T: Transport> WeComClient<T> {
    /// Members with the customer contact feature enabled
    pub async fn get_customer_contacts<P: Serialize + ?Sized>(&self, payload: &P) -> Result<ApiResponse> {
        self.request(get_customer_contacts(payload)?).await
    }

    /// External contacts of one member
    pub async fn get_external_contact_list(&self, user_id: &str) -> Result<ApiResponse> {
        self.request(get_external_contact_list(user_id)).await
    }

    /// Details of one external contact
    pub async fn get_external_contact(&self, external_user_id: &str) -> Result<ApiResponse> {
        self.request(get_external_contact(external_user_id)).await
    }

    /// Create a "contact me" entry
    pub async fn add_contact_way(&self, way: &ContactWay) -> Result<ApiResponse> {
        self.request(add_contact_way(way)?).await
    }

    /// Fetch a "contact me" entry
    pub async fn get_contact_way(&self, config_id: &str) -> Result<ApiResponse> {
        self.request(get_contact_way(config_id)).await
    }

    /// Change a "contact me" entry
    pub async fn update_contact_way(&self, update: &ContactWayUpdate) -> Result<ApiResponse> {
        self.request(update_contact_way(update)?).await
    }

    /// Delete a "contact me" entry
    pub async fn del_contact_way(&self, config_id: &str) -> Result<ApiResponse> {
        self.request(del_contact_way(config_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn external_contact_binds_its_argument() {
        let req = get_external_contact("wmXYZ");
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.path(), "crm/get_external_contact");
        assert_eq!(req.query_param("external_userid"), Some("wmXYZ"));
        assert_eq!(req.query_params().len(), 1);

        let list = get_external_contact_list("zhangsan");
        assert_eq!(list.query_param("userid"), Some("zhangsan"));
    }

    #[test]
    fn contact_way_serializes_codes_and_skips_absent_fields() {
        let way = ContactWay::new()
            .contact_type(ContactType::Single)
            .scene(ContactScene::QrCode)
            .remark("channel A")
            .skip_verify(true)
            .user(vec![SmolStr::new("UserID1")])
            .build();
        let req = add_contact_way(&way).unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(
            req.json_body().unwrap(),
            &json!({
                "type": 1,
                "scene": 2,
                "remark": "channel A",
                "skip_verify": true,
                "user": ["UserID1"]
            })
        );
    }

    #[test]
    fn contact_way_crud_bodies() {
        assert_eq!(
            get_contact_way("cfg").json_body(),
            Some(&json!({"config_id": "cfg"}))
        );
        assert_eq!(del_contact_way("cfg").path(), "crm/del_contact_way");

        let update = ContactWayUpdate::new()
            .config_id("cfg")
            .party(vec![2, 3])
            .build();
        assert_eq!(
            update_contact_way(&update).unwrap().json_body(),
            Some(&json!({"config_id": "cfg", "party": [2, 3]}))
        );
    }

    #[test]
    fn created_view_decodes() {
        let created: ContactWayCreated = serde_json::from_str(
            r#"{"errcode":0,"errmsg":"ok","config_id":"42b34949e138eb6e027c123cba77fad7"}"#,
        )
        .unwrap();
        assert_eq!(created.config_id.as_str(), "42b34949e138eb6e027c123cba77fad7");
    }
}
