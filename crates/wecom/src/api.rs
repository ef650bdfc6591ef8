//! Endpoint families.
//!
//! Every module exposes pure functions returning a [`RequestDescriptor`](wecom_common::RequestDescriptor)
//! (no I/O beyond stat'ing upload files) and an `impl` block adding the same
//! operations as async methods on [`WeComClient`](crate::WeComClient).
//! Responses are handed back untouched; the typed views in each module can be
//! decoded with [`ApiResponse::json`](wecom_common::ApiResponse::json).

pub mod customer;
pub mod material;
pub mod media;
pub mod message;

use serde::{Deserialize, Deserializer};

/// The vendor sends some timestamps and ids as strings in one endpoint and as
/// numbers in another. Keep whatever arrives as text.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => Some(s),
        Some(Raw::Num(n)) => Some(n.to_string()),
        None => None,
    })
}
