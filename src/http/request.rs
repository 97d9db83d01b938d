//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Define the typed request schema for each method
//! - Decode JSON bodies into that schema at the boundary
//!
//! # Design Decisions
//! - An empty body decodes as `{}` so missing fields surface as field errors
//! - Unparseable JSON and well-formed JSON of the wrong shape are reported apart
//! - `id` accepts a JSON number or a numeric string
//! - A repeated `search` parameter uses its first value

use axum::http::{HeaderName, HeaderValue, Request};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::error::Category;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use uuid::Uuid;

use crate::contacts::{ContactDraft, ContactId};
use crate::http::response::ApiError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Produces UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Assigns `x-request-id` to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuidV4> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4)
}

/// Copies `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Query string of a GET request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    /// Build from decoded query pairs. Unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let search = pairs
            .into_iter()
            .find(|(key, _)| key == "search")
            .map(|(_, value)| value);
        Self { search }
    }
}

/// Body of a PUT request.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateContactRequest {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<ContactId>,
    #[serde(flatten)]
    pub contact: ContactDraft,
}

/// Body of a DELETE request.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteContactRequest {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<ContactId>,
}

/// Decode a JSON body. Blank bodies decode as an empty object.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => ApiError::InvalidBody(e.to_string()),
        Category::Syntax | Category::Eof | Category::Io => ApiError::MalformedBody(e.to_string()),
    })
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<ContactId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Number(ContactId),
        Text(String),
    }

    match Option::<IdRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdRepr::Number(id)) => Ok(Some(id)),
        Some(IdRepr::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid contact id {:?}", text))),
    }
}
