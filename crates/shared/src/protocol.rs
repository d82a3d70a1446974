use serde_json::Value;
use url::form_urlencoded;

use crate::{domain::ResultEntry, error::ProtocolError};

/// Liveness endpoint; any 2xx/3xx answer means the server is reachable.
pub const HELLO_PATH: &str = "/v1/hello";
/// Poll endpoint returning the entries produced since the previous poll.
pub const CHAMBER_PATH: &str = "/v1/chamber";
/// Command submission endpoint. The trailing slash is part of the route.
pub const MESSAGE_PATH: &str = "/v1/message/";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Outbound request body. The server dispatches on content type, so a plain
/// string must never be sent as JSON and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Json(Value),
}

impl RequestBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text(_) => FORM_CONTENT_TYPE,
            Self::Json(_) => JSON_CONTENT_TYPE,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Text(text) => encode_form_text(text),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

pub fn encode_form_text(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Inverse of [`encode_form_text`], matching what the server does with a
/// submitted command. Invalid UTF-8 sequences decode to U+FFFD.
pub fn decode_form_text(encoded: &str) -> String {
    form_urlencoded::parse(encoded.as_bytes())
        .next()
        .map(|(text, _)| text.into_owned())
        .unwrap_or_default()
}

pub fn decode_chamber_entries(payload: Value) -> Result<Vec<ResultEntry>, ProtocolError> {
    Ok(serde_json::from_value(payload)?)
}
