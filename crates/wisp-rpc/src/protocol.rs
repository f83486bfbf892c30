//! Bridge message envelope.
//!
//! ```text
//! { "Id": "...", "Type": "WebsocketMsgTypeRequest", "Method": "Query", "Success": false, "Data": {...} }
//! ```
//!
//! `Id` is assigned by the side that sends the request and echoed unchanged in
//! the response. The bridge never interprets it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const REQUEST_TYPE_TAG: &str = "WebsocketMsgTypeRequest";
pub const RESPONSE_TYPE_TAG: &str = "WebsocketMsgTypeResponse";

/// Method names carried in [`Message::method`]
pub mod methods {
    /// UI -> backend: run a query, `Data = {query, type}`
    pub const QUERY: &str = "Query";
    /// UI -> backend: invoke a result action, `Data = {id}`
    pub const ACTION: &str = "Action";
    /// UI -> backend: UI finished initializing
    pub const UI_READY: &str = "UIReady";
    /// backend -> UI: replace the query box text, `Data = PlainQuery`
    pub const CHANGE_QUERY: &str = "ChangeQuery";
    /// backend -> UI: bring the launcher window up
    pub const SHOW_APP: &str = "ShowApp";
    /// backend -> UI: show a transient message
    pub const SHOW_MESSAGE: &str = "ShowMessage";
}

/// Correlation id of a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl RequestId {
    /// Fresh id for requests originated by the backend.
    #[must_use]
    pub fn random() -> Self {
        RequestId::String(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        RequestId::String(String::new())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "WebsocketMsgTypeRequest")]
    Request,
    #[serde(rename = "WebsocketMsgTypeResponse")]
    Response,
}

/// One bridge message, request or response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    #[serde(default)]
    pub id: RequestId,
    #[serde(rename = "Type")]
    pub kind: MessageType,
    #[serde(default)]
    pub method: String,
    /// Only meaningful on responses
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
}

impl Message {
    #[must_use]
    pub fn request(id: impl Into<RequestId>, method: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            kind: MessageType::Request,
            method: method.into(),
            success: false,
            data,
        }
    }

    /// Successful response to `request`, echoing its id and method.
    #[must_use]
    pub fn success(request: &Message, data: Value) -> Self {
        Self {
            id: request.id.clone(),
            kind: MessageType::Response,
            method: request.method.clone(),
            success: true,
            data,
        }
    }

    /// Failed response to `request`; the error text travels in `Data`.
    #[must_use]
    pub fn failure(request: &Message, message: impl Into<String>) -> Self {
        Self {
            id: request.id.clone(),
            kind: MessageType::Response,
            method: request.method.clone(),
            success: false,
            data: Value::String(message.into()),
        }
    }

    #[must_use]
    pub fn is_request(&self) -> bool {
        self.kind == MessageType::Request
    }

    #[must_use]
    pub fn is_response(&self) -> bool {
        self.kind == MessageType::Response
    }

}
