//! Message protocol for the wisp websocket bridge.
//!
//! The backend and the UI exchange JSON objects over one persistent websocket.
//! Each object is either a request or the response to one, correlated by an
//! id chosen by whoever sent the request.
//!
//! - [`protocol`]: the [`Message`] envelope, [`RequestId`] and method names
//! - [`transport`]: frame pre-filtering, decoding and encoding
//!
//! # Example
//!
//! ```
//! use wisp_rpc::{Message, methods, transport};
//!
//! let request = Message::request("req-1", methods::QUERY, serde_json::json!({"query": "1+2"}));
//! let frame = transport::encode(&request).unwrap();
//! let decoded = transport::decode_request(&frame).unwrap().unwrap();
//! assert_eq!(decoded.id, request.id);
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::{
    Message, MessageType, REQUEST_TYPE_TAG, RESPONSE_TYPE_TAG, RequestId, methods,
};

pub use transport::{FrameError, MAX_FRAME_SIZE};

pub use wisp_types::{
    ActionInvocation, ActionPayload, ImageType, InstalledPlugin, PlainQuery, PreviewPayload,
    QueryPayload, QueryType, RestResponse, ResultPayload, StorePlugin, Theme, WispImage,
};
