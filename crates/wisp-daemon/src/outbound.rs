//! Outbound side of the bridge: encode once, broadcast to the attached UI.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, trace, warn};
use wisp_rpc::{Message, RequestId, transport};

use crate::error::Result;
use crate::session::SessionRegistry;

/// Cloneable handle for pushing messages to the UI
#[derive(Debug, Clone)]
pub struct Outbound {
    sessions: Arc<SessionRegistry>,
}

impl Outbound {
    #[must_use]
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Broadcast a message. An encode failure is logged and nothing is sent.
    ///
    /// Returns how many sessions accepted the frame.
    pub fn send(&self, message: &Message) -> usize {
        let frame = match transport::encode(message) {
            Ok(frame) => frame,
            Err(e) => {
                error!(
                    "Failed to encode {} message {}: {e}",
                    message.method, message.id
                );
                return 0;
            }
        };
        let delivered = self.sessions.broadcast(&frame);
        trace!(
            "Broadcast {} {} to {delivered} session(s)",
            message.method, message.id
        );
        delivered
    }

    /// Answer `request` with a handler outcome, echoing its id.
    pub fn respond(&self, request: &Message, outcome: Result<Value>) -> usize {
        let response = match outcome {
            Ok(data) => Message::success(request, data),
            Err(e) => {
                warn!("{} request {} failed: {e}", request.method, request.id);
                e.to_response(request)
            }
        };
        self.send(&response)
    }

    /// Send a backend-originated request to the UI with a fresh id.
    pub fn request_ui(&self, method: &str, data: Value) -> RequestId {
        info!("[->UI] {method}: {data}");
        let message = Message::request(RequestId::random(), method, data);
        self.send(&message);
        message.id
    }
}
