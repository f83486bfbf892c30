//! Frame handling for the websocket transport.
//!
//! The websocket already delimits messages, so a frame is exactly one JSON
//! object. Inbound frames go through a cheap substring check before the full
//! decode so frames that cannot be requests are skipped without parsing.

use crate::protocol::{Message, REQUEST_TYPE_TAG};

/// Maximum accepted frame size (10 MB)
pub const MAX_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Errors that can occur while decoding or encoding a frame
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    TooLarge(usize),
}

/// Cheap pre-filter: can this frame be a request at all?
#[must_use]
pub fn is_request_frame(frame: &str) -> bool {
    frame.contains(REQUEST_TYPE_TAG)
}

/// Decode an inbound frame.
///
/// Returns `Ok(None)` for frames that are not requests (they fail the
/// pre-filter, or decode to a response).
///
/// # Errors
///
/// Returns an error if a frame that passed the pre-filter is not a valid
/// message, or exceeds [`MAX_FRAME_SIZE`].
pub fn decode_request(frame: &str) -> Result<Option<Message>, FrameError> {
    if frame.len() > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(frame.len()));
    }
    if !is_request_frame(frame) {
        return Ok(None);
    }

    let message: Message = serde_json::from_str(frame)?;
    if !message.is_request() {
        tracing::trace!("Dropping non-request frame for method {}", message.method);
        return Ok(None);
    }
    Ok(Some(message))
}

/// Decode a binary frame, which must hold UTF-8 JSON.
///
/// # Errors
///
/// Returns an error if the bytes are not UTF-8 or [`decode_request`] fails.
pub fn decode_request_bytes(frame: &[u8]) -> Result<Option<Message>, FrameError> {
    decode_request(std::str::from_utf8(frame)?)
}

/// Encode an outbound message.
///
/// # Errors
///
/// Returns an error if the message cannot be serialized or is too large.
pub fn encode(message: &Message) -> Result<String, FrameError> {
    let json = serde_json::to_string(message)?;
    if json.len() > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(json.len()));
    }
    Ok(json)
}
