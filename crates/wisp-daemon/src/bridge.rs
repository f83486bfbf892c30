//! Message bridge between the backend and the UI.
//!
//! The bridge owns the session registry and the connection lifecycle and
//! dispatches every inbound request on its own task. It keeps no table of
//! pending requests: each response simply echoes the id of the request that
//! produced it and is broadcast, and the UI does the matching.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, trace};
use wisp_core::TraceContext;
use wisp_rpc::{FrameError, Message, methods, transport};

use crate::error::Result;
use crate::lifecycle::{ConnectionLifecycle, ConnectionPhase};
use crate::outbound::Outbound;
use crate::session::{FrameSender, SessionId, SessionRegistry};

/// Resolves an inbound request to its response payload.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(
        &self,
        ctx: &TraceContext,
        request: &Message,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Runs once per daemon lifetime when the UI is considered ready
pub type ReadyHook = Arc<dyn Fn(&Outbound) + Send + Sync>;

pub struct Bridge<H> {
    outbound: Outbound,
    lifecycle: ConnectionLifecycle,
    handler: H,
    ready_hook: Option<ReadyHook>,
}

impl<H: RequestHandler> Bridge<H> {
    #[must_use]
    pub fn new(handler: H, settle_delay: Duration) -> Self {
        Self {
            outbound: Outbound::new(Arc::new(SessionRegistry::new())),
            lifecycle: ConnectionLifecycle::new(settle_delay),
            handler,
            ready_hook: None,
        }
    }

    #[must_use]
    pub fn with_ready_hook(mut self, hook: impl Fn(&Outbound) + Send + Sync + 'static) -> Self {
        self.ready_hook = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    #[must_use]
    pub fn lifecycle(&self) -> &ConnectionLifecycle {
        &self.lifecycle
    }

    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Attach a UI session. The first connection since startup arms the
    /// ready hook to fire after the settle delay.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DaemonError::SessionRejected`] if a UI is already attached.
    pub fn connect(self: &Arc<Self>, sender: FrameSender) -> Result<SessionId> {
        let id = self.outbound.sessions().attach(sender)?;
        let phase = self.lifecycle.on_connect();
        info!("UI connected: {id}");

        if phase == ConnectionPhase::ConnectedFirst {
            let bridge = Arc::clone(self);
            let delay = self.lifecycle.settle_delay();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                bridge.fire_ready("settle delay elapsed");
            });
        }
        Ok(id)
    }

    pub fn disconnect(&self, id: &SessionId) {
        if self.outbound.sessions().detach(id) {
            self.lifecycle.on_disconnect();
            info!("UI disconnected: {id}");
        }
    }

    /// Run the ready hook unless it already ran. Returns whether it ran now.
    pub fn fire_ready(&self, reason: &str) -> bool {
        if !self.lifecycle.claim_ready() {
            trace!("Ready hook already fired, ignoring ({reason})");
            return false;
        }
        info!("UI ready ({reason})");
        if let Some(hook) = &self.ready_hook
            && std::panic::catch_unwind(AssertUnwindSafe(|| (**hook)(&self.outbound))).is_err()
        {
            error!("Ready hook panicked");
        }
        true
    }

    /// Dispatch one inbound text frame.
    ///
    /// Returns the handle of the spawned task, or `None` when the frame was
    /// not a request or could not be decoded.
    pub fn dispatch_frame(self: &Arc<Self>, frame: &str) -> Option<JoinHandle<()>> {
        let ctx = TraceContext::new();
        ctx.span("inbound").in_scope(|| {
            info!("Got request from UI: {}", preview(frame));
        });
        self.dispatch_decoded(ctx, transport::decode_request(frame))
    }

    /// Dispatch one inbound binary frame holding UTF-8 JSON.
    pub fn dispatch_binary(self: &Arc<Self>, frame: &[u8]) -> Option<JoinHandle<()>> {
        let ctx = TraceContext::new();
        ctx.span("inbound").in_scope(|| {
            info!("Got binary request from UI ({} bytes)", frame.len());
        });
        self.dispatch_decoded(ctx, transport::decode_request_bytes(frame))
    }

    fn dispatch_decoded(
        self: &Arc<Self>,
        ctx: TraceContext,
        decoded: std::result::Result<Option<Message>, FrameError>,
    ) -> Option<JoinHandle<()>> {
        let span = ctx.span("request");
        match decoded {
            Ok(Some(request)) => {
                let bridge = Arc::clone(self);
                Some(tokio::spawn(
                    async move { bridge.process(ctx, request).await }.instrument(span),
                ))
            }
            Ok(None) => {
                span.in_scope(|| trace!("Ignoring non-request frame"));
                None
            }
            Err(e) => {
                span.in_scope(|| error!("Failed to decode websocket request: {e}"));
                None
            }
        }
    }

    async fn process(&self, ctx: TraceContext, request: Message) {
        debug!("Handling {} request {}", request.method, request.id);

        let outcome = if request.method == methods::UI_READY {
            self.fire_ready("UI reported ready");
            Ok(Ok(Value::Null))
        } else {
            AssertUnwindSafe(self.handler.handle(&ctx, &request))
                .catch_unwind()
                .await
        };

        match outcome {
            Ok(result) => {
                self.outbound.respond(&request, result);
            }
            Err(_) => {
                error!(
                    "Handler panicked while processing {} request {}",
                    request.method, request.id
                );
                self.outbound.send(&Message::failure(&request, "internal error"));
            }
        }
    }
}

/// Log-friendly prefix of a frame
fn preview(frame: &str) -> &str {
    const MAX_LOGGED: usize = 512;
    if frame.len() <= MAX_LOGGED {
        return frame;
    }
    let mut end = MAX_LOGGED;
    while !frame.is_char_boundary(end) {
        end -= 1;
    }
    &frame[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_frame() {
        assert_eq!(preview("abc"), "abc");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let frame = "é".repeat(400);
        let shown = preview(&frame);
        assert!(shown.len() <= 512);
        assert!(frame.starts_with(shown));
    }
}
