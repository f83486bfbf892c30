//! `Action` handler.

use serde_json::Value;
use tracing::debug;
use wisp_core::TraceContext;
use wisp_types::ActionInvocation;

use crate::error::{DaemonError, Result};

use super::WispHandler;

pub(super) async fn handle_action(
    handler: &WispHandler,
    ctx: &TraceContext,
    invocation: ActionInvocation,
) -> Result<Value> {
    debug!("Action: id='{}'", invocation.id);
    handler
        .plugins
        .invoke_action(ctx, &invocation.id)
        .await
        .map_err(DaemonError::from_core)?;
    Ok(Value::Null)
}
