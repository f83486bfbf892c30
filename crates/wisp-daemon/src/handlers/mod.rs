//! Request handlers for the bridge.
//!
//! Methods handled here:
//! - `Query` - run the query aggregator and return result payloads
//! - `Action` - invoke a registered action
//!
//! `UIReady` never reaches this module; the bridge consumes it.

mod action;
mod query;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use wisp_core::{PluginManager, TraceContext};
use wisp_rpc::{Message, methods};

use crate::bridge::RequestHandler;
use crate::error::{DaemonError, Result};
use crate::images::ImageRegistry;

/// Handler wired to the plugin manager
#[derive(Clone)]
pub struct WispHandler {
    plugins: Arc<PluginManager>,
    images: Arc<ImageRegistry>,
}

impl WispHandler {
    #[must_use]
    pub fn new(plugins: Arc<PluginManager>, images: Arc<ImageRegistry>) -> Self {
        Self { plugins, images }
    }

    #[must_use]
    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    #[must_use]
    pub fn images(&self) -> &ImageRegistry {
        &self.images
    }
}

impl RequestHandler for WispHandler {
    async fn handle(&self, ctx: &TraceContext, request: &Message) -> Result<Value> {
        debug!("Dispatching {}", request.method);
        match request.method.as_str() {
            methods::QUERY => query::handle_query(self, ctx, params(request)?).await,
            methods::ACTION => action::handle_action(self, ctx, params(request)?).await,
            other => Err(DaemonError::MethodNotFound(other.to_string())),
        }
    }
}

fn params<T: DeserializeOwned>(request: &Message) -> Result<T> {
    if request.data.is_null() {
        return Err(DaemonError::InvalidParams("Missing params".to_string()));
    }
    serde_json::from_value(request.data.clone())
        .map_err(|e| DaemonError::InvalidParams(e.to_string()))
}
