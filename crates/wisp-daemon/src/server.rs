//! HTTP/websocket server for the wisp daemon.
//!
//! One axum server carries the UI bridge on `/ws` and the REST surface on
//! every other route.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wisp_core::config::Config;
use wisp_core::{PluginApi, PluginManager, TraceContext};
use wisp_rpc::methods;

use crate::bridge::Bridge;
use crate::catalog::BuiltinCatalog;
use crate::config_watcher::{run_reload_loop, spawn_config_watcher};
use crate::error::Result;
use crate::handlers::WispHandler;
use crate::host::HostApi;
use crate::http::{self, RestState};
use crate::images::ImageRegistry;
use crate::settings::SettingsStore;

pub type WispBridge = Bridge<WispHandler>;

#[derive(Clone)]
struct WsState {
    bridge: Arc<WispBridge>,
    max_message_size: usize,
}

/// Everything a running daemon is made of
pub struct Daemon {
    pub bridge: Arc<WispBridge>,
    pub rest: RestState,
    pub config: Config,
}

impl Daemon {
    /// Register the built-in plugins, wire the bridge and initialize plugins.
    ///
    /// The ready hook shows the launcher when `showOnStart` is set.
    #[must_use]
    pub fn build(config: Config, config_path: PathBuf) -> Self {
        let mut manager = PluginManager::new(&config.query);
        for plugin in wisp_core::plugins::builtin(&config) {
            if let Err(e) = manager.register(plugin) {
                warn!("Failed to register plugin: {e}");
            }
        }
        let plugins = Arc::new(manager);

        let base_url = format!("http://{}", config.server.bind_address());
        let images = Arc::new(ImageRegistry::new(base_url));
        let settings = Arc::new(SettingsStore::new(config.clone(), config_path));

        let hook_settings = settings.clone();
        let bridge = Arc::new(
            Bridge::new(
                WispHandler::new(plugins.clone(), images.clone()),
                config.server.settle_delay(),
            )
            .with_ready_hook(move |outbound| {
                if hook_settings.launcher().show_on_start {
                    outbound.request_ui(methods::SHOW_APP, Value::Null);
                }
            }),
        );

        let api: Arc<dyn PluginApi> = Arc::new(HostApi::new(bridge.outbound().clone()));
        plugins.init_all(&TraceContext::new(), &api);
        info!("Loaded {} plugin(s)", plugins.len());

        Self {
            bridge,
            rest: RestState {
                plugins,
                images,
                catalog: Arc::new(BuiltinCatalog),
                settings,
            },
            config,
        }
    }

    /// The full router: `/ws` plus the REST routes, all with CORS.
    pub fn router(&self) -> Router {
        let ws_state = WsState {
            bridge: self.bridge.clone(),
            max_message_size: self.config.server.max_message_size,
        };
        Router::new()
            .route("/ws", get(ws_upgrade))
            .with_state(ws_state)
            .merge(http::router(self.rest.clone()))
            .layer(axum::middleware::map_response(http::allow_any_origin))
    }
}

async fn ws_upgrade(State(state): State<WsState>, ws: WebSocketUpgrade) -> Response {
    ws.max_message_size(state.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state.bridge))
}

async fn handle_socket(socket: WebSocket, bridge: Arc<WispBridge>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let session = match bridge.connect(tx) {
        Ok(id) => id,
        Err(e) => {
            warn!("Rejecting UI connection: {e}");
            let _ = sink.send(WsMessage::Close(None)).await;
            return;
        }
    };

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sink.send(WsMessage::Text(frame.into())).await {
                debug!("Websocket send failed: {e}");
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(WsMessage::Text(text)) => {
                bridge.dispatch_frame(text.as_str());
            }
            Ok(WsMessage::Binary(bytes)) => {
                bridge.dispatch_binary(&bytes);
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Websocket read error: {e}");
                break;
            }
        }
    }

    bridge.disconnect(&session);
    send_task.abort();
}

/// Run the daemon until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run(config: Config, config_path: PathBuf, shutdown: CancellationToken) -> Result<()> {
    let daemon = Daemon::build(config, config_path.clone());

    let (reload_tx, reload_rx) = mpsc::unbounded_channel::<()>();
    let _config_watcher = spawn_config_watcher(config_path, reload_tx);
    tokio::spawn(run_reload_loop(daemon.rest.settings.clone(), reload_rx));

    let address = daemon.config.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, daemon.router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}
