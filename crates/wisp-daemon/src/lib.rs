//! Wisp daemon library: the UI message bridge and the HTTP surface around it.
//!
//! The bridge correlates requests and responses by id over a single
//! websocket session, dispatches `Query`/`Action` to the plugin manager, and
//! lets plugins push `ChangeQuery`/`ShowApp`/`ShowMessage` back to the UI.

pub mod bridge;
pub mod catalog;
pub(crate) mod config_watcher;
pub mod error;
pub mod handlers;
pub mod host;
pub mod http;
pub mod images;
pub mod lifecycle;
pub mod outbound;
pub mod server;
pub mod session;
pub mod settings;

pub use bridge::{Bridge, ReadyHook, RequestHandler};
pub use error::{DaemonError, Result};
pub use handlers::WispHandler;
pub use host::HostApi;
pub use lifecycle::{ConnectionLifecycle, ConnectionPhase};
pub use outbound::Outbound;
pub use server::{Daemon, WispBridge, run};
pub use session::{FrameSender, SessionId, SessionRegistry};
