pub mod config;
pub mod history;
pub mod plugin;
pub mod plugins;

pub(crate) mod platform;

mod context;
mod error;

#[cfg(test)]
mod tests;

pub use context::TraceContext;
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryStore};
pub use plugin::{
    ActionCommand, ActionRegistry, InitParams, LogLevel, Metadata, MetadataCommand, Plugin,
    PluginApi, PluginManager, Query, QueryResult, RegisteredAction, ResultAction,
    WILDCARD_KEYWORD,
};

pub use wisp_types::*;
