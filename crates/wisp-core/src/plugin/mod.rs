//! Plugin contract.
//!
//! A plugin describes itself with [`Metadata`], receives a host capability
//! handle once through [`Plugin::init`], answers [`Query`]s with ranked
//! [`QueryResult`]s, and later executes the [`ActionCommand`]s it attached
//! to those results when the user picks one.

mod actions;
mod manager;
mod result;

pub use actions::{ActionRegistry, DEFAULT_ACTION_CAPACITY, RegisteredAction};
pub use manager::PluginManager;
pub use result::{ActionCommand, QueryResult, ResultAction};

use crate::{Result, TraceContext};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wisp_types::{InstalledPlugin, PlainQuery, QueryType, WispImage};

/// Keyword that makes a plugin take part in global (keyword-less) queries
pub const WILDCARD_KEYWORD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetadataCommand {
    pub command: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metadata {
    pub id: String,
    pub name: String,
    pub author: String,
    pub version: String,
    pub description: String,
    pub icon: WispImage,
    pub trigger_keywords: Vec<String>,
    #[serde(default)]
    pub commands: Vec<MetadataCommand>,
    #[serde(rename = "SupportedOS")]
    pub supported_os: Vec<String>,
}

impl Metadata {
    /// Whether the plugin answers global queries.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.trigger_keywords.iter().any(|k| k == WILDCARD_KEYWORD)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        keyword != WILDCARD_KEYWORD && self.trigger_keywords.iter().any(|k| k == keyword)
    }

    #[must_use]
    pub fn to_installed(&self) -> InstalledPlugin {
        InstalledPlugin {
            id: self.id.clone(),
            name: self.name.clone(),
            author: self.author.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            trigger_keywords: self.trigger_keywords.clone(),
            supported_os: self.supported_os.clone(),
        }
    }
}

/// Parameters handed to [`Plugin::init`]
#[derive(Clone)]
pub struct InitParams {
    pub api: Arc<dyn PluginApi>,
}

impl std::fmt::Debug for InitParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitParams").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Host capabilities available to plugins.
///
/// Calls may arrive from blocking worker threads, so implementations must not
/// assume they run inside an async context.
pub trait PluginApi: Send + Sync {
    /// Replace the text in the UI's query box.
    fn change_query(&self, ctx: &TraceContext, query: PlainQuery);

    /// Write text to the host clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if no clipboard tool accepted the text.
    fn copy_to_clipboard(&self, ctx: &TraceContext, text: &str) -> Result<()>;

    /// Show a transient message in the UI.
    fn notify(&self, ctx: &TraceContext, message: &str);

    fn log(&self, ctx: &TraceContext, level: LogLevel, message: &str) {
        let trace_id = ctx.trace_id.as_str();
        match level {
            LogLevel::Debug => tracing::debug!(trace_id, "{message}"),
            LogLevel::Info => tracing::info!(trace_id, "{message}"),
            LogLevel::Warning => tracing::warn!(trace_id, "{message}"),
            LogLevel::Error => tracing::error!(trace_id, "{message}"),
        }
    }
}

/// Contract every plugin implements.
///
/// `query` may run concurrently with itself and with `execute`; any state a
/// plugin mutates from either must sit behind its own synchronization.
pub trait Plugin: Send + Sync {
    fn metadata(&self) -> Metadata;

    /// Called once when the plugin is loaded.
    fn init(&self, ctx: &TraceContext, params: InitParams);

    /// Results for `query`. No match is an empty vec, never an error.
    fn query(&self, ctx: &TraceContext, query: &Query) -> Vec<QueryResult>;

    /// Run an action previously attached to one of this plugin's results.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is unknown or its side effect fails.
    fn execute(&self, ctx: &TraceContext, command: &ActionCommand) -> Result<()>;
}

/// A parsed user query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Text exactly as typed
    pub raw_query: String,
    pub query_type: QueryType,
    /// Empty for global queries
    pub trigger_keyword: String,
    pub command: String,
    /// Text left after the keyword and command are split off
    pub search: String,
}

impl Query {
    /// Split a registered keyword off the front of `raw`.
    ///
    /// `"calculator 1+2"` with `calculator` registered yields keyword
    /// `calculator` and search `1+2`. The wildcard never acts as a keyword, and a
    /// keyword only counts once it is followed by a space.
    #[must_use]
    pub fn parse(raw: &str, keywords: &[String]) -> Self {
        let global = Self {
            raw_query: raw.to_string(),
            search: raw.to_string(),
            ..Self::default()
        };

        let Some((first, rest)) = raw.split_once(' ') else {
            return global;
        };
        if first == WILDCARD_KEYWORD || !keywords.iter().any(|k| k == first) {
            return global;
        }

        Self {
            raw_query: raw.to_string(),
            trigger_keyword: first.to_string(),
            search: rest.to_string(),
            ..Self::default()
        }
    }

    /// Move a leading plugin command from `search` into `command`.
    pub fn split_command(&mut self, commands: &[MetadataCommand]) {
        let Some((first, rest)) = self.search.split_once(' ') else {
            return;
        };
        if commands.iter().any(|c| c.command == first) {
            self.command = first.to_string();
            self.search = rest.to_string();
        }
    }

    #[must_use]
    pub fn with_type(mut self, query_type: QueryType) -> Self {
        self.query_type = query_type;
        self
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.trigger_keyword.is_empty()
    }
}
