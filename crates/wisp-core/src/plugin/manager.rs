//! Query aggregation across registered plugins.

use super::{
    ActionCommand, ActionRegistry, InitParams, Metadata, Plugin, PluginApi, Query, QueryResult,
};
use crate::config::QueryConfig;
use crate::platform::{self, Platform};
use crate::{Error, Result, TraceContext};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, warn};
use wisp_types::{ActionPayload, InstalledPlugin, QueryType, ResultPayload};

struct LoadedPlugin {
    metadata: Metadata,
    plugin: Arc<dyn Plugin>,
}

/// Owns the registered plugins in registration order and the action registry
/// their published results point into.
pub struct PluginManager {
    plugins: Vec<LoadedPlugin>,
    actions: ActionRegistry,
    max_results: usize,
    platform: Platform,
}

impl PluginManager {
    #[must_use]
    pub fn new(config: &QueryConfig) -> Self {
        Self::with_platform(config, platform::detect())
    }

    pub(crate) fn with_platform(config: &QueryConfig, platform: Platform) -> Self {
        Self {
            plugins: Vec::new(),
            actions: ActionRegistry::default(),
            max_results: config.max_results,
            platform,
        }
    }

    /// Register a plugin. Returns `Ok(false)` when the plugin does not list the
    /// current platform and was skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Plugin`] if a plugin with the same id is already registered.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<bool> {
        let metadata = plugin.metadata();

        if self.plugins.iter().any(|p| p.metadata.id == metadata.id) {
            return Err(Error::Plugin(format!(
                "duplicate plugin id: {}",
                metadata.id
            )));
        }
        if !self.platform.is_listed_in(&metadata.supported_os) {
            info!(
                "Skipping plugin {} (not supported on {})",
                metadata.name,
                self.platform.as_str()
            );
            return Ok(false);
        }

        debug!(
            "Registered plugin {} ({}) keywords={:?}",
            metadata.name, metadata.id, metadata.trigger_keywords
        );
        self.plugins.push(LoadedPlugin { metadata, plugin });
        Ok(true)
    }

    /// Hand every plugin its capability handle.
    pub fn init_all(&self, ctx: &TraceContext, api: &Arc<dyn PluginApi>) {
        for loaded in &self.plugins {
            let _span = ctx.span("init").entered();
            loaded.plugin.init(ctx, InitParams { api: api.clone() });
            info!("Initialized plugin {}", loaded.metadata.name);
        }
    }

    #[must_use]
    pub fn metadata(&self) -> Vec<Metadata> {
        self.plugins.iter().map(|p| p.metadata.clone()).collect()
    }

    #[must_use]
    pub fn installed(&self) -> Vec<InstalledPlugin> {
        self.plugins
            .iter()
            .map(|p| p.metadata.to_installed())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    #[must_use]
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn set_max_results(&mut self, max_results: usize) {
        self.max_results = max_results;
    }

    fn keywords(&self) -> Vec<String> {
        self.plugins
            .iter()
            .flat_map(|p| p.metadata.trigger_keywords.iter().cloned())
            .collect()
    }

    /// Parse raw query text against the registered keywords.
    #[must_use]
    pub fn parse_query(&self, raw: &str, query_type: QueryType) -> Query {
        if query_type == QueryType::Selection {
            return Query {
                raw_query: raw.to_string(),
                search: raw.to_string(),
                query_type,
                ..Query::default()
            };
        }
        Query::parse(raw, &self.keywords()).with_type(query_type)
    }

    fn participants(&self, query: &Query) -> Vec<&LoadedPlugin> {
        self.plugins
            .iter()
            .filter(|p| {
                if query.is_global() {
                    p.metadata.is_global()
                } else {
                    p.metadata.has_keyword(&query.trigger_keyword)
                }
            })
            .collect()
    }

    /// Run `query` on every participating plugin in parallel and concatenate
    /// their results in registration order.
    ///
    /// A plugin that panics contributes nothing; the others are unaffected.
    pub async fn query(&self, ctx: &TraceContext, query: &Query) -> Vec<(String, QueryResult)> {
        let mut tasks = Vec::new();
        for loaded in self.participants(query) {
            let plugin = loaded.plugin.clone();
            let mut plugin_query = query.clone();
            if !plugin_query.is_global() {
                plugin_query.split_command(&loaded.metadata.commands);
            }
            let task_ctx = ctx.clone();
            let span = ctx.span("query");
            let handle = tokio::task::spawn_blocking(move || {
                let _entered = span.entered();
                plugin.query(&task_ctx, &plugin_query)
            });
            tasks.push((loaded.metadata.id.clone(), loaded.metadata.name.clone(), handle));
        }

        let mut merged = Vec::new();
        for (plugin_id, name, handle) in tasks {
            match handle.await {
                Ok(results) => {
                    debug!("Plugin {name} returned {} results", results.len());
                    merged.extend(results.into_iter().map(|r| (plugin_id.clone(), r)));
                }
                Err(e) => error!("Plugin {name} failed while querying: {e}"),
            }
        }

        if self.max_results > 0 && merged.len() > self.max_results {
            debug!(
                "Truncating {} results to {}",
                merged.len(),
                self.max_results
            );
            merged.truncate(self.max_results);
        }
        merged
    }

    /// Run `query` and convert the results to their wire form, registering
    /// every action so the UI can invoke it by id.
    pub async fn query_payloads(&self, ctx: &TraceContext, query: &Query) -> Vec<ResultPayload> {
        self.query(ctx, query)
            .await
            .into_iter()
            .map(|(plugin_id, result)| self.publish(&plugin_id, query, result))
            .collect()
    }

    fn publish(&self, plugin_id: &str, query: &Query, mut result: QueryResult) -> ResultPayload {
        result.normalize_default_action();
        let actions = result
            .actions
            .into_iter()
            .map(|action| ActionPayload {
                id: self
                    .actions
                    .register(plugin_id, result.title.clone(), action.command),
                name: action.name,
                is_default: action.is_default,
            })
            .collect();

        ResultPayload {
            id: uuid::Uuid::new_v4().to_string(),
            associated_query: query.raw_query.clone(),
            title: result.title,
            sub_title: result.sub_title,
            icon: result.icon,
            score: result.score,
            preview: result.preview,
            actions,
        }
    }

    /// Execute a previously published action on a blocking worker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionNotFound`] for unknown or evicted ids,
    /// [`Error::PluginNotFound`] if the owning plugin is gone, and
    /// [`Error::Plugin`] if the plugin fails or panics.
    pub async fn invoke_action(&self, ctx: &TraceContext, action_id: &str) -> Result<()> {
        let action = self
            .actions
            .get(action_id)
            .ok_or_else(|| Error::ActionNotFound(action_id.to_string()))?;

        let loaded = self
            .plugins
            .iter()
            .find(|p| p.metadata.id == action.plugin_id)
            .ok_or_else(|| Error::PluginNotFound(action.plugin_id.clone()))?;

        info!(
            "Executing action {} on '{}' ({})",
            action.command.kind, action.result_title, loaded.metadata.name
        );
        self.execute(ctx, loaded.plugin.clone(), action.command)
            .instrument(ctx.span("action"))
            .await
    }

    async fn execute(
        &self,
        ctx: &TraceContext,
        plugin: Arc<dyn Plugin>,
        command: ActionCommand,
    ) -> Result<()> {
        let task_ctx = ctx.clone();
        match tokio::task::spawn_blocking(move || plugin.execute(&task_ctx, &command)).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Action panicked: {e}");
                Err(Error::Plugin(format!("action panicked: {e}")))
            }
        }
    }
}
