//! Calculator: evaluates arithmetic and remembers what was copied.

use crate::config::CalculatorConfig;
use crate::plugin::{
    ActionCommand, InitParams, Metadata, Plugin, PluginApi, Query, QueryResult, ResultAction,
};
use crate::{Error, HistoryStore, Result, TraceContext};
use serde_json::json;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};
use wisp_types::{PlainQuery, WispImage};

pub const CALCULATOR_PLUGIN_ID: &str = "calculator";

/// Characters that make a global query worth evaluating
const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '('];

const KIND_COPY_AND_RECORD: &str = "copy_and_record";
const KIND_COPY: &str = "copy";
const KIND_RECALCULATE: &str = "recalculate";

pub const PLACEHOLDER_TITLE: &str = "Input expression to calculate";

const CALCULATOR_ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 48 48"><rect x="8" y="4" width="32" height="40" rx="4" fill="#546e7a"/><rect x="12" y="8" width="24" height="9" rx="1.5" fill="#c5e1a5"/><g fill="#eceff1"><rect x="12" y="21" width="6" height="5" rx="1"/><rect x="21" y="21" width="6" height="5" rx="1"/><rect x="12" y="29" width="6" height="5" rx="1"/><rect x="21" y="29" width="6" height="5" rx="1"/><rect x="12" y="37" width="15" height="4" rx="1"/></g><rect x="30" y="21" width="6" height="20" rx="1" fill="#ff7043"/></svg>"##;

/// Numeric expression evaluator used by the calculator
pub trait Evaluator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if the text is not a valid expression or
    /// does not produce a finite number.
    fn evaluate(&self, expression: &str) -> Result<f64>;
}

/// [`Evaluator`] backed by `meval`
#[derive(Debug, Default, Clone, Copy)]
pub struct MevalEvaluator;

impl Evaluator for MevalEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64> {
        let value = meval::eval_str(expression).map_err(|e| Error::Evaluation(e.to_string()))?;
        if !value.is_finite() {
            return Err(Error::Evaluation(format!("{expression} is not finite")));
        }
        Ok(value)
    }
}

/// Format a value without float noise: at most 10 decimals, no trailing zeros.
#[must_use]
pub fn format_value(value: f64) -> String {
    let fixed = format!("{value:.10}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct CalculatorPlugin {
    api: OnceLock<Arc<dyn PluginApi>>,
    history: HistoryStore,
    evaluator: Box<dyn Evaluator>,
}

impl CalculatorPlugin {
    #[must_use]
    pub fn new(config: &CalculatorConfig) -> Self {
        Self::with_evaluator(config, Box::new(MevalEvaluator))
    }

    #[must_use]
    pub fn with_evaluator(config: &CalculatorConfig, evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            api: OnceLock::new(),
            history: HistoryStore::new(config.history_scan_limit, config.max_history_entries),
            evaluator,
        }
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn api(&self) -> Result<&Arc<dyn PluginApi>> {
        self.api
            .get()
            .ok_or_else(|| Error::Plugin("calculator used before init".to_string()))
    }

    fn icon() -> WispImage {
        WispImage::svg(CALCULATOR_ICON)
    }

    fn calculate(&self, expression: &str) -> Option<String> {
        match self.evaluator.evaluate(expression) {
            Ok(value) => Some(format_value(value)),
            Err(e) => {
                trace!("Not an expression: {e}");
                None
            }
        }
    }

    fn fresh_result(expression: &str, value: String) -> QueryResult {
        let command = ActionCommand::new(
            KIND_COPY_AND_RECORD,
            json!({ "expression": expression, "result": value }),
        );
        QueryResult::new(value)
            .with_icon(Self::icon())
            .with_action(ResultAction::new("Copy result", command).primary())
    }

    fn history_results(&self, search: &str) -> impl Iterator<Item = QueryResult> {
        self.history.search(search).into_iter().map(|entry| {
            let copy = ActionCommand::new(KIND_COPY, json!({ "result": entry.result }));
            let recalculate =
                ActionCommand::new(KIND_RECALCULATE, json!({ "expression": entry.expression }));
            QueryResult::new(entry.expression)
                .with_sub_title(entry.result)
                .with_icon(Self::icon())
                .with_action(ResultAction::new("Copy result", copy).primary())
                .with_action(ResultAction::new("Recalculate", recalculate))
        })
    }

    fn copy(&self, ctx: &TraceContext, command: &ActionCommand) -> Result<()> {
        let result = required(command, "result")?;
        self.api()?.copy_to_clipboard(ctx, result)
    }
}

fn required<'a>(command: &'a ActionCommand, key: &str) -> Result<&'a str> {
    command
        .context_str(key)
        .ok_or_else(|| Error::Plugin(format!("{} action is missing {key}", command.kind)))
}

impl Plugin for CalculatorPlugin {
    fn metadata(&self) -> Metadata {
        Metadata {
            id: CALCULATOR_PLUGIN_ID.to_string(),
            name: "Calculator".to_string(),
            author: "wisp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Evaluate arithmetic expressions".to_string(),
            icon: Self::icon(),
            trigger_keywords: vec!["*".to_string(), "calculator".to_string()],
            commands: Vec::new(),
            supported_os: vec![
                "Windows".to_string(),
                "Macos".to_string(),
                "Linux".to_string(),
            ],
        }
    }

    fn init(&self, _ctx: &TraceContext, params: InitParams) {
        if self.api.set(params.api).is_err() {
            debug!("Calculator already initialized");
        }
    }

    fn query(&self, _ctx: &TraceContext, query: &Query) -> Vec<QueryResult> {
        let search = query.search.as_str();

        if query.is_global() {
            if !search.contains(OPERATOR_CHARS) {
                return Vec::new();
            }
            return self
                .calculate(search)
                .map(|value| Self::fresh_result(search, value))
                .into_iter()
                .collect();
        }

        let mut results: Vec<QueryResult> = self
            .calculate(search)
            .map(|value| Self::fresh_result(search, value))
            .into_iter()
            .collect();
        results.extend(self.history_results(search));

        if results.is_empty() {
            results.push(QueryResult::new(PLACEHOLDER_TITLE).with_icon(Self::icon()));
        }
        results
    }

    fn execute(&self, ctx: &TraceContext, command: &ActionCommand) -> Result<()> {
        match command.kind.as_str() {
            KIND_COPY_AND_RECORD => {
                let api = self.api()?;
                let expression = required(command, "expression")?;
                let result = required(command, "result")?;
                self.history.append(expression, result);
                api.copy_to_clipboard(ctx, result)
            }
            KIND_COPY => self.copy(ctx, command),
            KIND_RECALCULATE => {
                let expression = required(command, "expression")?;
                self.api()?
                    .change_query(ctx, PlainQuery::input(expression));
                Ok(())
            }
            other => Err(Error::Plugin(format!("unknown calculator action: {other}"))),
        }
    }
}
