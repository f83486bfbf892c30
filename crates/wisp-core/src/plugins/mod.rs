//! Built-in plugins

pub mod calculator;

pub use calculator::{CalculatorPlugin, Evaluator, MevalEvaluator};

use crate::config::Config;
use crate::plugin::Plugin;
use std::sync::Arc;

/// Every built-in plugin, in registration order.
#[must_use]
pub fn builtin(config: &Config) -> Vec<Arc<dyn Plugin>> {
    vec![Arc::new(CalculatorPlugin::new(&config.calculator))]
}
