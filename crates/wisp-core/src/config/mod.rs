mod dirs;
mod settings;
mod validation;

pub use dirs::Directories;
pub use settings::{
    CalculatorConfig, Config, LauncherSettings, QueryConfig, QueryHotkey, ServerConfig,
};
pub use validation::warn_unknown_fields;
