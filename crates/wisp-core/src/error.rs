use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid value for setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
