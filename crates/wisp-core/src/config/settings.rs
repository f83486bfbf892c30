use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub calculator: CalculatorConfig,

    /// User-facing settings, served and updated over REST
    #[serde(default)]
    pub launcher: LauncherSettings,
}

impl Config {
    /// Load config from file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Websocket/HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Wait after the first UI connection before the ready hook runs
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_message_size: default_max_message_size(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    /// Merged results are truncated to this many; 0 disables truncation
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
    /// Newest history entries examined per search
    #[serde(default = "default_history_scan_limit")]
    pub history_scan_limit: usize,

    /// Entries retained; the oldest are dropped on append
    #[serde(default = "default_max_history_entries")]
    pub max_history_entries: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            history_scan_limit: default_history_scan_limit(),
            max_history_entries: default_max_history_entries(),
        }
    }
}

/// Hotkey that opens the launcher with a fixed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryHotkey {
    pub hotkey: String,
    pub query: String,
}

/// Settings the UI reads through `GET /setting/wox`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherSettings {
    #[serde(default = "default_main_hotkey")]
    pub main_hotkey: String,

    #[serde(default)]
    pub selection_hotkey: String,

    #[serde(default)]
    pub query_hotkeys: Vec<QueryHotkey>,

    #[serde(default = "default_theme_id")]
    pub theme_id: String,

    #[serde(default = "default_lang_code")]
    pub lang_code: String,

    #[serde(default = "default_true")]
    pub hide_on_lost_focus: bool,

    #[serde(default)]
    pub show_on_start: bool,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            main_hotkey: default_main_hotkey(),
            selection_hotkey: String::new(),
            query_hotkeys: Vec::new(),
            theme_id: default_theme_id(),
            lang_code: default_lang_code(),
            hide_on_lost_focus: true,
            show_on_start: false,
        }
    }
}

impl LauncherSettings {
    /// Update one setting by its camelCase key. List values are JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] for keys that do not exist and
    /// [`Error::InvalidSetting`] when the value has the wrong shape.
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "mainHotkey" => self.main_hotkey = value.to_string(),
            "selectionHotkey" => self.selection_hotkey = value.to_string(),
            "themeId" => self.theme_id = value.to_string(),
            "langCode" => self.lang_code = value.to_string(),
            "hideOnLostFocus" => self.hide_on_lost_focus = parse_bool(key, value)?,
            "showOnStart" => self.show_on_start = parse_bool(key, value)?,
            "queryHotkeys" => {
                self.query_hotkeys =
                    serde_json::from_str(value).map_err(|e| Error::InvalidSetting {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
            }
            _ => return Err(Error::UnknownSetting(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::InvalidSetting {
            key: key.to_string(),
            reason: format!("expected true or false, got '{value}'"),
        }),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    34987
}
fn default_max_message_size() -> usize {
    10 * 1024 * 1024
}
fn default_settle_delay_ms() -> u64 {
    500
}
fn default_max_results() -> usize {
    1000
}
fn default_history_scan_limit() -> usize {
    500
}
fn default_max_history_entries() -> usize {
    10_000
}
fn default_main_hotkey() -> String {
    if cfg!(target_os = "macos") {
        "command+space".to_string()
    } else {
        "alt+space".to_string()
    }
}
fn default_theme_id() -> String {
    "default".to_string()
}
fn default_lang_code() -> String {
    "en_US".to_string()
}
fn default_true() -> bool {
    true
}
