//! Tests for configuration loading, saving and launcher settings updates

use crate::Error;
use crate::config::{Config, Directories, QueryHotkey};
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 34987);
    assert_eq!(config.server.max_message_size, 10 * 1024 * 1024);
    assert_eq!(config.server.settle_delay().as_millis(), 500);
    assert_eq!(config.query.max_results, 1000);
    assert_eq!(config.calculator.history_scan_limit, 500);
    assert_eq!(config.calculator.max_history_entries, 10_000);
    assert_eq!(config.launcher.theme_id, "default");
    assert!(config.launcher.hide_on_lost_focus);
    assert!(!config.launcher.show_on_start);
}

#[test]
fn test_config_parse_minimal() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_parse_partial() {
    let json = r#"{
        "server": { "port": 4000 },
        "launcher": { "showOnStart": true, "langCode": "zh_CN" }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.server.port, 4000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert!(config.launcher.show_on_start);
    assert_eq!(config.launcher.lang_code, "zh_CN");
    assert_eq!(config.calculator.history_scan_limit, 500);
}

#[test]
fn test_bind_address() {
    let config = Config::default();
    assert_eq!(config.server.bind_address(), "127.0.0.1:34987");
}

#[test]
fn test_load_missing_file_returns_default() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(&dir.path().join("missing.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_invalid_json_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(Config::load(&path), Err(Error::Json(_))));
}

#[test]
fn test_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.server.port = 5555;
    config.launcher.query_hotkeys.push(QueryHotkey {
        hotkey: "ctrl+shift+c".to_string(),
        query: "calculator ".to_string(),
    });
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_launcher_update_strings_and_bools() {
    let mut config = Config::default();
    config.launcher.update("themeId", "dark").unwrap();
    config.launcher.update("showOnStart", "true").unwrap();
    config.launcher.update("hideOnLostFocus", "false").unwrap();

    assert_eq!(config.launcher.theme_id, "dark");
    assert!(config.launcher.show_on_start);
    assert!(!config.launcher.hide_on_lost_focus);
}

#[test]
fn test_launcher_update_query_hotkeys() {
    let mut config = Config::default();
    config
        .launcher
        .update(
            "queryHotkeys",
            r#"[{"Hotkey": "alt+c", "Query": "calculator "}]"#,
        )
        .unwrap();
    assert_eq!(config.launcher.query_hotkeys.len(), 1);
    assert_eq!(config.launcher.query_hotkeys[0].hotkey, "alt+c");
}

#[test]
fn test_launcher_update_rejects_bad_values() {
    let mut config = Config::default();
    assert!(matches!(
        config.launcher.update("showOnStart", "yes"),
        Err(Error::InvalidSetting { .. })
    ));
    assert!(matches!(
        config.launcher.update("queryHotkeys", "not json"),
        Err(Error::InvalidSetting { .. })
    ));
    assert!(matches!(
        config.launcher.update("fontSize", "12"),
        Err(Error::UnknownSetting(_))
    ));
    assert_eq!(config.launcher, Config::default().launcher);
}

#[test]
fn test_directories_with_base() {
    let dir = TempDir::new().unwrap();
    let dirs = Directories::with_base(dir.path().join("wisp"));

    assert_eq!(dirs.config, dir.path().join("wisp"));
    assert!(dirs.config_file.starts_with(&dirs.config));
    assert!(dirs.config_file.ends_with("config.json"));
}
