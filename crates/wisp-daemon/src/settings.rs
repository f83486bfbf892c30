//! Live configuration shared by the REST surface and the config watcher.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};
use wisp_core::config::{Config, LauncherSettings};

use crate::error::Result;

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    config: RwLock<Config>,
}

impl SettingsStore {
    #[must_use]
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            path,
            config: RwLock::new(config),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Config> {
        self.config
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Config> {
        self.config
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn launcher(&self) -> LauncherSettings {
        self.read().launcher.clone()
    }

    /// Update one launcher setting and persist the whole config.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, invalid values, or a failed save.
    pub fn update(&self, key: &str, value: &str) -> Result<LauncherSettings> {
        let snapshot = {
            let mut config = self.write();
            config.launcher.update(key, value)?;
            config.clone()
        };
        snapshot.save(&self.path)?;
        info!("Updated setting {key}");
        Ok(snapshot.launcher)
    }

    /// Re-read the launcher settings from disk. Returns whether they changed.
    ///
    /// Server settings need a restart and are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn reload(&self) -> Result<bool> {
        let loaded = Config::load(&self.path)?;
        let mut config = self.write();
        if config.launcher == loaded.launcher {
            debug!("Config reloaded, launcher settings unchanged");
            return Ok(false);
        }
        config.launcher = loaded.launcher;
        info!("Launcher settings reloaded from {}", self.path.display());
        Ok(true)
    }
}
