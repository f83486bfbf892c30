//! Config file watcher driving launcher-settings hot reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use notify::Watcher;
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{DaemonError, Result};
use crate::settings::SettingsStore;

const RELOAD_SETTLE_DELAY: Duration = Duration::from_millis(100);
const CONFIG_DEBOUNCE: Duration = Duration::from_millis(500);

/// Keeps the watcher threads alive
pub struct ConfigWatcher {
    _watcher_thread: std::thread::JoinHandle<()>,
    _forward_thread: std::thread::JoinHandle<()>,
}

/// Watch `config_path` and send `()` on `tx` after each settled change.
pub fn spawn_config_watcher(
    config_path: PathBuf,
    tx: tokio_mpsc::UnboundedSender<()>,
) -> ConfigWatcher {
    let (sync_tx, sync_rx) = mpsc::channel::<()>();

    let watcher_thread = std::thread::spawn(move || {
        if let Err(e) = watch_config_file(&config_path, &sync_tx) {
            error!("Config watcher error: {e}");
        }
    });

    let forward_thread = std::thread::spawn(move || {
        while sync_rx.recv().is_ok() {
            std::thread::sleep(RELOAD_SETTLE_DELAY);
            if tx.send(()).is_err() {
                debug!("Config reload receiver dropped, stopping watcher");
                return;
            }
        }
        debug!("Config watcher channel closed");
    });

    ConfigWatcher {
        _watcher_thread: watcher_thread,
        _forward_thread: forward_thread,
    }
}

fn is_config_event(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        notify::EventKind::Modify(_) | notify::EventKind::Create(_)
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == config_path.file_name())
}

fn watch_config_file(config_path: &Path, tx: &mpsc::Sender<()>) -> Result<()> {
    let Some(parent) = config_path.parent() else {
        return Err(DaemonError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Invalid config path",
        )));
    };
    std::fs::create_dir_all(parent)?;

    let last_event: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
    let watched = config_path.to_owned();
    let (event_tx, event_rx) = mpsc::channel();

    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<notify::Event>| match result {
            Ok(event) if is_config_event(&event, &watched) => {
                let mut last = last_event
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                let now = Instant::now();
                if last.is_none_or(|t| now.duration_since(t) > CONFIG_DEBOUNCE) {
                    *last = Some(now);
                    let _ = event_tx.send(());
                }
            }
            Ok(_) => {}
            Err(e) => error!("Watcher error: {e}"),
        })?;

    watcher.watch(parent, notify::RecursiveMode::NonRecursive)?;
    info!("Watching config directory: {}", parent.display());

    while event_rx.recv().is_ok() {
        if tx.send(()).is_err() {
            break;
        }
    }
    Ok(())
}

/// Apply reload notifications to `settings` until the watcher stops.
pub async fn run_reload_loop(
    settings: Arc<SettingsStore>,
    mut reload_rx: tokio_mpsc::UnboundedReceiver<()>,
) {
    while reload_rx.recv().await.is_some() {
        debug!("Config reload event received");
        match settings.reload() {
            Ok(true) => info!("Config reloaded successfully"),
            Ok(false) => {}
            Err(e) => warn!("Failed to reload config: {e}"),
        }
    }
    debug!("Config reload loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind};
    use wisp_core::config::Config;

    #[test]
    fn test_is_config_event() {
        let path = Path::new("/tmp/wisp/config.json");
        let modify = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/wisp/config.json"));
        let create_other = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/wisp/other.json"));
        let access = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/tmp/wisp/config.json"));

        assert!(is_config_event(&modify, path));
        assert!(!is_config_event(&create_other, path));
        assert!(!is_config_event(&access, path));
    }

    #[tokio::test]
    async fn test_reload_loop_applies_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let settings = Arc::new(SettingsStore::new(Config::default(), path.clone()));

        let mut edited = Config::default();
        edited.launcher.hide_on_lost_focus = !edited.launcher.hide_on_lost_focus;
        edited.save(&path).unwrap();

        let (tx, rx) = tokio_mpsc::unbounded_channel();
        tx.send(()).unwrap();
        drop(tx);
        run_reload_loop(settings.clone(), rx).await;

        assert_eq!(
            settings.launcher().hide_on_lost_focus,
            edited.launcher.hide_on_lost_focus
        );
    }
}
