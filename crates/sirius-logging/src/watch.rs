use std::path::Path;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::fs::{config_path, read_config};
use crate::init::apply;

/// Re-apply `logging.json` whenever it changes on disk.
pub fn spawn_watcher(root: &Path) -> Result<JoinHandle<()>> {
    let root = root.to_path_buf();
    let path = config_path(&root);
    let watch_dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("missing logging config parent dir"))?
        .to_path_buf();

    std::fs::create_dir_all(&watch_dir)
        .with_context(|| format!("creating logging config dir {}", watch_dir.display()))?;

    let handle = thread::spawn(move || {
        let (tx, rx) = mpsc::channel();
        let mut watcher = match notify::recommended_watcher(tx) {
            Ok(watcher) => watcher,
            Err(err) => {
                tracing::warn!("Failed to start logging watcher: {}", err);
                return;
            }
        };

        if let Err(err) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
            tracing::warn!("Failed to watch logging config dir: {}", err);
            return;
        }

        while let Ok(event) = rx.recv() {
            handle_event(event, &root, &path);
        }
        tracing::warn!("Logging watcher stopped");
    });

    Ok(handle)
}

fn handle_event(event: notify::Result<Event>, root: &Path, path: &Path) {
    let event = match event {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!("Logging watcher error: {}", err);
            return;
        }
    };
    if !is_config_change(&event, path) {
        return;
    }

    let cfg = read_config(root);
    if let Err(err) = apply(&cfg) {
        tracing::warn!("Failed to apply logging config: {}", err);
    }
}

fn is_config_change(event: &Event, path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use std::path::PathBuf;

    #[test]
    fn test_watcher_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_watcher(dir.path()).unwrap();
        assert!(config_path(dir.path()).parent().unwrap().is_dir());

        crate::fs::write_config_atomic(dir.path(), &crate::LoggingConfig::default()).unwrap();
        drop(handle);
    }

    #[test]
    fn test_config_change_without_subscriber_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(dir.path());
        let event = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        handle_event(Ok(event), dir.path(), &path);
        assert!(path.exists());
    }

    #[test]
    fn test_only_config_writes_count() {
        let path = PathBuf::from("/tmp/sirius/config/logging.json");
        let write = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.clone());
        assert!(is_config_change(&write, &path));

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        assert!(is_config_change(&created, &path));

        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/sirius/config/other.json"));
        assert!(!is_config_change(&other, &path));

        let read = Event::new(EventKind::Access(AccessKind::Any)).add_path(path.clone());
        assert!(!is_config_change(&read, &path));
    }
}
