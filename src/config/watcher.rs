//! File watching
//!
//! [`FileWatcher`] is the watch primitive the config manager depends on.
//! [`NotifyWatcher`] implements it on top of `notify`: it watches the parent
//! directory of every registered file, so editors that replace files by
//! rename and files deleted and recreated later keep being observed. Raw OS
//! events arrive on a notify thread and are forwarded as file paths over a
//! channel; the owner thread drains that channel and calls
//! `ConfigManager::on_file_changed`, so no store is touched off-thread.

use super::error::ConfigResult;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Watch primitive consumed by the config manager
#[cfg_attr(test, mockall::automock)]
pub trait FileWatcher {
    /// Start reporting changes to `path`
    ///
    /// Watching an already watched path re-arms it, so a watch the OS
    /// dropped is restored.
    fn watch(&mut self, path: &Path) -> ConfigResult<()>;

    /// Stop reporting changes to `path`
    fn unwatch(&mut self, path: &Path);

    /// Currently watched paths
    fn watched(&self) -> Vec<PathBuf>;
}

/// Watcher that records registrations and never fires
///
/// Used when the shell runs without live reload.
#[derive(Debug, Default)]
pub struct NullWatcher {
    paths: Vec<PathBuf>,
}

impl FileWatcher for NullWatcher {
    fn watch(&mut self, path: &Path) -> ConfigResult<()> {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    fn watched(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }
}

/// Normalized path -> path as registered by the caller
type Registrations = Arc<Mutex<HashMap<PathBuf, PathBuf>>>;

/// `notify`-backed watcher forwarding changed paths over a channel
pub struct NotifyWatcher {
    inner: RecommendedWatcher,
    files: Registrations,
    /// Parent directory -> number of registered files inside it
    directories: HashMap<PathBuf, usize>,
}

impl NotifyWatcher {
    /// Create a watcher and the receiving end of its change channel
    pub fn new() -> ConfigResult<(Self, mpsc::UnboundedReceiver<PathBuf>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let files: Registrations = Arc::new(Mutex::new(HashMap::new()));
        let callback_files = Arc::clone(&files);

        let inner = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("File watch error: {}", e);
                    return;
                }
            };

            if matches!(event.kind, EventKind::Access(_) | EventKind::Other) {
                return;
            }

            let Ok(files) = callback_files.lock() else {
                return;
            };
            for path in &event.paths {
                if let Some(registered) = files.get(&normalize(path)) {
                    tracing::trace!(path = %registered.display(), kind = ?event.kind, "File change observed");
                    // Receiver gone means the owner loop has shut down
                    let _ = tx.send(registered.clone());
                }
            }
        })?;

        Ok((
            Self {
                inner,
                files,
                directories: HashMap::new(),
            },
            rx,
        ))
    }

    fn watch_directory(&mut self, dir: &Path) -> ConfigResult<()> {
        if let Some(count) = self.directories.get_mut(dir) {
            *count += 1;
            return Ok(());
        }
        self.inner.watch(dir, RecursiveMode::NonRecursive)?;
        self.directories.insert(dir.to_path_buf(), 1);
        tracing::debug!(dir = %dir.display(), "Watching directory");
        Ok(())
    }

    /// Drop and re-register the OS watch on `dir`
    ///
    /// The OS silently discards a directory watch when the directory is
    /// deleted, even if it is recreated at the same path later.
    fn rearm_directory(&mut self, dir: &Path) -> ConfigResult<()> {
        // Fails when notify already forgot the watch
        let _ = self.inner.unwatch(dir);
        self.inner.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::trace!(dir = %dir.display(), "Re-armed directory watch");
        Ok(())
    }

    fn release_directory(&mut self, dir: &Path) {
        let Some(count) = self.directories.get_mut(dir) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.directories.remove(dir);
            if let Err(e) = self.inner.unwatch(dir) {
                tracing::debug!(dir = %dir.display(), "Unwatch failed: {}", e);
            }
        }
    }
}

impl FileWatcher for NotifyWatcher {
    fn watch(&mut self, path: &Path) -> ConfigResult<()> {
        let normalized = normalize(path);
        let Some(dir) = normalized.parent().map(Path::to_path_buf) else {
            return Ok(());
        };

        let already = self
            .files
            .lock()
            .map(|files| files.contains_key(&normalized))
            .unwrap_or(false);
        if already {
            return self.rearm_directory(&dir);
        }

        self.watch_directory(&dir)?;

        if let Ok(mut files) = self.files.lock() {
            files.insert(normalized, path.to_path_buf());
        }
        tracing::info!(path = %path.display(), "Now watching");
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) {
        let normalized = normalize(path);
        let removed = self
            .files
            .lock()
            .map(|mut files| files.remove(&normalized).is_some())
            .unwrap_or(false);

        if removed {
            if let Some(dir) = normalized.parent() {
                self.release_directory(&dir.to_path_buf());
            }
            tracing::info!(path = %path.display(), "Stopped watching");
        }
    }

    fn watched(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .map(|files| files.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// Absolute path with the parent directory canonicalized
///
/// The file itself may not exist (deleted themes are still watched), so
/// only its directory goes through symlink resolution.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_watcher_tracks_paths() {
        let mut watcher = NullWatcher::default();
        watcher.watch(Path::new("/a/config.ini")).unwrap();
        watcher.watch(Path::new("/a/config.ini")).unwrap();
        watcher.watch(Path::new("/b/themeconfig.ini")).unwrap();
        assert_eq!(watcher.watched().len(), 2);

        watcher.unwatch(Path::new("/a/config.ini"));
        assert_eq!(watcher.watched(), vec![PathBuf::from("/b/themeconfig.ini")]);
    }

    #[test]
    fn test_notify_watcher_shares_parent_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let (mut watcher, _rx) = NotifyWatcher::new().unwrap();

        let first = dir.path().join("config.ini");
        let second = dir.path().join("other.ini");
        watcher.watch(&first).unwrap();
        watcher.watch(&second).unwrap();
        assert_eq!(watcher.directories.len(), 1);
        assert_eq!(watcher.watched().len(), 2);

        watcher.unwatch(&first);
        assert_eq!(watcher.directories.len(), 1);
        watcher.unwatch(&second);
        assert!(watcher.directories.is_empty());
        assert!(watcher.watched().is_empty());
    }

    #[tokio::test]
    async fn test_notify_watcher_forwards_writes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("themeconfig.ini");
        std::fs::write(&path, "[Taskbar]\n").unwrap();

        let (mut watcher, mut rx) = NotifyWatcher::new().unwrap();
        watcher.watch(&path).unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();
        std::fs::write(&path, "[Taskbar]\nwidth = 50%\n").unwrap();

        let received = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("no change notification")
            .expect("channel closed");
        assert_eq!(received, path);
    }

    #[tokio::test]
    async fn test_watch_again_rearms_after_directory_is_recreated() {
        let root = tempfile::TempDir::new().unwrap();
        let theme_dir = root.path().join("dark");
        let path = theme_dir.join("themeconfig.ini");
        std::fs::create_dir_all(&theme_dir).unwrap();
        std::fs::write(&path, "[Taskbar]\n").unwrap();

        let (mut watcher, mut rx) = NotifyWatcher::new().unwrap();
        watcher.watch(&path).unwrap();

        std::fs::remove_dir_all(&theme_dir).unwrap();
        std::fs::create_dir_all(&theme_dir).unwrap();
        // Let the removal events arrive, then forget them
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        while rx.try_recv().is_ok() {}

        watcher.watch(&path).unwrap();
        assert_eq!(watcher.watched(), vec![path.clone()]);
        assert_eq!(watcher.directories.len(), 1);
        std::fs::write(&path, "[Taskbar]\nheight = 40px\n").unwrap();

        let received = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("no change notification after re-arming")
            .expect("channel closed");
        assert_eq!(received, path);
    }
}
