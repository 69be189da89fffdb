//! Configuration system for deskshell
//!
//! This module merges an app-level config with a selectable, user-overridable
//! theme, detects which sections changed when a file is edited on disk and
//! publishes those changes to the UI containers.

pub mod document;
pub mod error;
pub mod fingerprint;
pub mod manager;
pub mod paths;
pub mod preferences;
pub mod store;
pub mod theme;
pub mod watcher;

pub use document::{ConfigDocument, Section};
pub use error::{ConfigError, ConfigResult, ParseError};
pub use fingerprint::{SectionChangeDetector, SectionFingerprints};
pub use manager::{ChangeEvent, ChangedSections, ConfigManager, ConfigSource, SubscriptionId};
pub use paths::{ShellPaths, ThemeLayout};
pub use preferences::{ButtonKind, PowerButton, PowerMenuPreferences};
pub use store::TypedConfigStore;
pub use theme::{GlobalDefaults, Resource, ThemeOrigin, ThemeResolution, ThemeResolver, ThemeState};
pub use watcher::{FileWatcher, NotifyWatcher, NullWatcher};

use anyhow::{Context, Result};
use std::path::Path;

/// Read a raw value from a config file (`section.key` style lookup for the CLI)
pub fn get_config_value(path: &Path, section: &str, key: &str) -> Result<String> {
    let document = TypedConfigStore::read_document(path)?;
    document
        .get(section, key)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: [{}] {}", section, key))
}

/// Set a value in a config file, creating the file if needed
///
/// The running shell picks the edit up through its file watcher.
pub fn set_config_value(path: &Path, section: &str, key: &str, value: &str) -> Result<()> {
    let mut document = match TypedConfigStore::read_document(path) {
        Ok(document) => document,
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            ConfigDocument::new()
        }
        Err(e) => return Err(e).context("Refusing to overwrite an unreadable config file"),
    };

    if section.trim().is_empty() || key.trim().is_empty() {
        anyhow::bail!("Section and key must not be empty");
    }
    if value.contains('\n') || key.contains(['=', ':', '\n']) {
        anyhow::bail!("Key or value contains characters that cannot be stored");
    }

    document.set(section.trim(), key.trim(), value.trim());

    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent)?;
    }
    std::fs::write(path, document.to_ini_string())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_config_value() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prefs").join("config.ini");

        set_config_value(&path, "Theme", "current_theme", "dark").unwrap();
        set_config_value(&path, "Theme", "current_theme", "light").unwrap();
        set_config_value(&path, "Shell", "show_desktop", "yes").unwrap();

        assert_eq!(get_config_value(&path, "Theme", "current_theme").unwrap(), "light");
        assert_eq!(get_config_value(&path, "Shell", "show_desktop").unwrap(), "yes");
        assert!(get_config_value(&path, "Shell", "missing").is_err());
    }

    #[test]
    fn test_set_refuses_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "no header here\n").unwrap();

        assert!(set_config_value(&path, "Theme", "current_theme", "dark").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "no header here\n");
    }

    #[test]
    fn test_set_rejects_unstorable_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        assert!(set_config_value(&path, "Theme", "a=b", "x").is_err());
        assert!(set_config_value(&path, "", "k", "x").is_err());
    }
}
