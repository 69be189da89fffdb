//! Widget directory discovery
//!
//! Scans `<widgets_dir>/<role>/<id>/` for widget resource directories and
//! cross-checks them against the registry.

use super::registry::WidgetRegistry;
use super::widget::ContainerRole;
use crate::config::paths::WIDGET_LOCAL_CONFIG;
use std::path::{Path, PathBuf};

/// A widget resource directory found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDirectory {
    pub role: ContainerRole,
    pub id: String,
    pub path: PathBuf,
    /// Local fallback config, if the widget ships one
    pub local_config: Option<PathBuf>,
}

/// Widget loader
#[derive(Debug, Clone)]
pub struct WidgetLoader {
    widgets_dir: PathBuf,
}

impl WidgetLoader {
    /// Create a loader over a widgets directory
    pub fn with_dir(widgets_dir: PathBuf) -> Self {
        Self { widgets_dir }
    }

    pub fn widgets_dir(&self) -> &Path {
        &self.widgets_dir
    }

    /// Widget directories of one container role, sorted by identifier
    pub fn discover(&self, role: ContainerRole) -> Vec<WidgetDirectory> {
        let role_dir = self.widgets_dir.join(role.dir_name());
        let entries = match std::fs::read_dir(&role_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %role_dir.display(), "No widget directory: {}", e);
                return vec![];
            }
        };

        let mut found: Vec<WidgetDirectory> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let id = path.file_name()?.to_str()?.to_string();
                let local = path.join(WIDGET_LOCAL_CONFIG);
                Some(WidgetDirectory {
                    role,
                    id,
                    local_config: local.is_file().then_some(local),
                    path,
                })
            })
            .collect();

        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// Widget directories of every role
    pub fn discover_all(&self) -> Vec<WidgetDirectory> {
        ContainerRole::ALL
            .into_iter()
            .flat_map(|role| self.discover(role))
            .collect()
    }

    /// Log directories that no registered factory can instantiate
    ///
    /// Returns the unmatched directories.
    pub fn check_registry(&self, registry: &WidgetRegistry) -> Vec<WidgetDirectory> {
        let unmatched: Vec<WidgetDirectory> = self
            .discover_all()
            .into_iter()
            .filter(|dir| !registry.contains(dir.role, &dir.id))
            .collect();

        for dir in &unmatched {
            tracing::warn!(
                role = %dir.role,
                widget = %dir.id,
                path = %dir.path.display(),
                "Widget directory has no registered factory"
            );
        }
        unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_widget_directories() {
        let tmp = TempDir::new().unwrap();
        let taskbar = tmp.path().join("taskbar");
        std::fs::create_dir_all(taskbar.join("clock")).unwrap();
        std::fs::create_dir_all(taskbar.join("battery")).unwrap();
        std::fs::write(taskbar.join("clock").join(WIDGET_LOCAL_CONFIG), "[Taskbar.Clock]\n").unwrap();
        std::fs::write(taskbar.join("README.txt"), "not a widget").unwrap();

        let loader = WidgetLoader::with_dir(tmp.path().to_path_buf());
        let found = loader.discover(ContainerRole::Taskbar);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "battery");
        assert!(found[0].local_config.is_none());
        assert_eq!(found[1].id, "clock");
        assert!(found[1].local_config.is_some());
        assert!(loader.discover(ContainerRole::Desktop).is_empty());
    }

    #[test]
    fn test_check_registry_reports_unmatched() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("taskbar").join("clock")).unwrap();
        std::fs::create_dir_all(tmp.path().join("taskbar").join("weather")).unwrap();

        let loader = WidgetLoader::with_dir(tmp.path().to_path_buf());
        let unmatched = loader.check_registry(&WidgetRegistry::builtin());
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].id, "weather");
    }
}
