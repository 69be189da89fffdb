//! Installation layout resolution
//!
//! Every configuration path hangs off one base directory:
//! - `userdata/preferences/program/config.ini` - app config
//! - `userdata/preferences/user/powermenudata.json` - power menu buttons
//! - `userdata/themes/<name>/` - user themes (highest priority)
//! - `app/themes/<name>/` - built-in themes (`themes/<name>/` in the simple layout)
//! - `app/widgets/<role>/<id>/` - widget resources and local config

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File name of a theme descriptor inside a theme directory
pub const THEME_DESCRIPTOR: &str = "themeconfig.ini";

/// File name of a widget's optional local config
pub const WIDGET_LOCAL_CONFIG: &str = "config.ini";

/// Where built-in themes live relative to the base directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeLayout {
    /// `<base>/app/themes/<name>/`
    #[default]
    Standard,
    /// `<base>/themes/<name>/`
    Simple,
}

/// Resolve the installation base directory
///
/// Checks, in order: an explicit override, the DESKSHELL_BASE_DIR environment
/// variable, the directory of the running executable, and the platform data
/// directory. Failing all of them is the one fatal configuration condition.
pub fn base_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return absolute(dir);
    }

    if let Ok(dir) = std::env::var("DESKSHELL_BASE_DIR") {
        return absolute(Path::new(&dir));
    }

    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .filter(|dir| dir.join("app").is_dir() || dir.join("themes").is_dir())
    {
        return Ok(dir);
    }

    use directories::ProjectDirs;
    ProjectDirs::from("", "", "deskshell")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .context("Could not determine the deskshell base directory")
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Invalid base directory: {}", path.display()))
}

/// Every well-known path of one installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPaths {
    base: PathBuf,
    layout: ThemeLayout,
}

impl ShellPaths {
    pub fn new(base: impl Into<PathBuf>, layout: ThemeLayout) -> Self {
        Self {
            base: base.into(),
            layout,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn layout(&self) -> ThemeLayout {
        self.layout
    }

    /// App-level config file
    pub fn app_config(&self) -> PathBuf {
        self.base
            .join("userdata")
            .join("preferences")
            .join("program")
            .join("config.ini")
    }

    /// Power menu button preferences
    pub fn power_menu_preferences(&self) -> PathBuf {
        self.base
            .join("userdata")
            .join("preferences")
            .join("user")
            .join("powermenudata.json")
    }

    /// Root of user-installed themes
    pub fn user_themes_dir(&self) -> PathBuf {
        self.base.join("userdata").join("themes")
    }

    /// Root of themes shipped with the shell
    pub fn builtin_themes_dir(&self) -> PathBuf {
        match self.layout {
            ThemeLayout::Standard => self.base.join("app").join("themes"),
            ThemeLayout::Simple => self.base.join("themes"),
        }
    }

    /// Root of widget resource directories
    pub fn widgets_dir(&self) -> PathBuf {
        self.base.join("app").join("widgets")
    }
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let paths = ShellPaths::new("/opt/shell", ThemeLayout::Standard);
        assert_eq!(
            paths.app_config(),
            PathBuf::from("/opt/shell/userdata/preferences/program/config.ini")
        );
        assert_eq!(paths.user_themes_dir(), PathBuf::from("/opt/shell/userdata/themes"));
        assert_eq!(paths.builtin_themes_dir(), PathBuf::from("/opt/shell/app/themes"));
        assert_eq!(paths.widgets_dir(), PathBuf::from("/opt/shell/app/widgets"));
    }

    #[test]
    fn test_simple_layout() {
        let paths = ShellPaths::new("/opt/shell", ThemeLayout::Simple);
        assert_eq!(paths.builtin_themes_dir(), PathBuf::from("/opt/shell/themes"));
        assert_eq!(paths.user_themes_dir(), PathBuf::from("/opt/shell/userdata/themes"));
    }

    #[test]
    fn test_explicit_base_dir_is_absolute() {
        let dir = base_dir(Some(Path::new("relative/base"))).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("relative/base"));
    }
}
