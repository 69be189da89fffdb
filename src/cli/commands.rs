//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::manager::{CURRENT_THEME_KEY, THEME_SECTION};
use crate::config::{ShellPaths, ThemeOrigin, ThemeResolver, TypedConfigStore};
use crate::widgets::{ContainerRole, WidgetLoader, WidgetRegistry};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a value, or a whole section, from the app config
    Get {
        /// Section name (e.g., "Theme")
        section: String,
        /// Key inside the section (e.g., "current_theme")
        key: Option<String>,
    },
    /// Set a value in the app config
    Set {
        section: String,
        key: String,
        value: String,
    },
    /// Show configuration file path
    Path,
}

/// Theme subcommands
#[derive(Subcommand, Debug)]
pub enum ThemesSubcommand {
    /// List available themes
    List,
    /// Show where a theme name resolves to
    Resolve { name: String },
    /// Select a theme (a running shell switches immediately)
    Use { name: String },
}

/// Widget subcommands
#[derive(Subcommand, Debug)]
pub enum WidgetsSubcommand {
    /// List registered widgets and widget directories
    List,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, paths: &ShellPaths) -> Result<()> {
    let app_config = paths.app_config();

    match cmd {
        ConfigSubcommand::Get {
            section,
            key: Some(key),
        } => {
            let value = crate::config::get_config_value(&app_config, &section, &key)?;
            println!("{}", value);
        }
        ConfigSubcommand::Get { section, key: None } => {
            let document = TypedConfigStore::read_document(&app_config)
                .context("Failed to load configuration")?;
            let section = document
                .section(&section)
                .with_context(|| format!("Unknown configuration section: [{}]", section))?;
            for (key, value) in section.entries() {
                println!("{} = {}", key, value);
            }
        }
        ConfigSubcommand::Set {
            section,
            key,
            value,
        } => {
            crate::config::set_config_value(&app_config, &section, &key, &value)
                .with_context(|| format!("Failed to set [{}] {} = {}", section, key, value))?;
            println!("Configuration saved");
        }
        ConfigSubcommand::Path => {
            println!("{}", app_config.display());
        }
    }

    Ok(())
}

/// Handle theme subcommands
pub fn handle_themes_command(cmd: ThemesSubcommand, paths: &ShellPaths) -> Result<()> {
    let resolver = ThemeResolver::new(paths);

    match cmd {
        ThemesSubcommand::List => {
            let current = TypedConfigStore::load(&paths.app_config()).get_string(
                THEME_SECTION,
                CURRENT_THEME_KEY,
                crate::config::theme::DEFAULT_THEME,
            );
            println!("Available themes:");
            for theme in resolver.list_themes() {
                let marker = if theme == current.trim() { "*" } else { "-" };
                println!("  {} {}", marker, theme);
            }
        }
        ThemesSubcommand::Resolve { name } => {
            let resolution = resolver.resolve(&name);
            if resolution.name != name {
                println!("'{}' not found, falls back to '{}'", name, resolution.name);
            }
            let origin = match resolution.origin {
                ThemeOrigin::User => "user",
                ThemeOrigin::BuiltIn => "built-in",
                ThemeOrigin::Missing => "missing",
            };
            println!("Theme:     {}", resolution.name);
            println!("Origin:    {}", origin);
            println!("Directory: {}", resolution.directory.display());
            println!("Config:    {}", resolution.config_file.display());
        }
        ThemesSubcommand::Use { name } => {
            let resolution = resolver.resolve(&name);
            if resolution.name != name || resolution.origin == ThemeOrigin::Missing {
                anyhow::bail!("Theme '{}' not found", name);
            }
            crate::config::set_config_value(
                &paths.app_config(),
                THEME_SECTION,
                CURRENT_THEME_KEY,
                &name,
            )?;
            println!("Theme set to '{}'", name);
        }
    }

    Ok(())
}

/// Handle widget subcommands
pub fn handle_widgets_command(
    cmd: WidgetsSubcommand,
    paths: &ShellPaths,
    registry: &WidgetRegistry,
) -> Result<()> {
    match cmd {
        WidgetsSubcommand::List => {
            let loader = WidgetLoader::with_dir(paths.widgets_dir());
            for role in ContainerRole::ALL {
                println!("{}:", role);
                let directories = loader.discover(role);
                let mut ids = registry.ids(role);
                for dir in &directories {
                    if !ids.contains(&dir.id) {
                        ids.push(dir.id.clone());
                    }
                }
                ids.sort();

                if ids.is_empty() {
                    println!("  (none)");
                }
                for id in ids {
                    let registered = if registry.contains(role, &id) {
                        "registered"
                    } else {
                        "no factory"
                    };
                    let local = directories
                        .iter()
                        .find(|d| d.id == id)
                        .and_then(|d| d.local_config.as_ref())
                        .map(|p| format!(", local config {}", p.display()))
                        .unwrap_or_default();
                    println!("  - {} ({}{})", id, registered, local);
                }
            }
        }
    }

    Ok(())
}
