//! User preference documents
//!
//! JSON documents that live next to the app config and are edited by the
//! user, e.g. the list of power menu buttons.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a power menu button does when pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    /// Handled inside the shell (e.g. `close`)
    Integrated,
    /// Shell command line
    Console,
    /// Program launch
    Program,
}

/// One power menu button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerButton {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ButtonKind,

    #[serde(default)]
    pub action: String,

    /// Extra style rules appended to the themed button style
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub override_styles: String,
}

/// Contents of `powermenudata.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerMenuPreferences {
    #[serde(default)]
    pub buttons: Vec<PowerButton>,
}

impl PowerMenuPreferences {
    /// Load preferences, falling back to an empty button list
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(prefs) => {
                tracing::debug!(path = %path.display(), buttons = prefs.buttons.len(), "Power menu preferences loaded");
                prefs
            }
            Err(e) => {
                tracing::warn!("Using empty power menu preferences: {}", e);
                Self::default()
            }
        }
    }

    /// Read preferences, reporting why they could not be used
    pub fn read(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
