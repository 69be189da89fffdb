//! Typed, fallback-defaulted access to one configuration document
//!
//! A missing file, a malformed file, a missing section or key, or a value of
//! the wrong type never raises: every accessor takes an explicit fallback and
//! returns it whenever resolution fails.

use super::document::ConfigDocument;
use super::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Unit suffixes stripped by the tolerant numeric accessors
const UNIT_SUFFIXES: &[&str] = &["px", "%"];

/// A parsed document plus the path it was loaded from
#[derive(Debug, Clone, Default)]
pub struct TypedConfigStore {
    document: ConfigDocument,
    path: Option<PathBuf>,
}

impl TypedConfigStore {
    /// Create an empty store not bound to any file
    ///
    /// Every accessor returns its fallback until a document is loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already parsed document
    pub fn from_document(document: ConfigDocument, path: Option<PathBuf>) -> Self {
        Self { document, path }
    }

    /// Parse the file at `path` into a fresh store
    ///
    /// A missing or malformed file yields an empty document; the failure is
    /// logged, never returned.
    pub fn load(path: &Path) -> Self {
        let document = match Self::read_document(path) {
            Ok(document) => {
                tracing::debug!(path = %path.display(), sections = document.section_names().len(), "Config document loaded");
                document
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                ConfigDocument::new()
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "Discarding config document: {}", e);
                ConfigDocument::new()
            }
        };

        Self {
            document,
            path: Some(path.to_path_buf()),
        }
    }

    /// Read and parse a document, reporting why it failed
    pub fn read_document(path: &Path) -> ConfigResult<ConfigDocument> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        ConfigDocument::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path this store was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying document
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Raw, untyped value
    pub fn raw(&self, section: &str, key: &str) -> Option<&str> {
        self.document.get(section, key)
    }

    pub fn get_string(&self, section: &str, key: &str, fallback: &str) -> String {
        self.raw(section, key).unwrap_or(fallback).to_string()
    }

    /// Boolean lookup accepting true/false, yes/no, on/off and 1/0 in any case
    pub fn get_bool(&self, section: &str, key: &str, fallback: bool) -> bool {
        self.raw(section, key)
            .and_then(parse_bool)
            .unwrap_or(fallback)
    }

    /// Integer lookup tolerating a trailing `px` or `%` unit
    pub fn get_int(&self, section: &str, key: &str, fallback: i64) -> i64 {
        self.raw(section, key)
            .and_then(parse_tolerant::<i64>)
            .unwrap_or(fallback)
    }

    /// Floating-point lookup tolerating a trailing `px` or `%` unit
    pub fn get_float(&self, section: &str, key: &str, fallback: f64) -> f64 {
        self.raw(section, key)
            .and_then(parse_tolerant::<f64>)
            .filter(|v| v.is_finite())
            .unwrap_or(fallback)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.document.has_section(section)
    }

    /// Comma-separated list with blanks dropped, order kept
    pub fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.raw(section, key)
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a number, retrying once with a trailing unit suffix removed
fn parse_tolerant<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse() {
        return Some(value);
    }

    UNIT_SUFFIXES
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(*suffix))
        .and_then(|stripped| stripped.trim().parse().ok())
}
