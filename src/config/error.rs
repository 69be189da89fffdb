//! Configuration error taxonomy
//!
//! None of these escape the configuration core as fatal errors. The store,
//! the theme resolver and the manager convert each of them into "use the
//! fallback and log" at the boundary where they occur.

use std::path::PathBuf;

/// Errors raised while reading, parsing or watching configuration files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to parse JSON document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Syntax errors in a section/key-value document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: key/value pair before any [section] header")]
    MissingSectionHeader { line: usize },

    #[error("line {line}: section '{name}' is declared twice")]
    DuplicateSection { line: usize, name: String },

    #[error("line {line}: key '{key}' is declared twice in section '{section}'")]
    DuplicateKey {
        line: usize,
        section: String,
        key: String,
    },

    #[error("line {line}: empty section name")]
    EmptySectionName { line: usize },

    #[error("line {line}: empty key")]
    EmptyKey { line: usize },

    #[error("line {line}: expected 'key = value', got '{content}'")]
    MalformedLine { line: usize, content: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
