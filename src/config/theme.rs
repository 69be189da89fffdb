//! Theme resolution and the active theme state
//!
//! Resolution order for a theme name:
//! 1. User themes directory (`userdata/themes/<name>/themeconfig.ini`)
//! 2. Built-in themes directory (`app/themes/<name>/themeconfig.ini`)
//! 3. The same search for `default`
//!
//! If even `default` has no descriptor the built-in `default` directory is
//! returned anyway; loading it yields an empty document and every consumer
//! falls back to its hard-coded defaults.

use super::paths::{ShellPaths, THEME_DESCRIPTOR};
use super::store::TypedConfigStore;
use std::path::{Path, PathBuf};

/// Name of the theme every failed resolution falls back to
pub const DEFAULT_THEME: &str = "default";

/// File extensions treated as theme-relative assets
const ASSET_EXTENSIONS: &[&str] = &["ttf", "otf", "png", "jpg", "jpeg", "bmp", "gif", "svg", "ico"];

/// Font file extensions
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Which search location a theme was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeOrigin {
    User,
    BuiltIn,
    /// Nothing found, not even `default`
    Missing,
}

/// Outcome of resolving a theme name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeResolution {
    /// Name that was actually resolved (may be `default` after fallback)
    pub name: String,
    pub directory: PathBuf,
    pub config_file: PathBuf,
    pub origin: ThemeOrigin,
    /// Built-in directory of the same name, consulted for resources a user
    /// theme does not ship itself
    pub builtin_directory: PathBuf,
}

/// Locates theme directories on disk
#[derive(Debug, Clone)]
pub struct ThemeResolver {
    user_root: PathBuf,
    builtin_root: PathBuf,
}

impl ThemeResolver {
    pub fn new(paths: &ShellPaths) -> Self {
        Self::with_roots(paths.user_themes_dir(), paths.builtin_themes_dir())
    }

    /// Resolver over explicit user and built-in roots
    pub fn with_roots(user_root: PathBuf, builtin_root: PathBuf) -> Self {
        Self {
            user_root,
            builtin_root,
        }
    }

    /// Resolve a theme name to its directory and descriptor file
    pub fn resolve(&self, theme_name: &str) -> ThemeResolution {
        if is_valid_theme_name(theme_name) {
            let user_dir = self.user_root.join(theme_name);
            if user_dir.join(THEME_DESCRIPTOR).is_file() {
                tracing::info!(theme = theme_name, "Loading user theme");
                return self.resolution(theme_name, user_dir, ThemeOrigin::User);
            }

            let builtin_dir = self.builtin_root.join(theme_name);
            if builtin_dir.join(THEME_DESCRIPTOR).is_file() {
                tracing::info!(theme = theme_name, "Loading built-in theme");
                return self.resolution(theme_name, builtin_dir, ThemeOrigin::BuiltIn);
            }
        } else {
            tracing::warn!(theme = theme_name, "Rejecting invalid theme name");
        }

        if theme_name != DEFAULT_THEME {
            tracing::warn!(theme = theme_name, "Theme not found, falling back to '{}'", DEFAULT_THEME);
            return self.resolve(DEFAULT_THEME);
        }

        tracing::error!("Default theme is missing, continuing with built-in defaults");
        let dir = self.builtin_root.join(DEFAULT_THEME);
        self.resolution(DEFAULT_THEME, dir, ThemeOrigin::Missing)
    }

    fn resolution(&self, name: &str, directory: PathBuf, origin: ThemeOrigin) -> ThemeResolution {
        ThemeResolution {
            name: name.to_string(),
            config_file: directory.join(THEME_DESCRIPTOR),
            directory,
            origin,
            builtin_directory: self.builtin_root.join(name),
        }
    }

    /// List available themes
    ///
    /// Merges user and built-in theme directories that hold a descriptor and
    /// always includes `default`.
    pub fn list_themes(&self) -> Vec<String> {
        let mut themes = Vec::new();

        for root in [&self.user_root, &self.builtin_root] {
            let Ok(entries) = std::fs::read_dir(root) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.join(THEME_DESCRIPTOR).is_file() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if !themes.iter().any(|t| t == name) {
                        themes.push(name.to_string());
                    }
                }
            }
        }

        if !themes.iter().any(|t| t == DEFAULT_THEME) {
            themes.push(DEFAULT_THEME.to_string());
        }

        themes.sort();
        themes
    }
}

/// Theme names are single path components
fn is_valid_theme_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// `[Global]` font defaults shared by every section that omits its own
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDefaults {
    pub font_family: String,
    pub font_size: i64,
    pub font_color: String,
    pub font_shadow: bool,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            font_family: "Segoe UI".to_string(),
            font_size: 12,
            font_color: "#FFFFFF".to_string(),
            font_shadow: true,
        }
    }
}

/// A resolved theme value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Path to an asset file
    File(PathBuf),
    /// Anything else (color, font family name, ...), unchanged
    Literal(String),
}

impl Resource {
    /// Render as the string a consumer would hand to its toolkit
    pub fn as_string(&self) -> String {
        match self {
            Resource::File(path) => path.display().to_string(),
            Resource::Literal(value) => value.clone(),
        }
    }
}

/// The active theme: its store, where it was loaded from, and its globals
///
/// Created fresh on every load and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct ThemeState {
    store: TypedConfigStore,
    resolution: ThemeResolution,
    globals: GlobalDefaults,
}

impl ThemeState {
    /// Load the descriptor named by `resolution`
    pub fn load(resolution: ThemeResolution) -> Self {
        let store = TypedConfigStore::load(&resolution.config_file);
        Self::from_store(store, resolution)
    }

    /// Build from an already loaded store, computing the globals
    pub fn from_store(store: TypedConfigStore, resolution: ThemeResolution) -> Self {
        let mut state = Self {
            store,
            resolution,
            globals: GlobalDefaults::default(),
        };
        state.globals = state.parse_globals();
        tracing::debug!(
            theme = %state.resolution.name,
            font = %state.globals.font_family,
            "Cached theme global properties"
        );
        state
    }

    /// Placeholder used before the first load completes
    pub fn empty(resolution: ThemeResolution) -> Self {
        Self::from_store(TypedConfigStore::new(), resolution)
    }

    fn parse_globals(&self) -> GlobalDefaults {
        let defaults = GlobalDefaults::default();
        let raw_font = self
            .store
            .get_string("Global", "font_family", &defaults.font_family);

        GlobalDefaults {
            font_family: self.resolve_font(&raw_font),
            font_size: self.store.get_int("Global", "font_size", defaults.font_size),
            font_color: self
                .store
                .get_string("Global", "font_color", &defaults.font_color),
            font_shadow: self
                .store
                .get_bool("Global", "font_shadow", defaults.font_shadow),
        }
    }

    pub fn store(&self) -> &TypedConfigStore {
        &self.store
    }

    pub fn globals(&self) -> &GlobalDefaults {
        &self.globals
    }

    pub fn name(&self) -> &str {
        &self.resolution.name
    }

    pub fn directory(&self) -> &Path {
        &self.resolution.directory
    }

    pub fn config_file(&self) -> &Path {
        &self.resolution.config_file
    }

    pub fn resolution(&self) -> &ThemeResolution {
        &self.resolution
    }

    /// Resolve a raw theme value that may name an asset
    ///
    /// Absolute asset paths are kept as-is. Relative asset paths are looked
    /// up in the theme directory, then in the built-in directory of the same
    /// theme; when neither holds the file the theme-directory path is
    /// returned so the caller's error names the expected location. Values
    /// without an asset extension are literals.
    pub fn resolve_resource(&self, raw: &str) -> Resource {
        let raw = raw.trim();
        if !has_extension(raw, ASSET_EXTENSIONS) {
            return Resource::Literal(raw.to_string());
        }

        let path = Path::new(raw);
        if path.is_absolute() {
            return Resource::File(path.to_path_buf());
        }

        let primary = self.resolution.directory.join(path);
        if primary.exists() {
            return Resource::File(primary);
        }

        let inherited = self.resolution.builtin_directory.join(path);
        if inherited.exists() {
            return Resource::File(inherited);
        }

        Resource::File(primary)
    }

    /// Font family value: font files resolve to paths, family names stay
    pub fn resolve_font(&self, raw: &str) -> String {
        if has_extension(raw.trim(), FONT_EXTENSIONS) {
            self.resolve_resource(raw).as_string()
        } else {
            raw.to_string()
        }
    }
}

fn has_extension(value: &str, extensions: &[&str]) -> bool {
    Path::new(value)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}
