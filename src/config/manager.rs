//! Configuration manager
//!
//! Owns the app-level store, the active theme and the power menu
//! preferences, keeps their files watched, reloads them when they change and
//! publishes [`ChangeEvent`]s to subscribers.
//!
//! All methods run on the single owner thread. File notifications produced
//! elsewhere must be forwarded to [`ConfigManager::on_file_changed`] on that
//! thread (see `config::watcher`).

use super::fingerprint::{SectionChangeDetector, SectionFingerprints};
use super::paths::ShellPaths;
use super::preferences::PowerMenuPreferences;
use super::store::TypedConfigStore;
use super::theme::{DEFAULT_THEME, ThemeResolver, ThemeState};
use super::watcher::FileWatcher;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Section of the app config holding the selected theme
pub const THEME_SECTION: &str = "Theme";

/// Key of the selected theme name
pub const CURRENT_THEME_KEY: &str = "current_theme";

/// Which document an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    App,
    Theme,
    Preferences,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::App => write!(f, "app"),
            ConfigSource::Theme => write!(f, "theme"),
            ConfigSource::Preferences => write!(f, "preferences"),
        }
    }
}

/// Sections affected by a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangedSections {
    /// Everything must be treated as changed (theme switch)
    All,
    /// Only these sections changed, in document order
    Sections(Vec<String>),
}

impl ChangedSections {
    /// Whether a consumer of `section` must refresh
    pub fn affects(&self, section: &str) -> bool {
        match self {
            ChangedSections::All => true,
            ChangedSections::Sections(names) => names.iter().any(|n| n == section),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ChangedSections::All)
    }
}

impl fmt::Display for ChangedSections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangedSections::All => write!(f, "ALL"),
            ChangedSections::Sections(names) => write!(f, "{}", names.join(", ")),
        }
    }
}

/// A published configuration change
///
/// Carries the snapshots current at publication time so subscribers can
/// re-read their sections without reaching back into the manager.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub source: ConfigSource,
    pub sections: ChangedSections,
    pub app: Arc<TypedConfigStore>,
    pub theme: Arc<ThemeState>,
    pub preferences: Arc<PowerMenuPreferences>,
}

impl ChangeEvent {
    /// Whether a consumer of the theme section `section` must refresh
    pub fn affects_theme_section(&self, section: &str) -> bool {
        self.source == ConfigSource::Theme && self.sections.affects(section)
    }
}

/// Handle returned by [`ConfigManager::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ChangeEvent)>;

/// Owner of every live configuration document
pub struct ConfigManager {
    paths: ShellPaths,
    resolver: ThemeResolver,
    watcher: Box<dyn FileWatcher>,

    app: Arc<TypedConfigStore>,
    app_fingerprints: SectionFingerprints,

    current_theme: String,
    theme: Arc<ThemeState>,
    theme_fingerprints: SectionFingerprints,

    preferences: Arc<PowerMenuPreferences>,

    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    initialized: bool,
}

impl ConfigManager {
    /// Create a manager with empty documents
    ///
    /// Accessors are usable immediately and return fallbacks until
    /// [`initialize`](Self::initialize) has loaded the files.
    pub fn new(paths: ShellPaths, watcher: Box<dyn FileWatcher>) -> Self {
        let resolver = ThemeResolver::new(&paths);
        let placeholder = resolver.resolve(DEFAULT_THEME);

        Self {
            paths,
            resolver,
            watcher,
            app: Arc::new(TypedConfigStore::new()),
            app_fingerprints: SectionFingerprints::new(),
            current_theme: DEFAULT_THEME.to_string(),
            theme: Arc::new(ThemeState::empty(placeholder)),
            theme_fingerprints: SectionFingerprints::new(),
            preferences: Arc::new(PowerMenuPreferences::default()),
            subscribers: Vec::new(),
            next_subscription: 0,
            initialized: false,
        }
    }

    /// Load every document, record baselines and start watching
    ///
    /// No event is published for the initial load.
    pub fn initialize(&mut self) {
        let app_path = self.paths.app_config();
        let app = TypedConfigStore::load(&app_path);
        SectionChangeDetector::baseline(&mut self.app_fingerprints, app.document());
        self.current_theme = selected_theme(&app);
        self.app = Arc::new(app);

        let theme = ThemeState::load(self.resolver.resolve(&self.current_theme));
        SectionChangeDetector::baseline(&mut self.theme_fingerprints, theme.store().document());
        self.theme = Arc::new(theme);

        self.preferences = Arc::new(PowerMenuPreferences::load(
            &self.paths.power_menu_preferences(),
        ));

        self.update_watch_list();
        self.initialized = true;

        tracing::info!(
            theme = %self.current_theme,
            resolved = %self.theme.name(),
            dir = %self.theme.directory().display(),
            "Configuration initialized"
        );
    }

    /// Stop watching and drop every subscriber
    pub fn shutdown(&mut self) {
        for path in self.watcher.watched() {
            self.watcher.unwatch(&path);
        }
        self.subscribers.clear();
        self.initialized = false;
        tracing::info!("Configuration manager shut down");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// React to a change of `path` on disk
    ///
    /// Returns the published event, if any. Paths the manager does not own,
    /// and every path while the manager is not initialized, are ignored.
    pub fn on_file_changed(&mut self, path: &Path) -> Option<ChangeEvent> {
        if !self.initialized {
            tracing::debug!(path = %path.display(), "Ignoring change before initialize or after shutdown");
            return None;
        }

        let event = if path == self.paths.app_config() {
            self.reload_app()
        } else if path == self.theme.config_file() {
            self.reload_theme()
        } else if path == self.paths.power_menu_preferences() {
            self.reload_preferences()
        } else {
            tracing::debug!(path = %path.display(), "Ignoring change to unmanaged file");
            None
        };

        // Some platforms drop a watch after one notification
        self.update_watch_list();
        event
    }

    /// Switch to another theme and announce a full refresh
    ///
    /// Always publishes [`ChangedSections::All`], even when the new theme's
    /// values equal the old ones.
    ///
    /// Before `initialize` and after `shutdown` the new theme is loaded but
    /// no file is watched.
    pub fn switch_theme(&mut self, name: &str) -> ChangeEvent {
        tracing::info!(from = %self.current_theme, to = name, "Switching theme");

        let old_file = self.theme.config_file().to_path_buf();
        self.watcher.unwatch(&old_file);

        let theme = ThemeState::load(self.resolver.resolve(name));
        SectionChangeDetector::baseline(&mut self.theme_fingerprints, theme.store().document());
        self.theme = Arc::new(theme);
        self.current_theme = name.to_string();

        if self.initialized {
            self.update_watch_list();
        }
        self.publish(ConfigSource::Theme, ChangedSections::All)
    }

    fn reload_app(&mut self) -> Option<ChangeEvent> {
        tracing::info!("App config changes detected");
        let app = TypedConfigStore::load(&self.paths.app_config());
        let changed = SectionChangeDetector::diff(&mut self.app_fingerprints, app.document());
        let new_theme = selected_theme(&app);
        self.app = Arc::new(app);

        if new_theme != self.current_theme {
            tracing::info!(from = %self.current_theme, to = %new_theme, "Theme switch detected");
            return Some(self.switch_theme(&new_theme));
        }

        if changed.is_empty() {
            tracing::debug!("App config reloaded without section changes");
            return None;
        }
        Some(self.publish(ConfigSource::App, ChangedSections::Sections(changed)))
    }

    fn reload_theme(&mut self) -> Option<ChangeEvent> {
        tracing::info!(theme = %self.theme.name(), "Theme config changes detected");
        let resolution = self.theme.resolution().clone();
        let theme = ThemeState::load(resolution);
        let changed = SectionChangeDetector::diff(&mut self.theme_fingerprints, theme.store().document());
        self.theme = Arc::new(theme);

        if changed.is_empty() {
            tracing::debug!("Theme reloaded without section changes");
            return None;
        }
        Some(self.publish(ConfigSource::Theme, ChangedSections::Sections(changed)))
    }

    fn reload_preferences(&mut self) -> Option<ChangeEvent> {
        tracing::info!("Power menu preferences changed");
        let preferences = PowerMenuPreferences::load(&self.paths.power_menu_preferences());
        if preferences == *self.preferences {
            return None;
        }
        self.preferences = Arc::new(preferences);
        Some(self.publish(ConfigSource::Preferences, ChangedSections::All))
    }

    /// Watch every owned file, re-arming the ones already watched
    fn update_watch_list(&mut self) {
        let wanted = [
            self.paths.app_config(),
            self.theme.config_file().to_path_buf(),
            self.paths.power_menu_preferences(),
        ];

        for path in wanted {
            if let Err(e) = self.watcher.watch(&path) {
                tracing::warn!(path = %path.display(), "Cannot watch file: {}", e);
            }
        }
    }

    /// Register a callback invoked for every published event
    ///
    /// Callbacks run synchronously, in registration order.
    pub fn subscribe(&mut self, callback: impl FnMut(&ChangeEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn publish(&mut self, source: ConfigSource, sections: ChangedSections) -> ChangeEvent {
        let event = self.snapshot_event(source, sections);
        tracing::info!(source = %event.source, sections = %event.sections, "Publishing config change");
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
        event
    }

    /// Event carrying the current snapshots
    pub fn snapshot_event(&self, source: ConfigSource, sections: ChangedSections) -> ChangeEvent {
        ChangeEvent {
            source,
            sections,
            app: Arc::clone(&self.app),
            theme: Arc::clone(&self.theme),
            preferences: Arc::clone(&self.preferences),
        }
    }

    pub fn app(&self) -> Arc<TypedConfigStore> {
        Arc::clone(&self.app)
    }

    pub fn theme(&self) -> Arc<ThemeState> {
        Arc::clone(&self.theme)
    }

    pub fn preferences(&self) -> Arc<PowerMenuPreferences> {
        Arc::clone(&self.preferences)
    }

    /// Theme name as selected, before fallback resolution
    pub fn current_theme(&self) -> &str {
        &self.current_theme
    }

    pub fn paths(&self) -> &ShellPaths {
        &self.paths
    }

    pub fn resolver(&self) -> &ThemeResolver {
        &self.resolver
    }

    pub fn watched_files(&self) -> Vec<PathBuf> {
        self.watcher.watched()
    }
}

fn selected_theme(app: &TypedConfigStore) -> String {
    let name = app.get_string(THEME_SECTION, CURRENT_THEME_KEY, DEFAULT_THEME);
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_THEME.to_string()
    } else {
        name.to_string()
    }
}
