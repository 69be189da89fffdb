//! Widget lifecycle manager
//!
//! One [`WidgetPluginManager`] per container. It instantiates the widgets
//! named by the container's `active_widgets` theme key and forwards the
//! lifecycle hooks each widget opted into.

use super::registry::WidgetRegistry;
use super::widget::{ContainerHandle, ContainerRole, PanelGeometry, Widget, WidgetContext};
use super::{WidgetError, WidgetResult};
use crate::config::{ChangeEvent, ThemeState};
use std::rc::Rc;

/// Theme key listing a container's widgets, comma-separated and ordered
pub const ACTIVE_WIDGETS_KEY: &str = "active_widgets";

/// Outcome of [`WidgetPluginManager::load_active`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Identifiers instantiated, in list order
    pub loaded: Vec<String>,
    /// Identifiers skipped and why
    pub failed: Vec<(String, WidgetError)>,
}

/// Loads, holds and notifies the widgets of one container
pub struct WidgetPluginManager {
    parent: ContainerHandle,
    registry: Rc<WidgetRegistry>,
    widgets: Vec<Box<dyn Widget>>,
}

impl WidgetPluginManager {
    pub fn new(parent: ContainerHandle, registry: Rc<WidgetRegistry>) -> Self {
        Self {
            parent,
            registry,
            widgets: Vec::new(),
        }
    }

    pub fn role(&self) -> ContainerRole {
        self.parent.role()
    }

    /// Rebuild the widget set from the theme's `active_widgets` list
    ///
    /// Every held widget is detached before the first new one is built.
    /// A widget that cannot be resolved or constructed is logged and skipped;
    /// the rest of the list still loads.
    pub fn load_active(&mut self, theme: &ThemeState) -> LoadReport {
        self.unload_all();

        let role = self.role();
        let ids = theme.store().get_list(role.section(), ACTIVE_WIDGETS_KEY);
        tracing::debug!(%role, widgets = ?ids, "Loading active widgets");

        let mut report = LoadReport::default();
        for id in ids {
            match self.instantiate(&id, theme) {
                Ok(widget) => {
                    tracing::info!(%role, widget = %id, "Widget loaded");
                    self.widgets.push(widget);
                    report.loaded.push(id);
                }
                Err(e) => {
                    tracing::error!(%role, widget = %id, "Failed to load widget: {}", e);
                    report.failed.push((id, e));
                }
            }
        }

        if !report.failed.is_empty() {
            tracing::warn!(
                %role,
                "Loaded {} widget(s) with {} failure(s)",
                report.loaded.len(),
                report.failed.len()
            );
        }
        report
    }

    fn instantiate(&self, id: &str, theme: &ThemeState) -> WidgetResult<Box<dyn Widget>> {
        let factory = self.registry.resolve(self.role(), id)?;
        let ctx = WidgetContext {
            id,
            parent: &self.parent,
            theme,
        };
        factory(&ctx).map_err(|e| WidgetError::Construction {
            id: id.to_string(),
            reason: format!("{:#}", e),
        })
    }

    /// Forward a change event to every widget with a reload hook
    pub fn notify_reload(&mut self, event: &ChangeEvent) {
        for widget in self.widgets.iter_mut() {
            if let Some(hook) = widget.as_reload() {
                hook.reload(event);
            }
        }
    }

    /// Forward the container geometry to every widget with an init hook
    pub fn notify_init(&mut self, geometry: PanelGeometry) {
        for widget in self.widgets.iter_mut() {
            if let Some(hook) = widget.as_init() {
                hook.init(geometry);
            }
        }
    }

    /// Detach and drop every held widget
    pub fn unload_all(&mut self) {
        if self.widgets.is_empty() {
            return;
        }
        tracing::debug!(role = %self.role(), count = self.widgets.len(), "Unloading widgets");
        for mut widget in self.widgets.drain(..) {
            widget.detach();
        }
    }

    /// Identifiers of the held widgets, in load order
    pub fn ids(&self) -> Vec<String> {
        self.widgets.iter().map(|w| w.id().to_string()).collect()
    }

    pub fn widgets(&self) -> &[Box<dyn Widget>] {
        &self.widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl Drop for WidgetPluginManager {
    fn drop(&mut self) {
        self.unload_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ChangedSections, ConfigDocument, ConfigSource, PowerMenuPreferences, ThemeOrigin,
        ThemeResolution, TypedConfigStore,
    };
    use crate::widgets::{WidgetInit, WidgetReload};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::Arc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Widget recording every hook call
    struct Probe {
        id: String,
        log: Log,
        hooks: bool,
    }

    impl Widget for Probe {
        fn id(&self) -> &str {
            &self.id
        }

        fn as_init(&mut self) -> Option<&mut dyn WidgetInit> {
            if self.hooks { Some(self) } else { None }
        }

        fn as_reload(&mut self) -> Option<&mut dyn WidgetReload> {
            if self.hooks { Some(self) } else { None }
        }

        fn detach(&mut self) {
            self.log.borrow_mut().push(format!("detach {}", self.id));
        }
    }

    impl WidgetInit for Probe {
        fn init(&mut self, geometry: PanelGeometry) {
            self.log
                .borrow_mut()
                .push(format!("init {} {}x{}", self.id, geometry.width, geometry.height));
        }
    }

    impl WidgetReload for Probe {
        fn reload(&mut self, event: &ChangeEvent) {
            self.log
                .borrow_mut()
                .push(format!("reload {} {}", self.id, event.sections));
        }
    }

    fn theme(body: &str) -> ThemeState {
        let resolution = ThemeResolution {
            name: "default".to_string(),
            directory: PathBuf::from("/themes/default"),
            config_file: PathBuf::from("/themes/default/themeconfig.ini"),
            origin: ThemeOrigin::BuiltIn,
            builtin_directory: PathBuf::from("/themes/default"),
        };
        let store = TypedConfigStore::from_document(ConfigDocument::parse(body).unwrap(), None);
        ThemeState::from_store(store, resolution)
    }

    fn registry(log: &Log) -> Rc<WidgetRegistry> {
        let mut registry = WidgetRegistry::new();
        for (id, hooks) in [("probe", true), ("silent", false)] {
            let log = Rc::clone(log);
            registry.register(ContainerRole::Taskbar, id, move |ctx| {
                log.borrow_mut().push(format!("create {}", ctx.id));
                Ok(Box::new(Probe {
                    id: ctx.id.to_string(),
                    log: Rc::clone(&log),
                    hooks,
                }) as Box<dyn Widget>)
            });
        }
        registry.register(ContainerRole::Taskbar, "broken", |_| {
            anyhow::bail!("missing entry point")
        });
        Rc::new(registry)
    }

    fn manager(log: &Log) -> WidgetPluginManager {
        WidgetPluginManager::new(
            ContainerHandle::new(ContainerRole::Taskbar, "/widgets"),
            registry(log),
        )
    }

    fn event(theme: ThemeState, sections: ChangedSections) -> ChangeEvent {
        ChangeEvent {
            source: ConfigSource::Theme,
            sections,
            app: Arc::new(TypedConfigStore::new()),
            theme: Arc::new(theme),
            preferences: Arc::new(PowerMenuPreferences::default()),
        }
    }

    #[test]
    fn test_failures_do_not_abort_loading() {
        let log = Log::default();
        let mut manager = manager(&log);
        let theme = theme("[Taskbar]\nactive_widgets = probe, bogus, broken, probe\n");

        let report = manager.load_active(&theme);

        assert_eq!(report.loaded, vec!["probe", "probe"]);
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(report.failed[0].1, WidgetError::NotFound { .. }));
        assert!(matches!(
            &report.failed[1].1,
            WidgetError::Construction { reason, .. } if reason == "missing entry point"
        ));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_reload_tears_down_before_rebuilding() {
        let log = Log::default();
        let mut manager = manager(&log);
        manager.load_active(&theme("[Taskbar]\nactive_widgets = probe\n"));
        log.borrow_mut().clear();

        manager.load_active(&theme("[Taskbar]\nactive_widgets = probe\n"));
        assert_eq!(*log.borrow(), vec!["detach probe", "create probe"]);
    }

    #[test]
    fn test_hooks_only_reach_widgets_that_declare_them() {
        let log = Log::default();
        let mut manager = manager(&log);
        manager.load_active(&theme("[Taskbar]\nactive_widgets = silent, probe\n"));
        log.borrow_mut().clear();

        manager.notify_init(PanelGeometry {
            width: 1700,
            height: 30,
        });
        manager.notify_reload(&event(theme(""), ChangedSections::All));

        assert_eq!(*log.borrow(), vec!["init probe 1700x30", "reload probe ALL"]);
    }

    #[test]
    fn test_missing_section_loads_nothing() {
        let log = Log::default();
        let mut manager = manager(&log);
        let report = manager.load_active(&theme("[Desktop]\nactive_widgets = probe\n"));
        assert!(report.loaded.is_empty());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_drop_detaches_widgets() {
        let log = Log::default();
        {
            let mut manager = manager(&log);
            manager.load_active(&theme("[Taskbar]\nactive_widgets = probe, silent\n"));
        }
        assert!(log.borrow().contains(&"detach probe".to_string()));
        assert!(log.borrow().contains(&"detach silent".to_string()));
    }
}
