//! Shared container behaviour
//!
//! A container re-reads its own theme section when it changes, keeps its
//! widget set in sync with `active_widgets`, and forwards every event to its
//! widgets.

use crate::config::{ChangeEvent, ConfigSource, ThemeState};
use crate::widgets::{
    ACTIVE_WIDGETS_KEY, ContainerHandle, ContainerRole, LoadReport, PanelGeometry, WidgetPluginManager,
    WidgetRegistry,
};
use std::path::Path;
use std::rc::Rc;

/// Widget manager plus the list it was last loaded from
pub struct WidgetHost {
    manager: WidgetPluginManager,
    active: Vec<String>,
}

impl WidgetHost {
    pub fn new(role: ContainerRole, widgets_root: &Path, registry: Rc<WidgetRegistry>) -> Self {
        Self {
            manager: WidgetPluginManager::new(ContainerHandle::new(role, widgets_root), registry),
            active: Vec::new(),
        }
    }

    /// Rebuild the widget set unconditionally
    pub fn load(&mut self, theme: &ThemeState) -> LoadReport {
        self.active = active_list(self.manager.role(), theme);
        self.manager.load_active(theme)
    }

    /// Rebuild the widget set only if `active_widgets` changed
    pub fn reload_if_changed(&mut self, theme: &ThemeState) -> Option<LoadReport> {
        if active_list(self.manager.role(), theme) == self.active {
            return None;
        }
        tracing::info!(role = %self.manager.role(), "Active widget list changed");
        Some(self.load(theme))
    }

    pub fn manager(&self) -> &WidgetPluginManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut WidgetPluginManager {
        &mut self.manager
    }
}

fn active_list(role: ContainerRole, theme: &ThemeState) -> Vec<String> {
    theme.store().get_list(role.section(), ACTIVE_WIDGETS_KEY)
}

/// A top-level UI surface hosting widgets
pub trait Container {
    fn role(&self) -> ContainerRole;

    /// Re-read the container's own section: style and geometry
    fn restyle(&mut self, theme: &ThemeState);

    /// Size widgets lay themselves out in
    fn panel_geometry(&self) -> PanelGeometry;

    fn host(&self) -> &WidgetHost;

    fn host_mut(&mut self) -> &mut WidgetHost;

    /// Full refresh: restyle, rebuild widgets, hand them the geometry
    fn apply(&mut self, theme: &ThemeState) {
        self.restyle(theme);
        self.host_mut().load(theme);
        let geometry = self.panel_geometry();
        self.host_mut().manager_mut().notify_init(geometry);
    }

    /// React to a published configuration change
    fn handle_event(&mut self, event: &ChangeEvent) {
        let section = self.role().section();

        if event.source == ConfigSource::Theme && event.sections.is_all() {
            tracing::debug!(role = %self.role(), "Full refresh");
            self.apply(&event.theme);
        } else if event.affects_theme_section(section) {
            tracing::debug!(role = %self.role(), "Section changed, restyling");
            self.restyle(&event.theme);
            self.host_mut().reload_if_changed(&event.theme);
            let geometry = self.panel_geometry();
            self.host_mut().manager_mut().notify_init(geometry);
        }

        self.host_mut().manager_mut().notify_reload(event);
    }

    /// Identifiers of the hosted widgets
    fn widget_ids(&self) -> Vec<String> {
        self.host().manager().ids()
    }
}
