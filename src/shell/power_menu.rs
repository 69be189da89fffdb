//! Power menu container
//!
//! Buttons come from the user's `powermenudata.json`; their look from the
//! theme's `[PowerMenu]` section.

use super::ScreenSize;
use super::container::{Container, WidgetHost};
use crate::config::{
    ButtonKind, ChangeEvent, ConfigSource, PowerMenuPreferences, ThemeState, TypedConfigStore,
};
use crate::widgets::{ContainerRole, PanelGeometry, Rect, WidgetRegistry};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

const SECTION: &str = "PowerMenu";

/// Resolved power menu appearance
#[derive(Debug, Clone, PartialEq)]
pub struct PowerMenuStyle {
    pub button_size: i64,
    pub border_radius: i64,
    pub hover_color: String,
    pub pressed_color: String,
    pub spacing: i64,
    pub button_color: String,
    pub fullscreen: bool,
    pub blur_enabled: bool,
    pub blur_mode: i64,
    pub background: String,
    pub border_width: i64,
    /// Size of the button strip
    pub width: i64,
    pub height: i64,
}

impl PowerMenuStyle {
    pub fn read(store: &TypedConfigStore) -> Self {
        Self {
            button_size: store.get_int(SECTION, "button_size", 80),
            border_radius: store.get_int(SECTION, "border_radius", 20),
            hover_color: store.get_string(SECTION, "hover_color", "#FFFFFF20"),
            pressed_color: store.get_string(SECTION, "pressed_color", "#FFFFFF40"),
            spacing: store.get_int(SECTION, "spacing", 50),
            button_color: store.get_string(SECTION, "button_color", "transparent"),
            fullscreen: store.get_bool(SECTION, "fullscreen", true),
            blur_enabled: store.get_bool(SECTION, "blur_enabled", true),
            blur_mode: store.get_int(SECTION, "blur_mode", 4),
            background: store.get_string(SECTION, "argb_color", "#00000080"),
            border_width: store.get_int(SECTION, "border_width_px", 1),
            width: store.get_int(SECTION, "width", 600),
            height: store.get_int(SECTION, "height", 200),
        }
    }

    /// Window placement: the whole screen, or the strip centered on it
    pub fn window(&self, screen: ScreenSize) -> Rect {
        if self.fullscreen {
            return Rect {
                x: 0,
                y: 0,
                width: screen.width,
                height: screen.height,
            };
        }
        let strip = self.strip(screen);
        Rect {
            x: (screen.width - strip.width).div_euclid(2),
            y: (screen.height - strip.height).div_euclid(2),
            width: strip.width,
            height: strip.height,
        }
    }

    /// Button strip size, clamped to the screen
    pub fn strip(&self, screen: ScreenSize) -> PanelGeometry {
        PanelGeometry {
            width: self.width.clamp(0, screen.width),
            height: self.height.clamp(0, screen.height),
        }
    }

    fn button_stylesheet(&self, overrides: &str) -> String {
        format!(
            "background-color: {}; border: {}px solid white; border-radius: {}px; \
             hover: {}; pressed: {};{}",
            self.button_color,
            self.border_width,
            self.border_radius,
            self.hover_color,
            self.pressed_color,
            overrides
        )
    }
}

/// A built power menu button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub id: String,
    pub kind: ButtonKind,
    pub action: String,
    /// First letter of the id, uppercased
    pub label: String,
    pub size: i64,
    pub stylesheet: String,
}

/// Power menu container
pub struct PowerMenu {
    screen: ScreenSize,
    style: PowerMenuStyle,
    window: Rect,
    preferences: Arc<PowerMenuPreferences>,
    buttons: Vec<MenuButton>,
    host: WidgetHost,
}

impl PowerMenu {
    pub fn new(screen: ScreenSize, widgets_root: &Path, registry: Rc<WidgetRegistry>) -> Self {
        let style = PowerMenuStyle::read(&TypedConfigStore::new());
        Self {
            screen,
            window: style.window(screen),
            style,
            preferences: Arc::new(PowerMenuPreferences::default()),
            buttons: Vec::new(),
            host: WidgetHost::new(ContainerRole::PowerMenu, widgets_root, registry),
        }
    }

    /// Replace the button preferences and rebuild the buttons
    pub fn set_preferences(&mut self, preferences: Arc<PowerMenuPreferences>) {
        self.preferences = preferences;
        self.rebuild_buttons();
    }

    fn rebuild_buttons(&mut self) {
        self.buttons = self
            .preferences
            .buttons
            .iter()
            .map(|button| MenuButton {
                id: button.id.clone(),
                kind: button.kind.clone(),
                action: button.action.clone(),
                label: button
                    .id
                    .chars()
                    .next()
                    .map(|c| c.to_uppercase().collect())
                    .unwrap_or_default(),
                size: self.style.button_size,
                stylesheet: self.style.button_stylesheet(&button.override_styles),
            })
            .collect();
        tracing::debug!(buttons = self.buttons.len(), "Power menu buttons rebuilt");
    }

    pub fn style(&self) -> &PowerMenuStyle {
        &self.style
    }

    pub fn window(&self) -> Rect {
        self.window
    }

    pub fn buttons(&self) -> &[MenuButton] {
        &self.buttons
    }
}

impl Container for PowerMenu {
    fn role(&self) -> ContainerRole {
        ContainerRole::PowerMenu
    }

    fn restyle(&mut self, theme: &ThemeState) {
        self.style = PowerMenuStyle::read(theme.store());
        self.window = self.style.window(self.screen);
        self.rebuild_buttons();
    }

    fn panel_geometry(&self) -> PanelGeometry {
        self.style.strip(self.screen)
    }

    fn host(&self) -> &WidgetHost {
        &self.host
    }

    fn host_mut(&mut self) -> &mut WidgetHost {
        &mut self.host
    }

    fn handle_event(&mut self, event: &ChangeEvent) {
        if event.source == ConfigSource::Preferences {
            tracing::info!("Power menu preferences reloaded");
            self.set_preferences(Arc::clone(&event.preferences));
            return;
        }

        if event.source == ConfigSource::Theme && event.sections.is_all() {
            self.preferences = Arc::clone(&event.preferences);
            self.apply(&event.theme);
        } else if event.affects_theme_section(SECTION) {
            self.restyle(&event.theme);
            self.host.reload_if_changed(&event.theme);
            let geometry = self.panel_geometry();
            self.host.manager_mut().notify_init(geometry);
        }
        self.host.manager_mut().notify_reload(event);
    }
}
