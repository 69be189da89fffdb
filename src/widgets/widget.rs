//! Widget trait and the optional lifecycle capabilities
//!
//! Every widget implements [`Widget`]. Lifecycle hooks are opt-in: a widget
//! that needs geometry implements [`WidgetInit`] and returns itself from
//! [`Widget::as_init`]; one that refreshes on config changes implements
//! [`WidgetReload`] and returns itself from [`Widget::as_reload`]. The
//! manager only calls the hooks a widget declares.

use crate::config::{ChangeEvent, ThemeState};
use std::fmt;
use std::path::PathBuf;

/// Top-level UI surface hosting widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerRole {
    Taskbar,
    Desktop,
    PowerMenu,
}

impl ContainerRole {
    pub const ALL: [ContainerRole; 3] = [
        ContainerRole::Taskbar,
        ContainerRole::Desktop,
        ContainerRole::PowerMenu,
    ];

    /// Theme section holding this container's settings
    pub fn section(&self) -> &'static str {
        match self {
            ContainerRole::Taskbar => "Taskbar",
            ContainerRole::Desktop => "Desktop",
            ContainerRole::PowerMenu => "PowerMenu",
        }
    }

    /// Directory name under the widgets root
    pub fn dir_name(&self) -> &'static str {
        match self {
            ContainerRole::Taskbar => "taskbar",
            ContainerRole::Desktop => "desktop",
            ContainerRole::PowerMenu => "powermenu",
        }
    }

    /// Parse a directory or CLI name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.dir_name().eq_ignore_ascii_case(name) || role.section() == name)
    }
}

impl fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Size of the hosting panel, known only once the container has laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelGeometry {
    pub width: i64,
    pub height: i64,
}

/// Rectangle in panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Parent handle widgets attach to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    role: ContainerRole,
    widgets_root: PathBuf,
}

impl ContainerHandle {
    pub fn new(role: ContainerRole, widgets_root: impl Into<PathBuf>) -> Self {
        Self {
            role,
            widgets_root: widgets_root.into(),
        }
    }

    pub fn role(&self) -> ContainerRole {
        self.role
    }

    /// Resource directory of a widget hosted by this container
    pub fn widget_dir(&self, id: &str) -> PathBuf {
        self.widgets_root.join(self.role.dir_name()).join(id)
    }
}

/// Everything a widget factory receives
pub struct WidgetContext<'a> {
    pub id: &'a str,
    pub parent: &'a ContainerHandle,
    pub theme: &'a ThemeState,
}

impl WidgetContext<'_> {
    /// Directory holding the widget's own resources and local config
    pub fn resource_dir(&self) -> PathBuf {
        self.parent.widget_dir(self.id)
    }

    /// Dotted theme section of this widget, e.g. `Taskbar.Clock`
    pub fn section(&self) -> String {
        widget_section(self.parent.role(), self.id)
    }
}

/// Dotted section name for a widget id: `Taskbar` + `clock` = `Taskbar.Clock`
pub fn widget_section(role: ContainerRole, id: &str) -> String {
    let mut chars = id.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{}.{}", role.section(), capitalized)
}

/// An instantiated widget
pub trait Widget {
    /// Identifier the widget was loaded under
    fn id(&self) -> &str;

    /// Geometry hook, if the widget has one
    fn as_init(&mut self) -> Option<&mut dyn WidgetInit> {
        None
    }

    /// Reload hook, if the widget has one
    fn as_reload(&mut self) -> Option<&mut dyn WidgetReload> {
        None
    }

    /// Detach from the parent and release resources
    fn detach(&mut self) {}
}

/// Apply the container geometry
pub trait WidgetInit {
    fn init(&mut self, geometry: PanelGeometry);
}

/// Re-read configuration after a change
pub trait WidgetReload {
    fn reload(&mut self, event: &ChangeEvent);
}
