// Widget plugin system for deskshell
//
// Widgets are small UI components hosted by a container (taskbar, desktop,
// power menu). Which widgets a container hosts is decided by the active
// theme's `active_widgets` list; each identifier is resolved through a
// registry of factories populated at startup.

pub mod clock;
pub mod loader;
pub mod manager;
pub mod registry;
pub mod widget;

pub use clock::{Clock, ClockSettings};
pub use loader::{WidgetDirectory, WidgetLoader};
pub use manager::{ACTIVE_WIDGETS_KEY, LoadReport, WidgetPluginManager};
pub use registry::{WidgetFactory, WidgetRegistry};
pub use widget::{
    ContainerHandle, ContainerRole, PanelGeometry, Rect, Widget, WidgetContext, WidgetInit,
    WidgetReload, widget_section,
};

/// Widget errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("No widget '{id}' registered for {role}")]
    NotFound { role: ContainerRole, id: String },

    #[error("Widget '{id}' failed to construct: {reason}")]
    Construction { id: String, reason: String },
}

/// Result type for widget operations
pub type WidgetResult<T> = Result<T, WidgetError>;
