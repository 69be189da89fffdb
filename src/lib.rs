//! deskshell library
//!
//! Live configuration, theme resolution and widget plugin core of the
//! deskshell desktop shell. The binary is a thin layer over this crate.

pub mod cli;
pub mod config;
pub mod shell;
pub mod widgets;

// Re-export commonly used types for convenience
pub use config::{
    ChangeEvent, ChangedSections, ConfigManager, ConfigSource, ShellPaths, ThemeLayout,
    ThemeResolver, ThemeState, TypedConfigStore,
};
pub use shell::{ScreenSize, Shell};
pub use widgets::{WidgetPluginManager, WidgetRegistry};
