//! CLI command handling module
//!
//! Handles all CLI subcommands and logging setup.

mod commands;
mod logging;
mod version;

pub use commands::{
    ConfigSubcommand, ThemesSubcommand, WidgetsSubcommand, handle_config_command,
    handle_themes_command, handle_widgets_command,
};
pub use logging::init_logging;
pub use version::display_version;
