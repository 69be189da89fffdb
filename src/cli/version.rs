//! Version command handler

use crate::widgets::{ContainerRole, WidgetRegistry};

/// Display version information and the compiled-in widgets
pub fn display_version() {
    println!("deskshell {} ({})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_LICENSE"));
    println!("  {}", env!("CARGO_PKG_DESCRIPTION"));

    let registry = WidgetRegistry::builtin();
    for role in ContainerRole::ALL {
        let ids = registry.ids(role);
        if !ids.is_empty() {
            println!("  {} widgets: {}", role, ids.join(", "));
        }
    }
}
