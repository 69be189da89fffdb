//! Shell composition root
//!
//! Builds the configuration manager and the three containers, wires the
//! containers to configuration changes, and owns the explicit
//! [`Shell::initialize`] / [`Shell::shutdown`] lifecycle.

pub mod container;
pub mod panel;
pub mod power_menu;
pub mod style;

pub use container::{Container, WidgetHost};
pub use panel::{Background, Desktop, Taskbar, TaskbarStyle, WallpaperMode};
pub use power_menu::{MenuButton, PowerMenu, PowerMenuStyle};
pub use style::{Color, parse_color};

use crate::config::{ChangeEvent, ConfigManager, FileWatcher, ShellPaths, SubscriptionId};
use crate::widgets::{WidgetLoader, WidgetRegistry};
use anyhow::Context;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

/// Size of the screen the shell lays out on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i64,
    pub height: i64,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl FromStr for ScreenSize {
    type Err = anyhow::Error;

    /// Parse `WIDTHxHEIGHT`, e.g. `1920x1080`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .with_context(|| format!("Expected WIDTHxHEIGHT, got '{}'", s))?;
        let width: i64 = w.trim().parse().with_context(|| format!("Invalid width: '{}'", w))?;
        let height: i64 = h.trim().parse().with_context(|| format!("Invalid height: '{}'", h))?;
        if width <= 0 || height <= 0 {
            anyhow::bail!("Screen size must be positive: {}", s);
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The running shell
pub struct Shell {
    config: ConfigManager,
    loader: WidgetLoader,
    registry: Rc<WidgetRegistry>,
    taskbar: Rc<RefCell<Taskbar>>,
    desktop: Rc<RefCell<Desktop>>,
    power_menu: Rc<RefCell<PowerMenu>>,
    subscriptions: Vec<SubscriptionId>,
}

impl Shell {
    /// Construct every component; nothing is loaded until `initialize`
    pub fn new(
        paths: ShellPaths,
        registry: WidgetRegistry,
        screen: ScreenSize,
        watcher: Box<dyn FileWatcher>,
    ) -> Self {
        let registry = Rc::new(registry);
        let widgets_root = paths.widgets_dir();

        Self {
            loader: WidgetLoader::with_dir(widgets_root.clone()),
            taskbar: Rc::new(RefCell::new(Taskbar::new(
                screen,
                &widgets_root,
                Rc::clone(&registry),
            ))),
            desktop: Rc::new(RefCell::new(Desktop::new(
                screen,
                &widgets_root,
                Rc::clone(&registry),
            ))),
            power_menu: Rc::new(RefCell::new(PowerMenu::new(
                screen,
                &widgets_root,
                Rc::clone(&registry),
            ))),
            registry,
            config: ConfigManager::new(paths, watcher),
            subscriptions: Vec::new(),
        }
    }

    /// Load configuration, build every container and subscribe them
    ///
    /// The configuration baseline is complete before any widget is built.
    pub fn initialize(&mut self) {
        self.config.initialize();
        self.loader.check_registry(&self.registry);

        let theme = self.config.theme();
        self.power_menu
            .borrow_mut()
            .set_preferences(self.config.preferences());

        self.taskbar.borrow_mut().apply(&theme);
        self.desktop.borrow_mut().apply(&theme);
        self.power_menu.borrow_mut().apply(&theme);

        self.subscriptions = vec![
            subscribe(&mut self.config, &self.taskbar),
            subscribe(&mut self.config, &self.desktop),
            subscribe(&mut self.config, &self.power_menu),
        ];

        tracing::info!(
            theme = %theme.name(),
            taskbar = ?self.taskbar.borrow().widget_ids(),
            desktop = ?self.desktop.borrow().widget_ids(),
            "Shell initialized"
        );
    }

    /// Forward a file notification from the owner loop
    pub fn on_file_changed(&mut self, path: &Path) -> Option<ChangeEvent> {
        self.config.on_file_changed(path)
    }

    /// Switch the active theme
    pub fn switch_theme(&mut self, name: &str) -> ChangeEvent {
        self.config.switch_theme(name)
    }

    /// Unsubscribe containers, stop watching and release every widget
    pub fn shutdown(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.config.unsubscribe(id);
        }
        self.config.shutdown();

        self.taskbar.borrow_mut().host_mut().manager_mut().unload_all();
        self.desktop.borrow_mut().host_mut().manager_mut().unload_all();
        self.power_menu.borrow_mut().host_mut().manager_mut().unload_all();
        tracing::info!("Shell shut down");
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn loader(&self) -> &WidgetLoader {
        &self.loader
    }

    pub fn taskbar(&self) -> Ref<'_, Taskbar> {
        self.taskbar.borrow()
    }

    pub fn desktop(&self) -> Ref<'_, Desktop> {
        self.desktop.borrow()
    }

    pub fn power_menu(&self) -> Ref<'_, PowerMenu> {
        self.power_menu.borrow()
    }
}

fn subscribe<C>(config: &mut ConfigManager, container: &Rc<RefCell<C>>) -> SubscriptionId
where
    C: Container + 'static,
{
    let container = Rc::clone(container);
    config.subscribe(move |event| match container.try_borrow_mut() {
        Ok(mut container) => container.handle_event(event),
        Err(_) => tracing::warn!(sections = %event.sections, "Container busy, change dropped"),
    })
}
