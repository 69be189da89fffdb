//! Taskbar and desktop containers

use super::ScreenSize;
use super::container::{Container, WidgetHost};
use super::style::{Color, color_or};
use crate::config::{Resource, ThemeState, TypedConfigStore};
use crate::widgets::{ContainerRole, PanelGeometry, Rect, WidgetRegistry};
use std::path::{Path, PathBuf};
use std::rc::Rc;

const TASKBAR: &str = "Taskbar";
const DESKTOP: &str = "Desktop";

/// Resolved taskbar appearance
#[derive(Debug, Clone, PartialEq)]
pub struct TaskbarStyle {
    /// Color painted by the shell itself
    pub background: Color,
    /// Tint handed to the compositor when blurring
    pub blur_tint: Color,
    pub blur_enabled: bool,
    pub blur_mode: i64,
    pub border_radius: i64,
    pub border_color: Color,
    pub border_width: i64,
}

impl TaskbarStyle {
    pub fn read(store: &TypedConfigStore) -> Self {
        let raw_background = store.get_string(TASKBAR, "argb_color", "#000000");
        let background = color_or(&raw_background, Color::rgb(0, 0, 0));
        let blur_enabled = store.get_bool(TASKBAR, "blur_enabled", false);
        let blur_mode = store.get_int(TASKBAR, "blur_mode", 4);

        // Acrylic blur takes the panel color as its tint
        let (background, blur_tint) = if blur_enabled && blur_mode == 1 {
            (Color::TRANSPARENT, background)
        } else {
            (background, Color::TRANSPARENT)
        };

        Self {
            background,
            blur_tint,
            blur_enabled,
            blur_mode,
            border_radius: if blur_enabled {
                0
            } else {
                store.get_int(TASKBAR, "border_radius_px", 10)
            },
            border_color: color_or(
                &store.get_string(TASKBAR, "argb_border_color", "#FFFFFF33"),
                Color::argb(0xFF, 0xFF, 0xFF, 0x33),
            ),
            border_width: store.get_int(TASKBAR, "border_width_px", 1),
        }
    }
}

/// Taskbar placement on screen
pub fn taskbar_geometry(store: &TypedConfigStore, screen: ScreenSize) -> Rect {
    let width = extent(
        &store.get_string(TASKBAR, "width", "90%"),
        screen.width,
        screen.width,
    );
    let height = extent(
        &store.get_string(TASKBAR, "height", "30px"),
        screen.height,
        percent(screen.height, 2).round() as i64,
    );

    let anchor_x = bounded_percent(store, "anchor_x", 50);
    let anchor_y = bounded_percent(store, "anchor_y", 100);
    let position_x = bounded_percent(store, "position_x", 98);
    let position_y = bounded_percent(store, "position_y", 2);

    Rect {
        x: percent(screen.width, position_x) as i64 - percent(width, anchor_x) as i64,
        y: percent(screen.height, position_y) as i64 - percent(height, anchor_y) as i64,
        width,
        height,
    }
}

/// Placement percentages beyond this magnitude are clamped
const PERCENT_LIMIT: i64 = 1000;

fn bounded_percent(store: &TypedConfigStore, key: &str, fallback: i64) -> i64 {
    store
        .get_int(TASKBAR, key, fallback)
        .clamp(-PERCENT_LIMIT, PERCENT_LIMIT)
}

/// `value` percent of `total`
fn percent(total: i64, value: i64) -> f64 {
    total as f64 * (value as f64 / 100.0)
}

/// Parse `N%` of the screen or `Npx`, or return `unparsable`
///
/// The result never leaves `0..=screen_extent`.
fn extent(raw: &str, screen_extent: i64, unparsable: i64) -> i64 {
    let parsed = if raw.contains('%') {
        raw.replace('%', "")
            .trim()
            .parse::<i64>()
            .map(|value| percent(screen_extent, value.clamp(0, 100)).round() as i64)
    } else {
        raw.replace("px", "").trim().parse::<i64>()
    };

    let value = parsed.unwrap_or_else(|_| {
        tracing::warn!(value = raw, "Unparsable panel size, using {}", unparsable);
        unparsable
    });
    if !(0..=screen_extent).contains(&value) {
        tracing::warn!(value = raw, "Panel size outside the screen, clamping");
    }
    value.clamp(0, screen_extent)
}

/// Taskbar container
pub struct Taskbar {
    screen: ScreenSize,
    style: TaskbarStyle,
    geometry: Rect,
    host: WidgetHost,
}

impl Taskbar {
    pub fn new(screen: ScreenSize, widgets_root: &Path, registry: Rc<WidgetRegistry>) -> Self {
        let empty = TypedConfigStore::new();
        Self {
            screen,
            style: TaskbarStyle::read(&empty),
            geometry: taskbar_geometry(&empty, screen),
            host: WidgetHost::new(ContainerRole::Taskbar, widgets_root, registry),
        }
    }

    pub fn style(&self) -> &TaskbarStyle {
        &self.style
    }

    /// Placement on screen
    pub fn geometry(&self) -> Rect {
        self.geometry
    }
}

impl Container for Taskbar {
    fn role(&self) -> ContainerRole {
        ContainerRole::Taskbar
    }

    fn restyle(&mut self, theme: &ThemeState) {
        self.style = TaskbarStyle::read(theme.store());
        self.geometry = taskbar_geometry(theme.store(), self.screen);
        tracing::debug!(geometry = ?self.geometry, "Taskbar restyled");
    }

    fn panel_geometry(&self) -> PanelGeometry {
        PanelGeometry {
            width: self.geometry.width,
            height: self.geometry.height,
        }
    }

    fn host(&self) -> &WidgetHost {
        &self.host
    }

    fn host_mut(&mut self) -> &mut WidgetHost {
        &mut self.host
    }
}

/// How the wallpaper is fitted to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallpaperMode {
    /// Fill the screen, cropping
    #[default]
    Cover,
    /// Fit inside the screen, letterboxed on black
    Contain,
    /// Scale to the screen ignoring aspect ratio
    Stretch,
}

impl WallpaperMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cover" => WallpaperMode::Cover,
            "contain" => WallpaperMode::Contain,
            "stretch" => WallpaperMode::Stretch,
            other => {
                tracing::warn!(mode = other, "Unknown wallpaper mode, using cover");
                WallpaperMode::Cover
            }
        }
    }
}

/// What the desktop paints
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Image { path: PathBuf, mode: WallpaperMode },
    /// Used when no wallpaper is configured or the file is missing
    Fill(Color),
}

const MISSING_WALLPAPER_FILL: Color = Color::rgb(0x2E, 0x2E, 0x2E);

impl Background {
    pub fn read(theme: &ThemeState) -> Self {
        let store = theme.store();
        let mode = WallpaperMode::parse(&store.get_string(DESKTOP, "wallpaper_mode", "cover"));
        let raw = store.get_string(DESKTOP, "wallpaper_path", "");
        if raw.trim().is_empty() {
            return Background::Fill(Color::rgb(0, 0, 0));
        }

        match theme.resolve_resource(&raw) {
            Resource::File(path) if path.is_file() => {
                tracing::info!(path = %path.display(), ?mode, "Loading wallpaper");
                Background::Image { path, mode }
            }
            other => {
                tracing::error!(value = %other.as_string(), "Could not load wallpaper");
                Background::Fill(MISSING_WALLPAPER_FILL)
            }
        }
    }
}

/// Desktop container, covering the whole screen
pub struct Desktop {
    screen: ScreenSize,
    background: Background,
    host: WidgetHost,
}

impl Desktop {
    pub fn new(screen: ScreenSize, widgets_root: &Path, registry: Rc<WidgetRegistry>) -> Self {
        Self {
            screen,
            background: Background::Fill(Color::rgb(0, 0, 0)),
            host: WidgetHost::new(ContainerRole::Desktop, widgets_root, registry),
        }
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn geometry(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.screen.width,
            height: self.screen.height,
        }
    }
}

impl Container for Desktop {
    fn role(&self) -> ContainerRole {
        ContainerRole::Desktop
    }

    fn restyle(&mut self, theme: &ThemeState) {
        self.background = Background::read(theme);
    }

    fn panel_geometry(&self) -> PanelGeometry {
        PanelGeometry {
            width: self.screen.width,
            height: self.screen.height,
        }
    }

    fn host(&self) -> &WidgetHost {
        &self.host
    }

    fn host_mut(&mut self) -> &mut WidgetHost {
        &mut self.host
    }
}
