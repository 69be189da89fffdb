//! Built-in clock widget
//!
//! Reads `[<Container>.Clock]` from the active theme, or from the widget's
//! local `config.ini` when the theme has no such section.

use super::widget::{PanelGeometry, Rect, Widget, WidgetContext, WidgetInit, WidgetReload};
use crate::config::paths::WIDGET_LOCAL_CONFIG;
use crate::config::{ChangeEvent, ThemeState, TypedConfigStore};
use chrono::{Local, NaiveTime};
use std::fmt::Write as _;
use std::path::PathBuf;

const GLOBAL_SECTION: &str = "Global";

/// Vertical padding reserved for the drop shadow
const SHADOW_PADDING: i64 = 4;

/// Resolved clock appearance and placement
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSettings {
    pub visible: bool,
    pub font_family: String,
    pub font_size: i64,
    pub font_color: String,
    pub font_shadow: bool,
    pub width: i64,
    /// Anchor along the panel, percent of panel width
    pub position: i64,
    pub margin_left: i64,
    pub margin_right: i64,
    /// Which point of the clock sits on the anchor, percent of clock width
    pub align: i64,
    /// Format as written in the config (`HH:mm`)
    pub time_format: String,
}

impl ClockSettings {
    fn read(theme: &ThemeState, section: &str, local: &TypedConfigStore) -> Self {
        let source = if theme.store().has_section(section) {
            theme.store()
        } else {
            local
        };
        let globals = theme.globals();

        Self {
            visible: source.get_bool(section, "visible", true),
            font_family: theme.resolve_font(&source.get_string(
                section,
                "font_family",
                &globals.font_family,
            )),
            font_size: source.get_int(section, "font_size", globals.font_size),
            font_color: source.get_string(section, "font_color", &globals.font_color),
            font_shadow: source.get_bool(section, "font_shadow", globals.font_shadow),
            width: source.get_int(section, "width", 50),
            position: source.get_int(section, "position", 50),
            margin_left: source.get_int(section, "margin_left", 10),
            margin_right: source.get_int(section, "margin_right", 10),
            align: source.get_int(section, "align", 50),
            time_format: source.get_string(section, "time_format", "HH:mm"),
        }
    }

    /// Placement inside a panel of the given size
    pub fn layout(&self, panel: PanelGeometry) -> Rect {
        let padding = if self.font_shadow { SHADOW_PADDING } else { 0 };
        let x = panel.width as f64 * (self.position as f64 / 100.0)
            - self.width as f64 * (self.align as f64 / 100.0)
            + self.margin_left as f64
            - self.margin_right as f64;

        // Float to int casts saturate
        Rect {
            x: x.round() as i64,
            y: padding,
            width: self.width.max(0),
            height: panel.height.saturating_sub(padding * 2).max(0),
        }
    }
}

/// Clock widget
#[derive(Debug)]
pub struct Clock {
    id: String,
    section: String,
    local_config: PathBuf,
    settings: ClockSettings,
    chrono_format: String,
    panel: Option<PanelGeometry>,
    geometry: Option<Rect>,
}

impl Clock {
    pub fn from_context(ctx: &WidgetContext<'_>) -> anyhow::Result<Self> {
        let section = ctx.section();
        let local_config = ctx.resource_dir().join(WIDGET_LOCAL_CONFIG);
        let settings = ClockSettings::read(ctx.theme, &section, &load_local(&local_config));

        tracing::debug!(widget = ctx.id, %section, "Clock created");
        Ok(Self {
            id: ctx.id.to_string(),
            chrono_format: qt_to_chrono(&settings.time_format),
            section,
            local_config,
            settings,
            panel: None,
            geometry: None,
        })
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn settings(&self) -> &ClockSettings {
        &self.settings
    }

    /// Placement computed by the last `init`, `None` until the panel size is
    /// known or while hidden
    pub fn geometry(&self) -> Option<Rect> {
        self.geometry
    }

    /// Clock text for a given time
    pub fn text_at(&self, time: NaiveTime) -> String {
        let mut text = String::new();
        if write!(text, "{}", time.format(&self.chrono_format)).is_err() {
            tracing::warn!(format = %self.settings.time_format, "Unusable time format");
            text = time.format("%H:%M").to_string();
        }
        text
    }

    /// Clock text for now
    pub fn current_text(&self) -> String {
        self.text_at(Local::now().time())
    }

    fn relayout(&mut self) {
        self.geometry = match self.panel {
            Some(panel) if self.settings.visible => Some(self.settings.layout(panel)),
            _ => None,
        };
    }
}

impl Widget for Clock {
    fn id(&self) -> &str {
        &self.id
    }

    fn as_init(&mut self) -> Option<&mut dyn WidgetInit> {
        Some(self)
    }

    fn as_reload(&mut self) -> Option<&mut dyn WidgetReload> {
        Some(self)
    }

    fn detach(&mut self) {
        self.geometry = None;
        self.panel = None;
    }
}

impl WidgetInit for Clock {
    fn init(&mut self, geometry: PanelGeometry) {
        self.panel = Some(geometry);
        self.relayout();
    }
}

impl WidgetReload for Clock {
    fn reload(&mut self, event: &ChangeEvent) {
        if !event.affects_theme_section(&self.section) && !event.affects_theme_section(GLOBAL_SECTION) {
            return;
        }

        self.settings = ClockSettings::read(&event.theme, &self.section, &load_local(&self.local_config));
        self.chrono_format = qt_to_chrono(&self.settings.time_format);
        self.relayout();
        tracing::debug!(section = %self.section, visible = self.settings.visible, "Clock reloaded");
    }
}

fn load_local(path: &std::path::Path) -> TypedConfigStore {
    if path.is_file() {
        TypedConfigStore::load(path)
    } else {
        TypedConfigStore::new()
    }
}

/// Convert a Qt time format (`HH:mm:ss AP`) to a chrono format string
///
/// Text in single quotes is literal; `''` is a quote. Hours are 12-hour when
/// the format contains an AM/PM marker.
pub fn qt_to_chrono(format: &str) -> String {
    let twelve_hour = format.contains("AP") || format.contains("ap");
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();

        match c {
            '\'' => {
                if run >= 2 {
                    out.push('\'');
                    i += 2;
                    continue;
                }
                i += 1;
                while i < chars.len() && chars[i] != '\'' {
                    push_literal(&mut out, chars[i]);
                    i += 1;
                }
                i += 1;
                continue;
            }
            'H' | 'h' => {
                let width = run.min(2);
                out.push_str(match (twelve_hour, width) {
                    (true, 2) => "%I",
                    (true, _) => "%-I",
                    (false, 2) => "%H",
                    (false, _) => "%-H",
                });
                i += width;
                continue;
            }
            'm' | 's' => {
                let width = run.min(2);
                let spec = if c == 'm' { 'M' } else { 'S' };
                if width == 2 {
                    out.push('%');
                } else {
                    out.push_str("%-");
                }
                out.push(spec);
                i += width;
                continue;
            }
            'z' => {
                out.push_str("%3f");
                i += run.min(3);
                continue;
            }
            'A' | 'a' if chars.get(i + 1).is_some_and(|n| n.eq_ignore_ascii_case(&'p')) => {
                out.push_str(if c == 'A' { "%p" } else { "%P" });
                i += 2;
                continue;
            }
            _ => push_literal(&mut out, c),
        }
        i += 1;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
