//! Tests for section-level change detection and the reload pipeline

use deskshell::config::paths::THEME_DESCRIPTOR;
use deskshell::config::{
    ConfigDocument, NullWatcher, SectionChangeDetector, SectionFingerprints,
};
use deskshell::{ChangeEvent, ChangedSections, ConfigManager, ConfigSource, ShellPaths, ThemeLayout};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

const THEME: &str = "[Global]\nfont_size = 12\n\n[Taskbar]\nheight = 30px\nargb_color = #222222\n\n[Desktop]\nwallpaper_mode = cover\n";

struct Fixture {
    _tmp: TempDir,
    paths: ShellPaths,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let paths = ShellPaths::new(tmp.path(), ThemeLayout::Standard);
        let fixture = Self { _tmp: tmp, paths };
        fixture.write(&fixture.paths.app_config(), "[Theme]\ncurrent_theme = default\n\n[Shell]\nshow_desktop = yes\n");
        fixture.write(&fixture.builtin("default"), THEME);
        fixture.write(&fixture.builtin("dark"), THEME);
        fixture
    }

    fn builtin(&self, name: &str) -> PathBuf {
        self.paths.builtin_themes_dir().join(name).join(THEME_DESCRIPTOR)
    }

    fn write(&self, path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn manager(&self) -> ConfigManager {
        let mut manager = ConfigManager::new(self.paths.clone(), Box::new(NullWatcher::default()));
        manager.initialize();
        manager
    }
}

fn record(manager: &mut ConfigManager) -> Rc<RefCell<Vec<ChangeEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    manager.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn sections(names: &[&str]) -> ChangedSections {
    ChangedSections::Sections(names.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_identical_reload_reports_nothing() {
    let doc = ConfigDocument::parse(THEME).unwrap();
    let mut fingerprints = SectionFingerprints::of(&doc);

    let again = ConfigDocument::parse(THEME).unwrap();
    assert!(SectionChangeDetector::diff(&mut fingerprints, &again).is_empty());
}

#[test]
fn test_key_reordering_reports_nothing() {
    let mut fingerprints =
        SectionFingerprints::of(&ConfigDocument::parse("[Taskbar]\na = 1\nb = 2\n").unwrap());
    let reordered = ConfigDocument::parse("[Taskbar]\nb = 2\na = 1\n").unwrap();
    assert!(SectionChangeDetector::diff(&mut fingerprints, &reordered).is_empty());
}

#[test]
fn test_single_value_change_reports_its_section() {
    let mut fingerprints = SectionFingerprints::of(&ConfigDocument::parse(THEME).unwrap());
    let edited = ConfigDocument::parse(&THEME.replace("#222222", "#333333")).unwrap();
    assert_eq!(
        SectionChangeDetector::diff(&mut fingerprints, &edited),
        vec!["Taskbar"]
    );
    // Relative to the last load, not the baseline
    assert!(SectionChangeDetector::diff(&mut fingerprints, &edited).is_empty());
}

#[test]
fn test_key_addition_and_removal_are_changes() {
    let mut fingerprints =
        SectionFingerprints::of(&ConfigDocument::parse("[A]\nx = 1\n[B]\ny = 2\n").unwrap());

    let edited = ConfigDocument::parse("[A]\nx = 1\nz = 3\n[B]\n[C]\n").unwrap();
    assert_eq!(
        SectionChangeDetector::diff(&mut fingerprints, &edited),
        vec!["A", "B", "C"]
    );

    let removed = ConfigDocument::parse("[A]\nx = 1\nz = 3\n").unwrap();
    assert!(SectionChangeDetector::diff(&mut fingerprints, &removed).is_empty());
}

#[test]
fn test_theme_edit_publishes_changed_sections() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    let events = record(&mut manager);
    let theme_file = manager.theme().config_file().to_path_buf();

    fixture.write(&theme_file, &THEME.replace("30px", "40px"));
    let event = manager.on_file_changed(&theme_file).unwrap();

    assert_eq!(event.source, ConfigSource::Theme);
    assert_eq!(event.sections, sections(&["Taskbar"]));
    assert_eq!(event.theme.store().get_int("Taskbar", "height", 0), 40);
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn test_touching_without_change_publishes_nothing() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    let events = record(&mut manager);
    let theme_file = manager.theme().config_file().to_path_buf();

    fixture.write(&theme_file, THEME);
    assert!(manager.on_file_changed(&theme_file).is_none());
    assert!(events.borrow().is_empty());
}

#[test]
fn test_app_edit_is_section_scoped() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();

    fixture.write(
        &fixture.paths.app_config(),
        "[Theme]\ncurrent_theme = default\n\n[Shell]\nshow_desktop = no\n",
    );
    let event = manager.on_file_changed(&fixture.paths.app_config()).unwrap();

    assert_eq!(event.source, ConfigSource::App);
    assert_eq!(event.sections, sections(&["Shell"]));
    assert!(!event.app.get_bool("Shell", "show_desktop", true));
}

#[test]
fn test_theme_switch_through_app_config_is_all() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    let events = record(&mut manager);

    // dark has exactly the same values as default
    fixture.write(&fixture.paths.app_config(), "[Theme]\ncurrent_theme = dark\n\n[Shell]\nshow_desktop = yes\n");
    let event = manager.on_file_changed(&fixture.paths.app_config()).unwrap();

    assert_eq!(event.source, ConfigSource::Theme);
    assert_eq!(event.sections, ChangedSections::All);
    assert_eq!(manager.current_theme(), "dark");
    assert_eq!(manager.theme().config_file(), fixture.builtin("dark"));
    assert_eq!(events.borrow().len(), 1);

    let watched = manager.watched_files();
    assert!(watched.contains(&fixture.builtin("dark")));
    assert!(!watched.contains(&fixture.builtin("default")));
}

#[test]
fn test_explicit_switch_is_always_all() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();

    let event = manager.switch_theme("default");
    assert_eq!(event.sections, ChangedSections::All);

    let event = manager.switch_theme("dark");
    assert_eq!(event.sections, ChangedSections::All);
    assert_eq!(event.theme.name(), "dark");
}

#[test]
fn test_edits_after_switch_diff_against_new_theme() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.switch_theme("dark");

    fixture.write(&fixture.builtin("dark"), &THEME.replace("cover", "contain"));
    let event = manager.on_file_changed(&fixture.builtin("dark")).unwrap();
    assert_eq!(event.sections, sections(&["Desktop"]));

    // The old theme file is no longer owned
    fixture.write(&fixture.builtin("default"), "[Taskbar]\nheight = 99\n");
    assert!(manager.on_file_changed(&fixture.builtin("default")).is_none());
}

#[test]
fn test_deleted_theme_file_falls_back_to_defaults() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    let theme_file = manager.theme().config_file().to_path_buf();
    assert_eq!(
        manager.theme().store().get_string("Taskbar", "argb_color", "#000000"),
        "#222222"
    );

    std::fs::remove_file(&theme_file).unwrap();
    manager.on_file_changed(&theme_file);

    assert!(manager.theme().store().document().is_empty());
    assert_eq!(
        manager.theme().store().get_string("Taskbar", "argb_color", "#000000"),
        "#000000"
    );
    // Still watched, so recreating the file is picked up
    assert!(manager.watched_files().contains(&theme_file));

    fixture.write(&theme_file, THEME);
    let event = manager.on_file_changed(&theme_file).unwrap();
    assert_eq!(event.sections, sections(&["Global", "Taskbar", "Desktop"]));
}

#[test]
fn test_malformed_theme_discards_previous_values() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    let theme_file = manager.theme().config_file().to_path_buf();

    fixture.write(&theme_file, "argb_color = #111111\n");
    manager.on_file_changed(&theme_file);
    assert_eq!(manager.theme().store().get_int("Taskbar", "height", 0), 0);
}

#[test]
fn test_preferences_change_is_published() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    let prefs = fixture.paths.power_menu_preferences();

    fixture.write(
        &prefs,
        r#"{"buttons": [{"id": "shutdown", "type": "console", "action": "poweroff"}]}"#,
    );
    let event = manager.on_file_changed(&prefs).unwrap();
    assert_eq!(event.source, ConfigSource::Preferences);
    assert_eq!(event.sections, ChangedSections::All);
    assert_eq!(event.preferences.buttons.len(), 1);

    // Same content again
    assert!(manager.on_file_changed(&prefs).is_none());
}
