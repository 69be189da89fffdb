//! Tests for typed, fallback-defaulted config access

use deskshell::TypedConfigStore;
use deskshell::config::{ConfigDocument, ParseError};
use tempfile::TempDir;

fn store(body: &str) -> TypedConfigStore {
    TypedConfigStore::from_document(ConfigDocument::parse(body).unwrap(), None)
}

#[test]
fn test_get_int_tolerates_units() {
    let store = store("[Taskbar]\nheight = 42px\nwidth = 90%\nname = abc\nempty =\nspaced = 12 px\n");

    assert_eq!(store.get_int("Taskbar", "height", 7), 42);
    assert_eq!(store.get_int("Taskbar", "width", 7), 90);
    assert_eq!(store.get_int("Taskbar", "name", 7), 7);
    assert_eq!(store.get_int("Taskbar", "empty", 7), 7);
    assert_eq!(store.get_int("Taskbar", "spaced", 7), 12);
    assert_eq!(store.get_int("Taskbar", "missing", 7), 7);
    assert_eq!(store.get_int("Nowhere", "height", -1), -1);
}

#[test]
fn test_get_float_tolerates_units() {
    let store = store("[Desktop]\nopacity = 0.75\nscale = 1.5px\nbad = px\nhuge = inf\n");

    assert_eq!(store.get_float("Desktop", "opacity", 1.0), 0.75);
    assert_eq!(store.get_float("Desktop", "scale", 1.0), 1.5);
    assert_eq!(store.get_float("Desktop", "bad", 1.0), 1.0);
    assert_eq!(store.get_float("Desktop", "huge", 1.0), 1.0);
}

#[test]
fn test_get_bool_lexicon() {
    let store = store(
        "[Shell]\na = TRUE\nb = no\nc = 1\nd = Off\ne = yes\nf = maybe\n",
    );

    assert!(store.get_bool("Shell", "a", false));
    assert!(!store.get_bool("Shell", "b", true));
    assert!(store.get_bool("Shell", "c", false));
    assert!(!store.get_bool("Shell", "d", true));
    assert!(store.get_bool("Shell", "e", false));
    assert!(store.get_bool("Shell", "f", true));
    assert!(!store.get_bool("Shell", "f", false));
}

#[test]
fn test_names_are_case_sensitive() {
    let store = store("[Taskbar]\nHeight = 40\n");
    assert_eq!(store.get_int("Taskbar", "height", 30), 30);
    assert_eq!(store.get_int("taskbar", "Height", 30), 30);
    assert_eq!(store.get_int("Taskbar", "Height", 30), 40);
}

#[test]
fn test_color_values_are_not_comments() {
    let store = store("# comment\n[Taskbar]\n; another\nargb_color = #111111\n");
    assert_eq!(store.get_string("Taskbar", "argb_color", "#000000"), "#111111");
}

#[test]
fn test_load_missing_file_is_empty() {
    let tmp = TempDir::new().unwrap();
    let store = TypedConfigStore::load(&tmp.path().join("absent.ini"));

    assert!(store.document().is_empty());
    assert!(!store.has_section("Theme"));
    assert_eq!(store.get_string("Theme", "current_theme", "default"), "default");
}

#[test]
fn test_load_malformed_file_is_empty() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.ini");
    std::fs::write(&path, "[Theme]\ncurrent_theme = dark\n[Theme]\n").unwrap();

    let store = TypedConfigStore::load(&path);
    assert!(store.document().is_empty());
    assert_eq!(store.get_string("Theme", "current_theme", "default"), "default");
    assert!(matches!(
        TypedConfigStore::read_document(&path),
        Err(deskshell::config::ConfigError::Parse {
            source: ParseError::DuplicateSection { .. },
            ..
        })
    ));
}

#[test]
fn test_active_widgets_list() {
    let store = store("[Taskbar]\nactive_widgets = clock, , tray ,clock\n");
    assert_eq!(
        store.get_list("Taskbar", "active_widgets"),
        vec!["clock", "tray", "clock"]
    );
    assert!(store.get_list("Desktop", "active_widgets").is_empty());
}
