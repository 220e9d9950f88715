use std::fs;

use portfolio_engine::{
    ensure_dir, AtomicFileWriter, MemoryPreferenceStore, PreferenceStore, RonPreferenceStore,
};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_content() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("site").join("index.html");
    let writer = AtomicFileWriter::new(&target);

    writer.write("hello").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");

    writer.write("world").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "world");
    assert_eq!(fs::read_dir(target.parent().unwrap()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.join("index.html"));
    assert!(writer.write("data").is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

#[test]
fn ron_preferences_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.ron");

    let mut store = RonPreferenceStore::open(&path);
    assert_eq!(store.get("theme"), None);
    store.set("theme", "dark").unwrap();

    let reopened = RonPreferenceStore::open(&path);
    assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
}

#[test]
fn corrupt_preferences_file_starts_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.ron");
    fs::write(&path, "{ this is not ron").unwrap();

    let mut store = RonPreferenceStore::open(&path);
    assert_eq!(store.get("theme"), None);
    store.set("theme", "light").unwrap();
    assert_eq!(RonPreferenceStore::open(&path).get("theme").as_deref(), Some("light"));
}

#[test]
fn memory_store_overwrites_values() {
    let mut store = MemoryPreferenceStore::new();
    store.set("theme", "dark").unwrap();
    store.set("theme", "light").unwrap();
    assert_eq!(store.get("theme").as_deref(), Some("light"));
}
