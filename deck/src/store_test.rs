use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    text: String,
    lines: u32,
}

fn store_over(backend: Rc<MemoryBackend>) -> KeyValueStore {
    KeyValueStore::new(backend, "test")
}

// =============================================================
// get / set
// =============================================================

#[test]
fn get_absent_key_returns_default() {
    let store = KeyValueStore::in_memory("test");
    assert_eq!(store.get("missing", 42_u32), 42);
}

#[test]
fn set_then_get_returns_value() {
    let store = KeyValueStore::in_memory("test");
    let note = Note { text: "buy xanax".into(), lines: 1 };
    assert!(store.set("note", &note));
    assert_eq!(store.get("note", Note { text: String::new(), lines: 0 }), note);
}

#[test]
fn set_overwrites_previous_value() {
    let store = KeyValueStore::in_memory("test");
    store.set("flag", &true);
    store.set("flag", &false);
    assert!(!store.get("flag", true));
}

#[test]
fn corrupted_value_falls_back_to_default() {
    let backend = Rc::new(MemoryBackend::new());
    backend.write("test:note", "{not json").unwrap();
    let store = store_over(backend);
    assert_eq!(store.get("note", 7_u32), 7);
    assert!(store.get_opt::<Note>("note").is_none());
}

#[test]
fn incompatible_shape_falls_back_to_default() {
    let backend = Rc::new(MemoryBackend::new());
    backend.write("test:note", r#"{"text": 5}"#).unwrap();
    let store = store_over(backend);
    let fallback = Note { text: "fallback".into(), lines: 0 };
    assert_eq!(store.get("note", fallback.clone()), fallback);
}

#[test]
fn keys_are_namespaced_in_backend() {
    let backend = Rc::new(MemoryBackend::new());
    let store = store_over(backend.clone());
    store.set("panel:a:open", &true);
    assert_eq!(backend.read("test:panel:a:open").unwrap().as_deref(), Some("true"));
    assert!(backend.read("panel:a:open").unwrap().is_none());
}

#[test]
fn empty_namespace_uses_raw_keys() {
    let backend = Rc::new(MemoryBackend::new());
    let store = KeyValueStore::new(backend.clone(), "");
    store.set("k", &1_u8);
    assert_eq!(backend.read("k").unwrap().as_deref(), Some("1"));
}

// =============================================================
// Quota
// =============================================================

#[test]
fn quota_exceeded_write_reports_false_without_panicking() {
    let backend = Rc::new(MemoryBackend::with_quota(32));
    let store = store_over(backend);
    assert!(store.set("a", &"short"));
    assert!(!store.set("b", &"x".repeat(64)));
    assert_eq!(store.get("b", String::from("default")), "default");
    assert_eq!(store.get("a", String::new()), "short");
}

#[test]
fn quota_counts_replacement_not_sum_of_versions() {
    let backend = Rc::new(MemoryBackend::with_quota(24));
    let store = store_over(backend);
    assert!(store.set("a", &"0123456789"));
    assert!(store.set("a", &"9876543210"));
}

#[test]
fn memory_backend_quota_error_variant() {
    let backend = MemoryBackend::with_quota(4);
    assert_eq!(backend.write("key", "value"), Err(StoreError::Quota));
}

// =============================================================
// remove / contains / keys
// =============================================================

#[test]
fn remove_deletes_key() {
    let store = KeyValueStore::in_memory("test");
    store.set("x", &1_u8);
    assert!(store.contains("x"));
    assert!(store.remove("x"));
    assert!(!store.contains("x"));
}

#[test]
fn remove_absent_key_is_ok() {
    let store = KeyValueStore::in_memory("test");
    assert!(store.remove("never-set"));
}

#[test]
fn keys_with_prefix_strips_namespace_and_filters() {
    let backend = Rc::new(MemoryBackend::new());
    backend.write("other:panel:z:open", "true").unwrap();
    let store = store_over(backend);
    store.set("panel:b:open", &true);
    store.set("panel:a:open", &false);
    store.set("owner:travel", &"x");
    assert_eq!(store.keys_with_prefix("panel:"), vec!["panel:a:open".to_owned(), "panel:b:open".to_owned()]);
}

#[test]
fn clones_share_backend() {
    let store = KeyValueStore::in_memory("test");
    let other = store.clone();
    store.set("shared", &3_u8);
    assert_eq!(other.get("shared", 0_u8), 3);
    assert_eq!(other.namespace(), "test");
}
