use std::path::{Path, PathBuf};
use tempfile::tempdir;
use thumbfit::cache::{CacheEntry, CacheStore};

#[test]
fn test_round_trip_empty_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("textureCache.json");

    let store = CacheStore::empty(&path);
    assert!(store.save());

    let loaded = CacheStore::load(&path);
    assert!(loaded.is_empty());
}

#[test]
fn test_round_trip_three_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("textureCache.json");

    let store = CacheStore::empty(&path);
    let entries = [
        ("/mods/a/thumbnail.png", CacheEntry::new(1, 2)),
        ("/mods/b/thumbnail.png", CacheEntry::new(u64::MAX, u64::MAX - 1)),
        ("/mods/c d/thumbnail.png", CacheEntry::new(0, 0)),
    ];
    for (key, entry) in entries {
        store.set(Path::new(key), entry);
    }
    assert!(store.save());

    let loaded = CacheStore::load(&path);
    assert_eq!(loaded.len(), 3);
    for (key, entry) in entries {
        assert_eq!(loaded.get(Path::new(key)), Some(entry));
    }
}

#[test]
fn test_save_to_other_location() {
    let dir = tempdir().unwrap();
    let store = CacheStore::empty(dir.path().join("a.json"));
    store.set(Path::new("/x.png"), CacheEntry::new(5, 6));

    let other = dir.path().join("b.json");
    assert!(store.save_to(&other));
    assert!(!store.path().exists());
    assert_eq!(
        CacheStore::load(&other).get(Path::new("/x.png")),
        Some(CacheEntry::new(5, 6))
    );
}

#[test]
fn test_saved_document_is_path_keyed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("textureCache.json");
    let store = CacheStore::empty(&path);
    store.set(Path::new("/mods/a/thumbnail.png"), CacheEntry::new(7, 8));
    assert!(store.save());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["/mods/a/thumbnail.png"]["meta_hash"], 7);
    assert_eq!(value["/mods/a/thumbnail.png"]["content_hash"], 8);
}

#[test]
fn test_save_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("textureCache.json");
    let store = CacheStore::empty(&path);
    for i in 0..10 {
        store.set(&PathBuf::from(format!("/m/{i}.png")), CacheEntry::new(i, i));
        assert!(store.save());
    }

    let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
}
