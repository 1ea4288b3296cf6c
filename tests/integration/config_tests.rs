use figment::providers::Serialized;
use figment::Figment;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;
use thumbfit::config::{Config, ENV_PREFIX};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_defaults_extract() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_toml_file_overrides_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
target_width = 320
target_height = 180
cache_file = "/var/cache/thumbs.json"
threads = 3
resize_local_thumbnails = true
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!((config.target_width, config.target_height), (320, 180));
    assert_eq!(config.cache_file, PathBuf::from("/var/cache/thumbs.json"));
    assert_eq!(config.threads, Some(3));
    assert!(config.resize_local_thumbnails);
    // untouched keys keep defaults
    assert_eq!(config.thumbnail_name, "thumbnail.png");
    assert!(config.enabled);
}

/// Clear all THUMBFIT_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with(ENV_PREFIX) {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "target_width = 320\ntarget_height = 200\n").unwrap();

    std::env::set_var("THUMBFIT_TARGET_WIDTH", "128");
    std::env::set_var("THUMBFIT_ENABLED", "false");

    let loaded = Config::load(Some(&path));
    let provided = Config::figment(Some(&path)).extract::<Config>();
    clear_env();

    let config = loaded.unwrap();
    assert_eq!(config.target_width, 128);
    assert_eq!(config.target_height, 200);
    assert!(!config.enabled);
    assert_eq!(provided.unwrap(), config);
}

#[test]
fn test_load_explicit_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("thumbfit.toml");
    std::fs::write(&path, "thumbnail_name = \"preview.png\"\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.thumbnail_name, "preview.png");
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = tempdir().unwrap();
    let result = Config::load(Some(&dir.path().join("nope.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_rejects_zero_width() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("thumbfit.toml");
    std::fs::write(&path, "target_width = 0\n").unwrap();

    assert!(Config::load(Some(&path)).is_err());
}

#[test]
fn test_invalid_type_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("thumbfit.toml");
    std::fs::write(&path, "target_width = \"wide\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load configuration"));
}
