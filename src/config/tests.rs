use std::fs;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use super::settings::Settings;
use super::{load_config, load_config_from};
use crate::persistence::{DEFAULT_PATH, StoreOptions};

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.store.path, DEFAULT_PATH);
    assert_eq!(settings.store.lock_timeout_ms, 250);
    assert!(settings.store.flush_on_write);
    assert_eq!(settings.broker.inflight_ttl_secs, 86_400);
    assert_eq!(settings.broker.sweep_interval_secs, 60);
    assert_eq!(settings.log.level, "info");
}

#[test]
fn test_store_options_from_settings() {
    let mut settings = Settings::default();
    settings.store.path = String::new();
    settings.store.lock_timeout_ms = 1_000;
    settings.store.flush_on_write = false;

    let opts = StoreOptions::from(&settings.store);
    assert_eq!(opts.path.to_str(), Some(DEFAULT_PATH));
    assert_eq!(opts.lock_timeout, Duration::from_secs(1));
    assert!(!opts.flush_on_write);
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let name = tmp.path().join("absent");

    let cfg = load_config_from(name.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.store.path, DEFAULT_PATH);
    assert_eq!(cfg.broker.inflight_ttl_secs, 86_400);
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let file = tmp.path().join("popstore.toml");
    let toml = r#"
        [store]
        path = "/var/lib/popstore/state.db"
        lock_timeout_ms = 500

        [broker]
        inflight_ttl_secs = 120
    "#;
    fs::write(&file, toml).expect("write config file");

    let cfg = load_config_from(file.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.store.path, "/var/lib/popstore/state.db");
    assert_eq!(cfg.store.lock_timeout_ms, 500);
    assert!(cfg.store.flush_on_write);
    assert_eq!(cfg.broker.inflight_ttl_secs, 120);
    assert_eq!(cfg.broker.sweep_interval_secs, 60);
}

#[test]
#[serial]
fn test_env_overrides_defaults() {
    temp_env::with_vars(
        [
            ("POPSTORE__STORE__PATH", Some("env.db")),
            ("POPSTORE__STORE__FLUSH_ON_WRITE", Some("false")),
            ("POPSTORE__BROKER__INFLIGHT_TTL_SECS", Some("30")),
            ("POPSTORE__LOG__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.store.path, "env.db");
            assert!(!cfg.store.flush_on_write);
            assert_eq!(cfg.broker.inflight_ttl_secs, 30);
            assert_eq!(cfg.log.level, "debug");
        },
    );
}

#[test]
fn test_sweep_interval_falls_back_to_config() {
    let mut settings = Settings::default();
    settings.broker.sweep_interval_secs = 90;

    assert_eq!(settings.broker.sweep_interval(None), Duration::from_secs(90));
    assert_eq!(settings.broker.sweep_interval(Some(5)), Duration::from_secs(5));
    assert_eq!(settings.broker.sweep_interval(Some(0)), Duration::from_secs(1));

    settings.broker.sweep_interval_secs = 0;
    assert_eq!(settings.broker.sweep_interval(None), Duration::from_secs(1));
}
