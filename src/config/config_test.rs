use std::fs;

use serial_test::serial;

use super::*;
use crate::Error;

#[test]
#[serial]
fn test_load_defaults_without_any_source() {
    temp_env::with_var_unset("CONFIG_PATH", || {
        let settings = Settings::load(None).expect("defaults should load");
        assert_eq!(settings.controller.reconcile_interval_ms, 5000);
        assert_eq!(settings.controller.resubscribe_delay_ms, 1000);
        assert_eq!(settings.store.watch_buffer_size, 64);
    });
}

#[test]
#[serial]
fn test_environment_overrides_defaults() {
    temp_env::with_vars(
        [
            ("OP_ENGINE_CONTROLLER__RECONCILE_INTERVAL_MS", Some("250")),
            ("OP_ENGINE_STORE__WATCH_BUFFER_SIZE", Some("8")),
        ],
        || {
            let settings = Settings::load(None).expect("env overrides should load");
            assert_eq!(settings.controller.reconcile_interval_ms, 250);
            assert_eq!(settings.controller.resubscribe_delay_ms, 1000);
            assert_eq!(settings.store.watch_buffer_size, 8);
        },
    );
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("op-engine.toml");
    fs::write(
        &path,
        "[controller]\nreconcile_interval_ms = 750\n\n[store]\nwatch_buffer_size = 16\n",
    )
    .expect("write config file");

    temp_env::with_var_unset("CONFIG_PATH", || {
        let settings =
            Settings::load(path.to_str()).expect("file should load");
        assert_eq!(settings.controller.reconcile_interval_ms, 750);
        assert_eq!(settings.store.watch_buffer_size, 16);
    });
}

#[test]
#[serial]
fn test_env_wins_over_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("op-engine.toml");
    fs::write(&path, "[controller]\nreconcile_interval_ms = 750\n").expect("write config file");

    temp_env::with_var("OP_ENGINE_CONTROLLER__RECONCILE_INTERVAL_MS", Some("99"), || {
        let settings =
            Settings::load(path.to_str()).expect("merged settings should load");
        assert_eq!(settings.controller.reconcile_interval_ms, 99);
    });
}

#[test]
#[serial]
fn test_missing_file_is_an_error() {
    let result = Settings::load(Some("/nonexistent/op-engine.toml"));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_zero_reconcile_interval_rejected() {
    let config = ControllerConfig {
        reconcile_interval_ms: 0,
        ..ControllerConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_zero_resubscribe_delay_rejected() {
    let config = ControllerConfig {
        resubscribe_delay_ms: 0,
        ..ControllerConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_zero_watch_buffer_rejected() {
    let config = StoreConfig {
        watch_buffer_size: 0,
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}
