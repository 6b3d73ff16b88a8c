//! Tests for configuration loading and graceful degradation
//!
//! Covers:
//! - Missing config files fall back to defaults instead of failing
//! - `./parmsync.toml` is picked up when no path is given
//! - Parameter tables and ticker increments from `[[parameters]]`
//! - Validation of periods and parameter tables
//!
//! Tests that change the working directory are marked #[serial] since the
//! current directory is process-wide.

use parmsync_common::config::{
    resolve_config_path, ConfigSource, TomlConfig, DEFAULT_CONFIG_FILE,
};
use parmsync_common::{Error, ParamSpec};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Run `f` with the working directory set to `dir`, restoring it afterwards
fn with_cwd<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
    let original = env::current_dir().unwrap();
    env::set_current_dir(dir).unwrap();
    let result = f();
    env::set_current_dir(original).unwrap();
    result
}

#[test]
fn test_defaults() {
    let config = TomlConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.server.bind_addr, "127.0.0.1:9090");
    assert_eq!(config.server.tick_period(), Duration::from_secs(1));
    assert_eq!(config.client.server_url, "http://127.0.0.1:9090");
    assert_eq!(config.client.bind_addr, "127.0.0.1:9091");
    assert_eq!(config.client.sync_interval(), Duration::from_secs(1));
    assert_eq!(config.client.request_timeout(), Duration::from_millis(500));
    assert!(config.parameters.is_empty());
}

#[test]
fn test_default_schema_and_tick_rules() {
    let config = TomlConfig::default();

    let schema = config.schema().unwrap();
    assert_eq!(schema.len(), 5);

    assert_eq!(
        config.tick_rules(),
        vec![("Alpha".to_string(), 1.0), ("Beta".to_string(), 2.0)]
    );
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let config = TomlConfig::parse(
        r#"
        [client]
        request_timeout_ms = 250
        "#,
    )
    .unwrap();

    assert_eq!(config.client.request_timeout(), Duration::from_millis(250));
    assert_eq!(config.client.sync_interval_ms, 1000);
    assert_eq!(config.server.tick_period_ms, 1000);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_parameter_table_from_file() {
    let config = TomlConfig::parse(
        r#"
        [[parameters]]
        name = "Alpha"
        type = "float"
        tick_increment = 0.5

        [[parameters]]
        name = "Gamma"
        settable = true

        [[parameters]]
        name = "Delta"
        tick_increment = 0.0
        "#,
    )
    .unwrap();

    let schema = config.schema().unwrap();
    assert_eq!(
        schema.specs(),
        &[
            ParamSpec::read_only("Alpha"),
            ParamSpec::settable("Gamma"),
            ParamSpec::read_only("Delta"),
        ]
    );

    // Zero increments are dropped
    assert_eq!(config.tick_rules(), vec![("Alpha".to_string(), 0.5)]);
}

#[test]
fn test_duplicate_parameter_rejected() {
    let result = TomlConfig::parse(
        r#"
        [[parameters]]
        name = "Alpha"

        [[parameters]]
        name = "Alpha"
        settable = true
        "#,
    );

    assert!(matches!(result, Err(Error::Schema(_))));
}

#[test]
fn test_zero_periods_rejected() {
    for text in [
        "[server]\ntick_period_ms = 0",
        "[client]\nsync_interval_ms = 0",
        "[client]\nrequest_timeout_ms = 0",
    ] {
        let result = TomlConfig::parse(text);
        assert!(matches!(result, Err(Error::Config(_))), "accepted: {}", text);
    }
}

#[test]
fn test_non_finite_increment_rejected() {
    let result = TomlConfig::parse(
        r#"
        [[parameters]]
        name = "Alpha"
        tick_increment = inf
        "#,
    );

    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("Alpha")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_unparsable_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[server\nbind_addr = ").unwrap();

    let result = TomlConfig::load_or_default(Some(&path));
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("bad.toml")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_explicit_path_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[server]\nbind_addr = \"0.0.0.0:7000\"\n").unwrap();

    let (config, source) = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.server.bind_addr, "0.0.0.0:7000");
    assert_eq!(source, ConfigSource::File(path));
}

#[test]
fn test_missing_explicit_path_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let (config, source) = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.server.bind_addr, "127.0.0.1:9090");
    // Reported as missing, not as loaded
    assert!(source.is_missing());
    assert_eq!(source, ConfigSource::Missing(path));
}

#[test]
#[serial]
fn test_local_file_resolved_when_no_path_given() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(DEFAULT_CONFIG_FILE),
        "[client]\nsync_interval_ms = 200\n",
    )
    .unwrap();

    let (config, source) = with_cwd(dir.path(), || {
        assert_eq!(
            resolve_config_path(None),
            Some(Path::new(DEFAULT_CONFIG_FILE).to_path_buf())
        );
        TomlConfig::load_or_default(None).unwrap()
    });

    assert_eq!(config.client.sync_interval_ms, 200);
    assert_eq!(
        source,
        ConfigSource::File(Path::new(DEFAULT_CONFIG_FILE).to_path_buf())
    );
}

#[test]
#[serial]
fn test_no_local_file_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let (config, source) = with_cwd(dir.path(), || {
        assert_eq!(resolve_config_path(None), None);
        TomlConfig::load_or_default(None).unwrap()
    });

    assert_eq!(config.client.sync_interval_ms, 1000);
    assert_eq!(source, ConfigSource::Defaults);
}
