use imagerank_config::{ConfigGuardRailError, ConfigLoadError, ConfigLoader, EnvConfig};
use imagerank_core::WriteMode;
use std::{fs, time::Duration};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("imagerank.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn file_values_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [redis]
        host = "redis.internal"
        port = 6380
        db = 4
        command_timeout = "250ms"

        [ranking]
        namespace = "photo"
        ranking_key = "photo_ranking"
        top_n = 25
        "#,
    );

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .expect("config loads");
    let config = load.config;

    assert_eq!(config.redis.connection_url(), "redis://redis.internal:6380/4");
    assert_eq!(config.redis.command_timeout, Duration::from_millis(250));
    assert_eq!(config.redis.connect_timeout, Duration::from_secs(2));
    assert_eq!(config.ranking.namespace, "photo");
    assert_eq!(config.ranking.ranking_key, "photo_ranking");
    assert_eq!(config.ranking.top_n.get(), 25);
    assert_eq!(config.ranking.write_mode, WriteMode::Sequential);
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));
    assert!(load.warnings.is_empty());
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [redis]
        port = 6380

        [ranking]
        write_mode = "sequential"
        "#,
    );

    let env = EnvConfig {
        redis_port: Some("6390".to_string()),
        write_mode: Some("atomic".to_string()),
        top_n: Some("3".to_string()),
        ..EnvConfig::default()
    };

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env)
        .unwrap();

    assert_eq!(load.config.redis.port, 6390);
    assert_eq!(load.config.ranking.write_mode, WriteMode::Atomic);
    assert_eq!(load.config.ranking.top_n.get(), 3);
    assert!(
        load.warnings.iter().any(|w| w.message.contains("atomic")),
        "atomic mode should be flagged"
    );

    let options = load.config.store_options();
    assert_eq!(options.write_mode, WriteMode::Atomic);
    assert_eq!(options.keys.ranking(), "image_ranking");
}

#[test]
fn url_override_shadows_parts_with_warning() {
    let env = EnvConfig {
        redis_url: Some("redis://cache:6400/1".to_string()),
        redis_host: Some("ignored".to_string()),
        ..EnvConfig::default()
    };
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env)
        .unwrap();

    assert_eq!(load.config.redis.connection_url(), "redis://cache:6400/1");
    assert!(load.warnings.iter().any(|w| w.message.contains("REDIS_URL")));
}

#[test]
fn empty_env_url_keeps_file_url() {
    let env = EnvConfig {
        redis_url: Some(String::new()),
        ..EnvConfig::default()
    };
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[redis]\nurl = \"redis://file-host:6401/5\"\n");

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env)
        .unwrap();

    assert_eq!(load.config.redis.connection_url(), "redis://file-host:6401/5");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::new()
        .with_config_path(dir.path().join("absent.toml"))
        .load_with_env(EnvConfig::default())
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }), "got {err:?}");
}

#[test]
fn unknown_keys_fail_to_parse() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[ranking]\nnamspace = \"typo\"\n");

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }), "got {err:?}");
}

#[test]
fn invalid_env_value_names_the_variable() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let env = EnvConfig {
        redis_port: Some("sixty".to_string()),
        ..EnvConfig::default()
    };

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env)
        .unwrap_err();
    assert!(
        matches!(err, ConfigLoadError::InvalidValue { field: "REDIS_PORT", .. }),
        "got {err:?}"
    );
}

#[test]
fn zero_top_n_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[ranking]\ntop_n = 0\n");

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .unwrap_err();
    assert!(
        matches!(err, ConfigLoadError::GuardRail(ConfigGuardRailError::ZeroTopN)),
        "got {err:?}"
    );
}

#[test]
fn config_path_can_come_from_environment() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[ranking]\nnamespace = \"gallery\"\n");
    let env = EnvConfig {
        config_path: Some(path.clone()),
        ..EnvConfig::default()
    };

    let load = ConfigLoader::new().load_with_env(env).unwrap();
    assert_eq!(load.config.ranking.namespace, "gallery");
    assert_eq!(load.config.metadata.config_path, Some(path));
}
