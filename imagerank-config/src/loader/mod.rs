pub mod error;

use once_cell::sync::Lazy;
use std::{
    fmt::Display,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use tracing::debug;

use self::error::ConfigLoadError;
use super::{
    models::{
        Config, ConfigMetadata, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT,
        DEFAULT_REDIS_DB, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT, RankingConfig,
        RedisConfig,
        sources::{EnvConfig, FileConfig, FileRankingConfig, FileRedisConfig},
    },
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("imagerank.toml"),
        PathBuf::from("config/imagerank.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Loads `.env`, reads the process environment and the config file, and
    /// applies guard rails.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_from(EnvConfig::gather(), env_file_loaded)
    }

    /// Same as [`load`](Self::load) but with a caller-supplied environment and
    /// no `.env` handling.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        self.load_from(env, false)
    }

    fn load_from(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;

        let metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };
        let (config, warnings) = compose_config(file_config, env, metadata)?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let requested = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match requested {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        debug!("loading config file {}", path.display());
        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;

    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No imagerank.toml detected; falling back to environment variables",
            "Create imagerank.toml or point IMAGERANK_CONFIG at a config file",
        );
    }

    let FileConfig {
        redis: file_redis,
        ranking: file_ranking,
    } = file_config.unwrap_or_default();

    let redis = compose_redis(&env, file_redis, &mut warnings)?;
    let ranking = compose_ranking(&env, file_ranking)?;

    let config = Config {
        redis,
        ranking,
        metadata,
    };

    warnings.extend(validation::apply_guard_rails(&config)?);
    Ok((config, warnings))
}

fn compose_redis(
    env: &EnvConfig,
    file: FileRedisConfig,
    warnings: &mut ConfigWarnings,
) -> Result<RedisConfig, ConfigLoadError> {
    let url = env
        .redis_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .or(file.url.filter(|url| !url.trim().is_empty()));

    let parts_given = env.redis_host.is_some()
        || env.redis_port.is_some()
        || env.redis_db.is_some()
        || file.host.is_some()
        || file.port.is_some()
        || file.db.is_some();
    if url.is_some() && parts_given {
        warnings.push_with_hint(
            "REDIS_URL is set; REDIS_HOST, REDIS_PORT and REDIS_DB are ignored",
            "Remove either the URL or the individual connection settings",
        );
    }

    let host = env
        .redis_host
        .clone()
        .or(file.host)
        .unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string());

    let port = match &env.redis_port {
        Some(raw) => parse_value("REDIS_PORT", raw)?,
        None => file.port.unwrap_or(DEFAULT_REDIS_PORT),
    };

    let db = match &env.redis_db {
        Some(raw) => parse_value("REDIS_DB", raw)?,
        None => file.db.unwrap_or(DEFAULT_REDIS_DB),
    };

    let connect_timeout = layered_duration(
        ("REDIS_CONNECT_TIMEOUT", env.redis_connect_timeout.as_deref()),
        ("redis.connect_timeout", file.connect_timeout.as_deref()),
        DEFAULT_CONNECT_TIMEOUT,
    )?;

    let command_timeout = layered_duration(
        ("REDIS_COMMAND_TIMEOUT", env.redis_command_timeout.as_deref()),
        ("redis.command_timeout", file.command_timeout.as_deref()),
        DEFAULT_COMMAND_TIMEOUT,
    )?;

    Ok(RedisConfig {
        host,
        port,
        db,
        url,
        connect_timeout,
        command_timeout,
    })
}

fn compose_ranking(
    env: &EnvConfig,
    file: FileRankingConfig,
) -> Result<RankingConfig, ConfigLoadError> {
    let defaults = RankingConfig::default();

    let write_mode = match (&env.write_mode, &file.write_mode) {
        (Some(raw), _) => parse_value("IMAGERANK_WRITE_MODE", raw)?,
        (None, Some(raw)) => parse_value("ranking.write_mode", raw)?,
        (None, None) => defaults.write_mode,
    };

    let top_n = match &env.top_n {
        Some(raw) => parse_value::<usize>("IMAGERANK_TOP_N", raw)?,
        None => file.top_n.unwrap_or(defaults.top_n.get()),
    };
    let top_n = NonZeroUsize::new(top_n).ok_or(ConfigGuardRailError::ZeroTopN)?;

    Ok(RankingConfig {
        namespace: env
            .namespace
            .clone()
            .or(file.namespace)
            .unwrap_or(defaults.namespace),
        ranking_key: env
            .ranking_key
            .clone()
            .or(file.ranking_key)
            .unwrap_or(defaults.ranking_key),
        write_mode,
        top_n,
    })
}

fn parse_value<T>(field: &'static str, raw: &str) -> Result<T, ConfigLoadError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|err: T::Err| ConfigLoadError::InvalidValue {
            field,
            value: raw.to_string(),
            reason: err.to_string(),
        })
}

fn layered_duration(
    env: (&'static str, Option<&str>),
    file: (&'static str, Option<&str>),
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    let (field, raw) = match (env, file) {
        ((field, Some(raw)), _) => (field, raw),
        (_, (field, Some(raw))) => (field, raw),
        _ => return Ok(default),
    };

    humantime::parse_duration(raw.trim()).map_err(|err| {
        ConfigLoadError::InvalidValue {
            field,
            value: raw.to_string(),
            reason: err.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_duration_beats_file_duration() {
        let resolved = layered_duration(
            ("REDIS_COMMAND_TIMEOUT", Some("250ms")),
            ("redis.command_timeout", Some("5s")),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .unwrap();
        assert_eq!(resolved, Duration::from_millis(250));
    }

    #[test]
    fn bad_duration_names_its_source() {
        let err = layered_duration(
            ("REDIS_CONNECT_TIMEOUT", None),
            ("redis.connect_timeout", Some("soon")),
            DEFAULT_CONNECT_TIMEOUT,
        )
        .unwrap_err();
        assert!(
            matches!(
                err,
                ConfigLoadError::InvalidValue {
                    field: "redis.connect_timeout",
                    ..
                }
            ),
            "got {err:?}"
        );
    }
}
