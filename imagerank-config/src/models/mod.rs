pub mod sources;

use imagerank_core::{RankingKeys, RedisStoreOptions, WriteMode};
use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

pub const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_REDIS_DB: u32 = 0;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    pub redis: RedisConfig,
    pub ranking: RankingConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Settings for [`imagerank_core::RedisRankingStore`].
    pub fn store_options(&self) -> RedisStoreOptions {
        RedisStoreOptions {
            keys: RankingKeys::new(
                self.ranking.namespace.clone(),
                self.ranking.ranking_key.clone(),
            ),
            write_mode: self.ranking.write_mode,
            connect_timeout: self.redis.connect_timeout,
            command_timeout: self.redis.command_timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: u32,
    /// Full connection URL; when set it wins over host, port and db.
    pub url: Option<String>,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.to_string(),
            port: DEFAULT_REDIS_PORT,
            db: DEFAULT_REDIS_DB,
            url: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl RedisConfig {
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("redis://[{}]:{}/{}", self.host, self.port, self.db)
        } else {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        }
    }

    /// Address for log lines and error messages, without credentials.
    pub fn display_address(&self) -> String {
        match &self.url {
            Some(raw) => match url::Url::parse(raw) {
                Ok(parsed) => format!(
                    "{}:{}{}",
                    parsed.host_str().unwrap_or("localhost"),
                    parsed.port().unwrap_or(DEFAULT_REDIS_PORT),
                    parsed.path()
                ),
                Err(_) => "<invalid REDIS_URL>".to_string(),
            },
            None => format!("{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub namespace: String,
    pub ranking_key: String,
    pub write_mode: WriteMode,
    pub top_n: NonZeroUsize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            namespace: imagerank_core::keys::DEFAULT_NAMESPACE.to_string(),
            ranking_key: imagerank_core::keys::DEFAULT_RANKING_KEY.to_string(),
            write_mode: WriteMode::default(),
            top_n: imagerank_core::DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
