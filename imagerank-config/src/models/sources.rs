use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub redis: FileRedisConfig,
    #[serde(default)]
    pub ranking: FileRankingConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileRedisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db: Option<u32>,
    /// Humantime string such as `"500ms"` or `"2s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileRankingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

/// Environment-derived configuration values, kept as raw strings so parse
/// failures can name the variable.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub redis_url: Option<String>,
    pub redis_host: Option<String>,
    pub redis_port: Option<String>,
    pub redis_db: Option<String>,
    pub redis_connect_timeout: Option<String>,
    pub redis_command_timeout: Option<String>,
    pub namespace: Option<String>,
    pub ranking_key: Option<String>,
    pub write_mode: Option<String>,
    pub top_n: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("IMAGERANK_CONFIG").ok().map(PathBuf::from),
            redis_url: std::env::var("REDIS_URL").ok(),
            redis_host: std::env::var("REDIS_HOST").ok(),
            redis_port: std::env::var("REDIS_PORT").ok(),
            redis_db: std::env::var("REDIS_DB").ok(),
            redis_connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT").ok(),
            redis_command_timeout: std::env::var("REDIS_COMMAND_TIMEOUT").ok(),
            namespace: std::env::var("IMAGERANK_NAMESPACE").ok(),
            ranking_key: std::env::var("IMAGERANK_RANKING_KEY").ok(),
            write_mode: std::env::var("IMAGERANK_WRITE_MODE").ok(),
            top_n: std::env::var("IMAGERANK_TOP_N").ok(),
        }
    }
}
