use imagerank_core::WriteMode;
use thiserror::Error;
use url::Url;

use super::models::{Config, RankingConfig, RedisConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("ranking {field} must not be empty")]
    EmptyKey { field: &'static str },
    #[error("ranking namespace '{namespace}' must not contain ':'")]
    NamespaceSeparator { namespace: String },
    #[error("redis {field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
    #[error("ranking top_n must be at least 1")]
    ZeroTopN,
    #[error("invalid REDIS_URL: {reason}")]
    InvalidRedisUrl { reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    validate_redis(&config.redis)?;
    validate_ranking(&config.ranking)?;

    if config.ranking.write_mode == WriteMode::Atomic {
        warnings.push_with_hint(
            "IMAGERANK_WRITE_MODE=atomic records views through a server-side script",
            "Counters and ranking scores can no longer drift apart; set it to 'sequential' to issue INCR and ZINCRBY separately",
        );
    }

    Ok(warnings)
}

fn validate_redis(redis: &RedisConfig) -> Result<(), ConfigGuardRailError> {
    if redis.connect_timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroTimeout {
            field: "connect_timeout",
        });
    }
    if redis.command_timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroTimeout {
            field: "command_timeout",
        });
    }

    if let Some(raw) = &redis.url {
        let parsed = Url::parse(raw).map_err(|err| {
            ConfigGuardRailError::InvalidRedisUrl {
                reason: err.to_string(),
            }
        })?;
        match parsed.scheme() {
            "redis" | "rediss" | "redis+unix" | "unix" => {}
            other => {
                return Err(ConfigGuardRailError::InvalidRedisUrl {
                    reason: format!("unsupported scheme '{other}'"),
                });
            }
        }
    }

    Ok(())
}

fn validate_ranking(ranking: &RankingConfig) -> Result<(), ConfigGuardRailError> {
    if ranking.namespace.trim().is_empty() {
        return Err(ConfigGuardRailError::EmptyKey { field: "namespace" });
    }
    if ranking.namespace.contains(':') {
        return Err(ConfigGuardRailError::NamespaceSeparator {
            namespace: ranking.namespace.clone(),
        });
    }
    if ranking.ranking_key.trim().is_empty() {
        return Err(ConfigGuardRailError::EmptyKey {
            field: "ranking_key",
        });
    }
    Ok(())
}
