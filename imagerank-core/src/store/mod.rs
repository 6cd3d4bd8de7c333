//! The [`RankingStore`] seam and its backends.

mod memory;
mod redis_store;

pub use self::memory::InMemoryRankingStore;
pub use self::redis_store::{RedisRankingStore, RedisStoreOptions};

use crate::error::Result;
use async_trait::async_trait;
use imagerank_model::{ImageID, ViewCount};
use serde::{Deserialize, Serialize};
use std::{fmt, num::NonZeroUsize, str::FromStr};

/// How a recorded view reaches the counter and the ranking set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// `INCR` then `ZINCRBY` as two round trips. A failure between them leaves
    /// the counter ahead of the ranking score.
    #[default]
    Sequential,
    /// Both increments inside one server-side script; either both apply or
    /// neither does.
    Atomic,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Sequential => "sequential",
            WriteMode::Atomic => "atomic",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(WriteMode::Sequential),
            "atomic" => Ok(WriteMode::Atomic),
            other => Err(format!(
                "unknown write mode '{other}' (expected 'sequential' or 'atomic')"
            )),
        }
    }
}

/// View counting and ranking backend.
///
/// Implementations hold no state of their own between calls beyond a
/// connection; everything observable lives in the store and is shared by every
/// client pointed at it.
#[async_trait]
pub trait RankingStore: Send + Sync + fmt::Debug {
    /// Bump the image's view counter and ranking score by one, returning the
    /// new counter value.
    async fn record_view(&self, image: &ImageID) -> Result<ViewCount>;

    /// Identifiers of the `limit` highest-scoring images, best first.
    async fn top_ranked(&self, limit: NonZeroUsize) -> Result<Vec<ImageID>>;

    /// Current counter value without incrementing it.
    async fn view_count(&self, image: &ImageID) -> Result<ViewCount>;

    /// Current ranking score, `None` if the image was never recorded.
    async fn ranking_score(&self, image: &ImageID) -> Result<Option<f64>>;

    /// Number of images present in the ranking set.
    async fn ranked_count(&self) -> Result<u64>;
}
