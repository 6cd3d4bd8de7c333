use super::{RankingStore, WriteMode};
use crate::error::{RankingError, Result};
use async_trait::async_trait;
use imagerank_model::{ImageID, ViewCount};
use std::{
    cmp::Ordering,
    collections::HashMap,
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct MemoryState {
    views: HashMap<ImageID, u64>,
    scores: HashMap<ImageID, f64>,
}

/// Process-local ranking store with the same observable behaviour as the
/// Redis backend, including its tie-break among equal scores.
///
/// Clones share state. [`set_available`](Self::set_available) and
/// [`fail_next_ranking_write`](Self::fail_next_ranking_write) simulate an
/// unreachable store and a failure between the two increments.
#[derive(Debug, Clone)]
pub struct InMemoryRankingStore {
    state: Arc<RwLock<MemoryState>>,
    available: Arc<AtomicBool>,
    fail_ranking_write: Arc<AtomicBool>,
    write_mode: WriteMode,
}

impl Default for InMemoryRankingStore {
    fn default() -> Self {
        Self::new(WriteMode::default())
    }
}

impl InMemoryRankingStore {
    pub fn new(write_mode: WriteMode) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            available: Arc::new(AtomicBool::new(true)),
            fail_ranking_write: Arc::new(AtomicBool::new(false)),
            write_mode,
        }
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    /// Makes the next ranking-score increment fail as if the store dropped
    /// the connection after the counter increment.
    pub fn fail_next_ranking_write(&self) {
        self.fail_ranking_write.store(true, AtomicOrdering::SeqCst);
    }

    fn ensure_available(&self, op: &str) -> Result<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(RankingError::StoreUnavailable(format!(
                "{op} failed: in-memory store is offline"
            )))
        }
    }

    fn take_ranking_failure(&self) -> bool {
        self.fail_ranking_write.swap(false, AtomicOrdering::SeqCst)
    }
}

/// Highest score first; equal scores fall back to reverse byte order of the
/// member, which is what `ZREVRANGE` does.
fn rank_order(a: &(&ImageID, &f64), b: &(&ImageID, &f64)) -> Ordering {
    b.1.total_cmp(a.1)
        .then_with(|| b.0.as_str().as_bytes().cmp(a.0.as_str().as_bytes()))
}

#[async_trait]
impl RankingStore for InMemoryRankingStore {
    async fn record_view(&self, image: &ImageID) -> Result<ViewCount> {
        self.ensure_available("INCR")?;
        let mut state = self.state.write().await;

        match self.write_mode {
            WriteMode::Sequential => {
                let views = state.views.entry(image.clone()).or_insert(0);
                *views += 1;
                let views = ViewCount(*views);

                if self.take_ranking_failure() {
                    warn!(
                        image_id = %image,
                        views = views.get(),
                        "view counter incremented but ranking update failed; counter and ranking now diverge"
                    );
                    return Err(RankingError::StoreUnavailable(
                        "ZINCRBY failed: in-memory store dropped the write".to_string(),
                    ));
                }

                *state.scores.entry(image.clone()).or_insert(0.0) += 1.0;
                debug!(image_id = %image, views = views.get(), "recorded view");
                Ok(views)
            }
            WriteMode::Atomic => {
                if self.take_ranking_failure() {
                    return Err(RankingError::StoreUnavailable(
                        "EVALSHA failed: in-memory store dropped the write".to_string(),
                    ));
                }

                let views = state.views.entry(image.clone()).or_insert(0);
                *views += 1;
                let views = ViewCount(*views);
                *state.scores.entry(image.clone()).or_insert(0.0) += 1.0;
                debug!(image_id = %image, views = views.get(), "recorded view atomically");
                Ok(views)
            }
        }
    }

    async fn top_ranked(&self, limit: NonZeroUsize) -> Result<Vec<ImageID>> {
        self.ensure_available("ZREVRANGE")?;
        let state = self.state.read().await;

        let mut ranked: Vec<(&ImageID, &f64)> = state.scores.iter().collect();
        ranked.sort_by(rank_order);

        Ok(ranked
            .into_iter()
            .take(limit.get())
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn view_count(&self, image: &ImageID) -> Result<ViewCount> {
        self.ensure_available("GET")?;
        let state = self.state.read().await;
        Ok(state
            .views
            .get(image)
            .copied()
            .map(ViewCount)
            .unwrap_or(ViewCount::ZERO))
    }

    async fn ranking_score(&self, image: &ImageID) -> Result<Option<f64>> {
        self.ensure_available("ZSCORE")?;
        let state = self.state.read().await;
        Ok(state.scores.get(image).copied())
    }

    async fn ranked_count(&self) -> Result<u64> {
        self.ensure_available("ZCARD")?;
        let state = self.state.read().await;
        Ok(state.scores.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn equal_scores_follow_reverse_member_order() {
        let store = InMemoryRankingStore::default();
        for id in ["a", "c", "b"] {
            store.record_view(&ImageID::from(id)).await.unwrap();
        }

        let top = store.top_ranked(limit(3)).await.unwrap();
        assert_eq!(
            top,
            vec![ImageID::from("c"), ImageID::from("b"), ImageID::from("a")]
        );
    }

    #[tokio::test]
    async fn offline_store_rejects_every_operation() {
        let store = InMemoryRankingStore::default();
        store.set_available(false);
        let id = ImageID::from(1_i64);

        assert!(store.record_view(&id).await.unwrap_err().is_unavailable());
        assert!(store.top_ranked(limit(1)).await.unwrap_err().is_unavailable());
        assert!(store.view_count(&id).await.unwrap_err().is_unavailable());
        assert!(store.ranking_score(&id).await.unwrap_err().is_unavailable());
        assert!(store.ranked_count().await.unwrap_err().is_unavailable());
    }

    #[tokio::test]
    async fn injected_failure_only_affects_one_write() {
        let store = InMemoryRankingStore::default();
        let id = ImageID::from(5_i64);

        store.fail_next_ranking_write();
        assert!(store.record_view(&id).await.is_err());
        assert_eq!(store.record_view(&id).await.unwrap(), ViewCount(2));
        assert_eq!(store.ranking_score(&id).await.unwrap(), Some(1.0));
    }
}
