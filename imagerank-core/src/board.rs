use crate::{
    error::{RankingError, Result},
    store::RankingStore,
};
use async_trait::async_trait;
use imagerank_model::{ImageID, ViewCount};
use std::{collections::HashMap, fmt, num::NonZeroUsize, sync::Arc};
use tracing::debug;

/// Page size of the most-viewed listing.
pub const DEFAULT_TOP_N: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Anything the catalog returns that can be matched back to a ranking entry.
pub trait RankedItem {
    fn image_id(&self) -> &ImageID;
}

/// Bulk lookup of images by identifier, owned by the relational layer.
///
/// Results may come back in any order and may omit identifiers that no longer
/// resolve.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    type Image: RankedItem + Send;

    async fn images_by_ids(&self, ids: &[ImageID]) -> anyhow::Result<Vec<Self::Image>>;
}

/// Re-order `images` to follow `ranked`.
///
/// Identifiers without a matching image are skipped; if the catalog returns
/// the same image twice the first copy wins.
pub fn order_by_ranking<T: RankedItem>(ranked: &[ImageID], images: Vec<T>) -> Vec<T> {
    let mut by_id: HashMap<ImageID, T> = HashMap::with_capacity(images.len());
    for image in images {
        by_id.entry(image.image_id().clone()).or_insert(image);
    }

    ranked.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// The ranking page flow: read the leaderboard, resolve it against the
/// catalog, and hand back images in leaderboard order.
pub struct RankingBoard<C> {
    store: Arc<dyn RankingStore>,
    catalog: C,
}

impl<C> fmt::Debug for RankingBoard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingBoard")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<C: ImageCatalog> RankingBoard<C> {
    pub fn new(store: Arc<dyn RankingStore>, catalog: C) -> Self {
        Self { store, catalog }
    }

    pub fn store(&self) -> &Arc<dyn RankingStore> {
        &self.store
    }

    /// Detail-view hook: counts the view and returns the new total.
    pub async fn record_detail_view(&self, image: &ImageID) -> Result<ViewCount> {
        self.store.record_view(image).await
    }

    pub async fn most_viewed(&self, limit: NonZeroUsize) -> Result<Vec<C::Image>> {
        let ranked = self.store.top_ranked(limit).await?;
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let images = self
            .catalog
            .images_by_ids(&ranked)
            .await
            .map_err(RankingError::Catalog)?;

        let ordered = order_by_ranking(&ranked, images);
        if ordered.len() < ranked.len() {
            debug!(
                ranked = ranked.len(),
                resolved = ordered.len(),
                "some ranked images no longer resolve in the catalog"
            );
        }

        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: ImageID,
        title: &'static str,
    }

    impl RankedItem for Row {
        fn image_id(&self) -> &ImageID {
            &self.id
        }
    }

    fn row(id: i64, title: &'static str) -> Row {
        Row {
            id: ImageID::from(id),
            title,
        }
    }

    #[test]
    fn restores_ranking_order_from_unordered_rows() {
        let ranked = vec![ImageID::from(3_i64), ImageID::from(1_i64), ImageID::from(2_i64)];
        let rows = vec![row(1, "one"), row(2, "two"), row(3, "three")];

        let titles: Vec<_> = order_by_ranking(&ranked, rows)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["three", "one", "two"]);
    }

    #[test]
    fn skips_missing_rows_and_keeps_first_duplicate() {
        let ranked = vec![ImageID::from(9_i64), ImageID::from(4_i64)];
        let rows = vec![row(4, "first"), row(4, "second")];

        let ordered = order_by_ranking(&ranked, rows);
        assert_eq!(ordered, vec![row(4, "first")]);
    }

    #[test]
    fn default_page_size_is_ten() {
        assert_eq!(DEFAULT_TOP_N.get(), 10);
    }
}
