use imagerank_model::ImageID;

/// Namespace used for per-image view counters.
pub const DEFAULT_NAMESPACE: &str = "image";
/// Name of the global ranking sorted set.
pub const DEFAULT_RANKING_KEY: &str = "image_ranking";

/// Key layout for the counters and the ranking set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingKeys {
    namespace: String,
    ranking_key: String,
}

impl Default for RankingKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_RANKING_KEY)
    }
}

impl RankingKeys {
    pub fn new(namespace: impl Into<String>, ranking_key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ranking_key: ranking_key.into(),
        }
    }

    /// Counter key for one image, e.g. `image:42:views`.
    pub fn views(&self, image: &ImageID) -> String {
        format!("{}:{}:views", self.namespace, image)
    }

    pub fn ranking(&self) -> &str {
        &self.ranking_key
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}
