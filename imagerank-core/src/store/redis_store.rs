use super::{RankingStore, WriteMode};
use crate::{
    error::{RankingError, Result},
    keys::RankingKeys,
};
use async_trait::async_trait;
use imagerank_model::{ImageID, ViewCount};
use redis::{AsyncCommands, RedisResult, Script, aio::ConnectionManager};
use std::{fmt, future::Future, num::NonZeroUsize, sync::Arc, time::Duration};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Server-side script for [`WriteMode::Atomic`].
///
/// Type checks run before any write so a bad key aborts the script with
/// nothing applied; Redis does not roll back writes made before an error.
fn record_view_script() -> Script {
    Script::new(
        r#"
        local views_key = KEYS[1]
        local ranking_key = KEYS[2]
        local member = ARGV[1]

        local ranking_type = redis.call('TYPE', ranking_key)['ok']
        if ranking_type ~= 'none' and ranking_type ~= 'zset' then
            return redis.error_reply('WRONGTYPE ranking key does not hold a sorted set')
        end

        local current = redis.call('GET', views_key)
        if current and not tonumber(current) then
            return redis.error_reply('WRONGTYPE view counter is not an integer')
        end

        local views = redis.call('INCR', views_key)
        redis.call('ZINCRBY', ranking_key, 1, member)
        return views
        "#,
    )
}

/// Connection and key settings for [`RedisRankingStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreOptions {
    pub keys: RankingKeys,
    pub write_mode: WriteMode,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Upper bound on each command round trip.
    pub command_timeout: Duration,
}

impl Default for RedisStoreOptions {
    fn default() -> Self {
        Self {
            keys: RankingKeys::default(),
            write_mode: WriteMode::default(),
            connect_timeout: Duration::from_secs(2),
            command_timeout: Duration::from_secs(1),
        }
    }
}

/// Redis-backed ranking store.
///
/// The connection is opened on first use and then shared by every clone of
/// the store; [`ConnectionManager`] reconnects on its own after a drop, while
/// the command that observed the drop fails with
/// [`RankingError::StoreUnavailable`].
#[derive(Clone)]
pub struct RedisRankingStore {
    client: redis::Client,
    conn: Arc<OnceCell<ConnectionManager>>,
    options: RedisStoreOptions,
    record_script: Arc<Script>,
}

impl fmt::Debug for RedisRankingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRankingStore")
            .field("connection", &"ConnectionManager")
            .field("connected", &self.conn.initialized())
            .field("options", &self.options)
            .finish()
    }
}

impl RedisRankingStore {
    /// Builds a client for `redis_url` without connecting yet.
    pub fn open(redis_url: &str, options: RedisStoreOptions) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            RankingError::Config(format!("invalid Redis URL '{redis_url}': {e}"))
        })?;

        Ok(Self {
            client,
            conn: Arc::new(OnceCell::new()),
            options,
            record_script: Arc::new(record_view_script()),
        })
    }

    /// Opens a client and establishes the connection immediately, so startup
    /// fails fast when the store is unreachable.
    pub async fn connect(redis_url: &str, options: RedisStoreOptions) -> Result<Self> {
        let store = Self::open(redis_url, options)?;
        store.connection().await?;
        Ok(store)
    }

    pub fn keys(&self) -> &RankingKeys {
        &self.options.keys
    }

    pub fn write_mode(&self) -> WriteMode {
        self.options.write_mode
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                info!("Connecting to Redis ranking store");
                let connect = ConnectionManager::new(self.client.clone());
                match tokio::time::timeout(self.options.connect_timeout, connect).await {
                    Ok(Ok(conn)) => {
                        info!("Successfully connected to Redis ranking store");
                        Ok(conn)
                    }
                    Ok(Err(e)) => Err(RankingError::StoreUnavailable(format!(
                        "failed to connect to Redis: {e}"
                    ))),
                    Err(_) => Err(RankingError::StoreUnavailable(format!(
                        "timed out connecting to Redis after {:?}",
                        self.options.connect_timeout
                    ))),
                }
            })
            .await?;

        Ok(conn.clone())
    }

    /// Runs one command under the per-call timeout and classifies failures.
    async fn bounded<T, F>(&self, op: &str, command: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.options.command_timeout, command).await {
            Ok(result) => result.map_err(|e| RankingError::from_redis(op, e)),
            Err(_) => Err(RankingError::StoreUnavailable(format!(
                "{op} timed out after {:?}",
                self.options.command_timeout
            ))),
        }
    }

    async fn record_sequential(
        &self,
        conn: &mut ConnectionManager,
        image: &ImageID,
    ) -> Result<ViewCount> {
        let views_key = self.options.keys.views(image);
        let ranking_key = self.options.keys.ranking();

        debug!("Ranking INCR: {}", views_key);
        let raw: i64 = self.bounded("INCR", conn.incr(&views_key, 1)).await?;
        let views = match ViewCount::from_store(raw) {
            Ok(views) => views,
            Err(e) => {
                // INCR already applied; the ranking is left untouched.
                let err = RankingError::from_model("INCR", e);
                warn!(
                    image_id = %image,
                    counter = raw,
                    error = %err,
                    "view counter incremented but holds a negative value; ranking not updated"
                );
                return Err(err);
            }
        };

        debug!("Ranking ZINCRBY: {} {}", ranking_key, image);
        let bumped: Result<f64> = self
            .bounded("ZINCRBY", conn.zincr(ranking_key, image.as_str(), 1.0))
            .await;

        if let Err(err) = bumped {
            warn!(
                image_id = %image,
                views = views.get(),
                error = %err,
                "view counter incremented but ranking update failed; counter and ranking now diverge"
            );
            return Err(err);
        }

        Ok(views)
    }

    async fn record_atomic(
        &self,
        conn: &mut ConnectionManager,
        image: &ImageID,
    ) -> Result<ViewCount> {
        let views_key = self.options.keys.views(image);
        debug!("Ranking EVALSHA record_view: {}", views_key);

        let mut invocation = self.record_script.prepare_invoke();
        invocation
            .key(&views_key)
            .key(self.options.keys.ranking())
            .arg(image.as_str());

        let raw: i64 = self
            .bounded("EVALSHA", invocation.invoke_async(conn))
            .await?;

        ViewCount::from_store(raw).map_err(|e| RankingError::from_model("EVALSHA", e))
    }
}

#[async_trait]
impl RankingStore for RedisRankingStore {
    async fn record_view(&self, image: &ImageID) -> Result<ViewCount> {
        let mut conn = self.connection().await?;

        match self.options.write_mode {
            WriteMode::Sequential => self.record_sequential(&mut conn, image).await,
            WriteMode::Atomic => self.record_atomic(&mut conn, image).await,
        }
    }

    async fn top_ranked(&self, limit: NonZeroUsize) -> Result<Vec<ImageID>> {
        let mut conn = self.connection().await?;
        let ranking_key = self.options.keys.ranking();
        let stop = isize::try_from(limit.get() - 1).unwrap_or(isize::MAX);

        debug!("Ranking ZREVRANGE: {} 0 {}", ranking_key, stop);
        let members: Vec<String> = self
            .bounded("ZREVRANGE", conn.zrevrange(ranking_key, 0, stop))
            .await?;

        Ok(members.into_iter().map(ImageID::from).collect())
    }

    async fn view_count(&self, image: &ImageID) -> Result<ViewCount> {
        let mut conn = self.connection().await?;
        let views_key = self.options.keys.views(image);

        debug!("Ranking GET: {}", views_key);
        let raw: Option<i64> = self.bounded("GET", conn.get(&views_key)).await?;

        match raw {
            Some(raw) => {
                ViewCount::from_store(raw).map_err(|e| RankingError::from_model("GET", e))
            }
            None => Ok(ViewCount::ZERO),
        }
    }

    async fn ranking_score(&self, image: &ImageID) -> Result<Option<f64>> {
        let mut conn = self.connection().await?;
        let ranking_key = self.options.keys.ranking();

        debug!("Ranking ZSCORE: {} {}", ranking_key, image);
        self.bounded("ZSCORE", conn.zscore(ranking_key, image.as_str()))
            .await
    }

    async fn ranked_count(&self) -> Result<u64> {
        let mut conn = self.connection().await?;
        let ranking_key = self.options.keys.ranking();

        debug!("Ranking ZCARD: {}", ranking_key);
        self.bounded("ZCARD", conn.zcard(ranking_key)).await
    }
}
