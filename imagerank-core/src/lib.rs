//! # imagerank core
//!
//! View counting and most-viewed ranking for the image bookmarking
//! application, backed by Redis.
//!
//! Two structures live in the store:
//!
//! - a per-image **view counter** (`<namespace>:<image id>:views`), bumped with
//!   `INCR` on every detail view;
//! - one global **ranking set** (`image_ranking` by default), a sorted set whose
//!   score is bumped with `ZINCRBY` on every detail view and read back with
//!   `ZREVRANGE` as a top-N leaderboard.
//!
//! [`RankingStore`] is the seam callers program against.
//! [`RedisRankingStore`] talks to a real server and [`InMemoryRankingStore`]
//! mirrors its semantics in process.
//!
//! ```no_run
//! use imagerank_core::{RankingStore, RedisRankingStore, RedisStoreOptions};
//! use imagerank_model::ImageID;
//! use std::num::NonZeroUsize;
//!
//! async fn show_detail(store: &RedisRankingStore) -> imagerank_core::Result<()> {
//!     let total = store.record_view(&ImageID::from(42_i64)).await?;
//!     println!("viewed {total} times");
//!
//!     let top = store.top_ranked(NonZeroUsize::new(10).unwrap()).await?;
//!     println!("most viewed: {top:?}");
//!     Ok(())
//! }
//!
//! # async fn build() -> imagerank_core::Result<()> {
//! let store = RedisRankingStore::open("redis://127.0.0.1:6379/0", RedisStoreOptions::default())?;
//! show_detail(&store).await
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Resolving ranked identifiers into displayable images
pub mod board;
/// Error taxonomy shared by every store backend
pub mod error;
/// Store key layout
pub mod keys;
/// Like/unlike outcome handling
pub mod likes;
/// Ranking store trait and backends
pub mod store;

pub use board::{DEFAULT_TOP_N, ImageCatalog, RankedItem, RankingBoard, order_by_ranking};
pub use error::{RankingError, Result};
pub use keys::RankingKeys;
pub use likes::{LikeAction, LikeError, LikeLedger, LikeResponse, LikeStatus, toggle_like};
pub use store::{
    InMemoryRankingStore, RankingStore, RedisRankingStore, RedisStoreOptions,
    WriteMode,
};
