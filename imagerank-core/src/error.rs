use imagerank_model::ModelError;
use thiserror::Error;

/// Errors surfaced by ranking store operations.
///
/// Only the two store variants can come out of a [`RankingStore`] call. Neither
/// is retried by this crate; callers choose their own policy.
///
/// [`RankingStore`]: crate::RankingStore
#[derive(Debug, Error)]
pub enum RankingError {
    /// The store could not be reached or did not answer within the timeout.
    #[error("ranking store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store answered with data of the wrong shape.
    #[error("ranking store protocol error: {0}")]
    StoreProtocolError(String),

    /// The store client could not be built from the supplied settings.
    #[error("invalid ranking store configuration: {0}")]
    Config(String),

    /// The image catalog failed while resolving ranked identifiers.
    #[error("image catalog error: {0}")]
    Catalog(#[source] anyhow::Error),
}

impl RankingError {
    /// Connection, timeout and refusal failures are unavailability; anything
    /// else the server said back is a protocol problem.
    pub(crate) fn from_redis(op: &str, err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
        {
            RankingError::StoreUnavailable(format!("{op} failed: {err}"))
        } else {
            RankingError::StoreProtocolError(format!("{op} failed: {err}"))
        }
    }

    pub(crate) fn from_model(op: &str, err: ModelError) -> Self {
        RankingError::StoreProtocolError(format!("{op} returned {err}"))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, RankingError::StoreUnavailable(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, RankingError::StoreProtocolError(_))
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
