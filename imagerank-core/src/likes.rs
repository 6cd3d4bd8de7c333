//! Like/unlike requests with an explicit outcome.
//!
//! The caller gets a [`Result`] back and decides whether a failure is shown,
//! degraded or ignored. [`LikeResponse`] keeps the `{"status": ...}` body the
//! front end expects.

use async_trait::async_trait;
use imagerank_model::{ImageID, UserID};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    /// `"like"` likes; any other non-empty action unlikes.
    pub fn from_action(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            "like" => Some(LikeAction::Like),
            _ => Some(LikeAction::Unlike),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeStatus {
    Liked,
    Unliked,
}

#[derive(Debug, Error)]
pub enum LikeError {
    #[error("like request is missing the image id or the action")]
    MissingInput,

    #[error("like ledger failure: {0}")]
    Ledger(#[from] anyhow::Error),
}

/// Storage of which users like which images, owned by the relational layer.
#[async_trait]
pub trait LikeLedger: Send + Sync {
    async fn add_like(&self, image: &ImageID, user: UserID) -> anyhow::Result<()>;
    async fn remove_like(&self, image: &ImageID, user: UserID) -> anyhow::Result<()>;
}

pub async fn toggle_like<L>(
    ledger: &L,
    image: Option<&ImageID>,
    user: UserID,
    action: Option<&str>,
) -> Result<LikeStatus, LikeError>
where
    L: LikeLedger + ?Sized,
{
    let (Some(image), Some(action)) = (image, action.and_then(LikeAction::from_action)) else {
        return Err(LikeError::MissingInput);
    };

    match action {
        LikeAction::Like => {
            ledger.add_like(image, user).await?;
            debug!(image_id = %image, user_id = %user, "image liked");
            Ok(LikeStatus::Liked)
        }
        LikeAction::Unlike => {
            ledger.remove_like(image, user).await?;
            debug!(image_id = %image, user_id = %user, "image unliked");
            Ok(LikeStatus::Unliked)
        }
    }
}

/// JSON body returned to the like button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeResponse {
    pub status: &'static str,
}

impl LikeResponse {
    pub const OK: LikeResponse = LikeResponse { status: "ok" };
    pub const ERROR: LikeResponse = LikeResponse { status: "error" };
}

impl From<&Result<LikeStatus, LikeError>> for LikeResponse {
    fn from(outcome: &Result<LikeStatus, LikeError>) -> Self {
        match outcome {
            Ok(_) => LikeResponse::OK,
            Err(_) => LikeResponse::ERROR,
        }
    }
}
