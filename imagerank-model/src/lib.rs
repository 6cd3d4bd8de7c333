//! Identifier and value types shared across imagerank crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod views;

pub use error::{ModelError, Result};
pub use ids::{ImageID, UserID};
pub use views::ViewCount;
