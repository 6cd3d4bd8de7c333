//! Configuration for imagerank.
//!
//! Values are layered from the process environment (optionally seeded from a
//! `.env` file), an `imagerank.toml` file, and built-in defaults, in that order
//! of precedence. The loaded [`Config`] is checked by guard rails before it is
//! handed out; soft problems come back as [`ConfigWarnings`].

#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{Config, ConfigMetadata, RankingConfig, RedisConfig};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
