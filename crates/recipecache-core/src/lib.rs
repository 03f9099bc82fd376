//! Core library for recipecache.
//!
//! Fetches a remote recipe catalog, keeps an offline copy in a local SQLite
//! store, and exposes a filterable, name-sorted collection through
//! [`SyncEngine`]. Photo assets are cached in the background after each
//! refresh.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod sync;
pub mod utils;

pub use api::{AssetFetcher, RecipeClient, RecipeSource};
pub use cache::{RecipeStore, SqliteStore};
pub use config::Config;
pub use error::{CatalogError, ErrorKind, Result};
pub use models::{AssetKind, Recipe, RecipeRow};
pub use sync::{AssetReport, RefreshOutcome, SyncEngine, SyncPhase};
