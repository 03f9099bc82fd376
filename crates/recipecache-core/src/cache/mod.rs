//! Local persistence for offline recipe access.
//!
//! This module provides the `RecipeStore` contract the sync engine writes
//! through, the SQLite-backed `SqliteStore`, and helpers for reporting how
//! old the stored catalog is.

pub mod age;
pub mod store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AssetKind, Recipe};

pub use store::SqliteStore;

/// Persistent collection of recipes keyed by id.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Every stored recipe, in insertion order. Not sorted.
    async fn read_all(&self) -> Result<Vec<Recipe>>;

    /// Replace the whole collection in one transaction.
    ///
    /// On failure nothing changes: readers see either the old set or the
    /// new one, never an empty or partial set.
    async fn replace_all(&self, recipes: &[Recipe]) -> Result<()>;

    /// Attach a downloaded image to the recipe with this id.
    ///
    /// Returns `false` without error when no such recipe is stored.
    async fn attach_asset(&self, id: Uuid, kind: AssetKind, payload: Vec<u8>) -> Result<bool>;

    /// When the last successful `replace_all` committed.
    async fn last_synced(&self) -> Result<Option<DateTime<Utc>>>;
}
