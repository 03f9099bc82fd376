//! Remote catalog client module.
//!
//! This module provides the `RecipeClient` for fetching the recipe catalog
//! and photo assets over HTTP, and the two traits the sync engine depends on
//! so tests can substitute in-process fakes.

pub mod client;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::Result;
use crate::models::Recipe;

pub use client::{decode_recipes, RecipeClient, DEFAULT_ENDPOINT};

/// Source of the full recipe catalog.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Fetch every recipe, in the order the source returns them.
    async fn fetch_all(&self) -> Result<Vec<Recipe>>;
}

/// Downloads a single binary asset.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_asset(&self, url: &Url) -> Result<Vec<u8>>;
}
