//! Data models for recipe catalog entities.
//!
//! This module contains:
//!
//! - `Recipe`: the domain record persisted by the local store
//! - `RecipeRow`: the minimal projection used by list views
//! - `RecipesResponse`, `RecipeTransfer`: wire types decoded from the catalog endpoint

pub mod recipe;
pub mod transfer;

pub use recipe::{AssetKind, Recipe, RecipeRow};
pub use transfer::{RecipeTransfer, RecipesResponse};
