//! Display ordering and search over the in-memory recipe set.
//!
//! Both functions work on copies; the authoritative collection held by the
//! sync engine is never mutated from here.

use crate::models::Recipe;
use crate::utils::{cmp_ignore_case, contains_ignore_case};

/// Check if a recipe matches the search query on name or cuisine.
fn recipe_matches_search(recipe: &Recipe, query: &str) -> bool {
    contains_ignore_case(&recipe.name, query) || contains_ignore_case(&recipe.cuisine, query)
}

/// Recipes whose name or cuisine contains `query`, case-insensitively.
///
/// An empty query returns `current` unchanged. Order is preserved.
pub fn filter_recipes(current: &[Recipe], query: &str) -> Vec<Recipe> {
    if query.is_empty() {
        return current.to_vec();
    }

    current
        .iter()
        .filter(|recipe| recipe_matches_search(recipe, query))
        .cloned()
        .collect()
}

/// Sort ascending by name, case-insensitively. Stable for equal names.
pub fn sort_by_name(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
}
