use crate::models::{AssetKind, Recipe};

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Loading,
    Refreshing,
}

impl SyncPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Loading => "loading",
            SyncPhase::Refreshing => "refreshing",
        }
    }
}

/// In-memory projection owned by the sync engine.
///
/// Only replaced wholesale by load/refresh, except for image payloads the
/// asset cache attaches and the error message.
#[derive(Debug, Default)]
pub struct SyncState {
    pub recipes: Vec<Recipe>,
    pub error_message: Option<String>,
}

impl SyncState {
    pub fn replace(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes;
        self.error_message = None;
    }

    /// Set an image on the displayed recipe with this id, if still present.
    pub fn attach_image(&mut self, id: uuid::Uuid, kind: AssetKind, payload: Vec<u8>) -> bool {
        match self.recipes.iter_mut().find(|r| r.id == id) {
            Some(recipe) => {
                recipe.set_image(kind, payload);
                true
            }
            None => false,
        }
    }
}
