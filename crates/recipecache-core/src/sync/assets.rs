//! Best-effort photo caching.
//!
//! Downloads each recipe's small and large photo and attaches the bytes to
//! the stored record and to the displayed record. Every failure is logged
//! and counted; none aborts the batch or reaches the user.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::Url;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::SyncState;
use crate::api::AssetFetcher;
use crate::cache::RecipeStore;
use crate::models::{AssetKind, Recipe};

/// Default bound on concurrent downloads.
/// Small enough not to flood the CDN, large enough to finish a catalog quickly.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 6;

/// Counts from one `cache_assets` pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetReport {
    pub attached: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Outcome {
    Attached,
    Skipped,
    Failed,
}

#[derive(Clone)]
pub struct AssetCache {
    fetcher: Arc<dyn AssetFetcher>,
    store: Arc<dyn RecipeStore>,
    state: Option<Arc<RwLock<SyncState>>>,
    max_concurrent: usize,
}

impl AssetCache {
    pub fn new(
        fetcher: Arc<dyn AssetFetcher>,
        store: Arc<dyn RecipeStore>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            state: None,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Also update the displayed collection as payloads arrive.
    pub fn with_state(mut self, state: Arc<RwLock<SyncState>>) -> Self {
        self.state = Some(state);
        self
    }

    /// Download and attach both photos of every recipe.
    pub async fn cache_assets(&self, recipes: &[Recipe]) -> AssetReport {
        let mut report = AssetReport::default();
        let mut jobs = Vec::new();

        for recipe in recipes {
            for kind in [AssetKind::Small, AssetKind::Large] {
                let reference = recipe.photo_url(kind);
                match Url::parse(reference) {
                    Ok(url) => jobs.push((recipe.id, kind, url)),
                    Err(e) => {
                        warn!(id = %recipe.id, kind = kind.label(), reference, error = %e, "Skipping asset with invalid URL");
                        report.skipped += 1;
                    }
                }
            }
        }

        debug!(count = jobs.len(), max_concurrent = self.max_concurrent, "Caching recipe assets");

        let outcomes: Vec<Outcome> = stream::iter(jobs)
            .map(|(id, kind, url)| self.cache_one(id, kind, url))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Outcome::Attached => report.attached += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        info!(
            attached = report.attached,
            skipped = report.skipped,
            failed = report.failed,
            "Asset caching complete"
        );
        report
    }

    async fn cache_one(&self, id: Uuid, kind: AssetKind, url: Url) -> Outcome {
        let payload = match self.fetcher.fetch_asset(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%id, url = %url, error = %e, "Asset download failed");
                return Outcome::Failed;
            }
        };

        let displayed = match &self.state {
            Some(state) => state.write().await.attach_image(id, kind, payload.clone()),
            None => false,
        };

        match self.store.attach_asset(id, kind, payload).await {
            Ok(true) => Outcome::Attached,
            Ok(false) if displayed => Outcome::Attached,
            Ok(false) => Outcome::Skipped,
            Err(e) => {
                warn!(%id, kind = kind.label(), error = %e, "Failed to store asset");
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::cache::SqliteStore;
    use crate::error::{CatalogError, Result};

    /// Serves fixed bytes per URL; unknown URLs fail like a 404.
    struct FakeFetcher {
        assets: HashMap<String, Vec<u8>>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(assets: &[(&str, &str)]) -> Self {
            Self {
                assets: assets
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.as_bytes().to_vec()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AssetFetcher for FakeFetcher {
        async fn fetch_asset(&self, url: &Url) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.assets
                .get(url.as_str())
                .cloned()
                .ok_or(CatalogError::InvalidResponse(404))
        }
    }

    fn recipe(name: &str, small: &str, large: &str) -> Recipe {
        let mut recipe = Recipe::new(Uuid::new_v4(), "British", name);
        recipe.photo_url_small = small.to_string();
        recipe.photo_url_large = large.to_string();
        recipe
    }

    #[tokio::test]
    async fn test_attaches_to_store_and_state() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let recipes = vec![recipe(
            "Treacle Tart",
            "https://cdn.example.com/treacle/small.jpg",
            "https://cdn.example.com/treacle/large.jpg",
        )];
        store.replace_all(&recipes).await.unwrap();

        let state = Arc::new(RwLock::new(SyncState::default()));
        state.write().await.replace(recipes.clone());

        let fetcher = Arc::new(FakeFetcher::new(&[
            ("https://cdn.example.com/treacle/small.jpg", "small"),
            ("https://cdn.example.com/treacle/large.jpg", "large"),
        ]));
        let cache = AssetCache::new(fetcher, store.clone(), 2).with_state(state.clone());

        let report = cache.cache_assets(&recipes).await;
        assert_eq!(report, AssetReport { attached: 2, skipped: 0, failed: 0 });

        let stored = store.read_all().await.unwrap();
        assert_eq!(stored[0].image_small.as_deref(), Some(&b"small"[..]));
        assert_eq!(stored[0].image_large.as_deref(), Some(&b"large"[..]));

        let displayed = state.read().await;
        assert_eq!(displayed.recipes[0].image_large.as_deref(), Some(&b"large"[..]));
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let recipes = vec![
            recipe("Broken", "not a url", ""),
            recipe(
                "Missing",
                "https://cdn.example.com/missing/small.jpg",
                "https://cdn.example.com/missing/large.jpg",
            ),
            recipe(
                "Good",
                "https://cdn.example.com/good/small.jpg",
                "https://cdn.example.com/good/large.jpg",
            ),
        ];
        store.replace_all(&recipes).await.unwrap();

        let fetcher = Arc::new(FakeFetcher::new(&[
            ("https://cdn.example.com/good/small.jpg", "s"),
            ("https://cdn.example.com/good/large.jpg", "l"),
        ]));
        let cache = AssetCache::new(fetcher.clone(), store.clone(), 1);

        let report = cache.cache_assets(&recipes).await;
        assert_eq!(report, AssetReport { attached: 2, skipped: 2, failed: 2 });
        // Invalid references never reach the network
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);

        let stored = store.read_all().await.unwrap();
        assert!(stored[0].image_small.is_none());
        assert!(stored[1].image_small.is_none());
        assert!(stored[2].image_small.is_some());
        assert!(stored[2].image_large.is_some());
    }

    #[tokio::test]
    async fn test_recipe_removed_before_download_is_skipped() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let gone = recipe(
            "Gone",
            "https://cdn.example.com/gone/small.jpg",
            "https://cdn.example.com/gone/large.jpg",
        );
        let fetcher = Arc::new(FakeFetcher::new(&[
            ("https://cdn.example.com/gone/small.jpg", "s"),
            ("https://cdn.example.com/gone/large.jpg", "l"),
        ]));
        let cache = AssetCache::new(fetcher, store.clone(), 4);

        let report = cache.cache_assets(&[gone]).await;
        assert_eq!(report, AssetReport { attached: 0, skipped: 2, failed: 0 });
        assert!(store.read_all().await.unwrap().is_empty());
    }
}
