use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::assets::{AssetCache, AssetReport};
use super::state::{SyncPhase, SyncState};
use crate::api::{AssetFetcher, RecipeSource};
use crate::cache::{age, RecipeStore};
use crate::error::{CatalogError, Result};
use crate::filter::{filter_recipes, sort_by_name};
use crate::models::{Recipe, RecipeRow};

/// Result of a `refresh` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Another refresh was already running; nothing was done.
    Skipped,
    /// The store now holds exactly these recipes, in network order.
    Refreshed(Vec<Recipe>),
}

/// Clears an in-progress flag on every exit path, including panics and
/// dropped futures.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Counts one in-flight load for as long as it lives.
struct LoadGuard<'a>(&'a AtomicUsize);

impl<'a> LoadGuard<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self(count)
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Coordinates the remote source, the local store and the displayed
/// collection.
///
/// All mutation goes through these methods. The collection and error
/// message live behind one lock; the in-progress flags are atomics so they
/// can be released from `Drop`.
///
/// `load`, `refresh` and `get_from_network` each hold `op_lock` from their
/// first read or fetch until the result is installed in memory, so the
/// collection always reflects the last operation to finish against the
/// store.
pub struct SyncEngine {
    source: Arc<dyn RecipeSource>,
    store: Arc<dyn RecipeStore>,
    assets: Option<AssetCache>,
    state: Arc<RwLock<SyncState>>,
    op_lock: Mutex<()>,
    refreshing: AtomicBool,
    loading: AtomicUsize,
    asset_task: Mutex<Option<JoinHandle<AssetReport>>>,
}

impl SyncEngine {
    pub fn new(source: Arc<dyn RecipeSource>, store: Arc<dyn RecipeStore>) -> Self {
        Self {
            source,
            store,
            assets: None,
            state: Arc::new(RwLock::new(SyncState::default())),
            op_lock: Mutex::new(()),
            refreshing: AtomicBool::new(false),
            loading: AtomicUsize::new(0),
            asset_task: Mutex::new(None),
        }
    }

    /// Enable photo caching after each successful refresh.
    pub fn with_asset_cache(mut self, fetcher: Arc<dyn AssetFetcher>, max_concurrent: usize) -> Self {
        let cache = AssetCache::new(fetcher, Arc::clone(&self.store), max_concurrent)
            .with_state(Arc::clone(&self.state));
        self.assets = Some(cache);
        self
    }

    // =========================================================================
    // Load / Refresh
    // =========================================================================

    /// Populate the collection from the local store, sorted by name.
    ///
    /// An empty store falls back to `get_from_network`. Failures are
    /// recorded in the error message and leave the collection untouched.
    pub async fn load(&self) {
        let _guard = LoadGuard::enter(&self.loading);
        let _op = self.op_lock.lock().await;

        match self.store.read_all().await {
            Ok(recipes) if recipes.is_empty() => {
                info!("Local store is empty, loading from network");
                // Failure is already recorded
                let _ = self.network_into_memory().await;
            }
            Ok(mut recipes) => {
                sort_by_name(&mut recipes);
                info!(count = recipes.len(), "Loaded recipes from local store");
                self.state.write().await.replace(recipes);
            }
            Err(e) => self.record_error("load", &e).await,
        }
    }

    /// Fetch the catalog, replace the local store, and update the collection.
    ///
    /// A call made while another refresh is running returns
    /// `RefreshOutcome::Skipped` immediately. On failure the store and the
    /// collection keep their previous contents, the error message is set,
    /// and the error is returned.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in progress, skipping");
            return Ok(RefreshOutcome::Skipped);
        }
        let _guard = FlagGuard(&self.refreshing);

        info!("Starting catalog refresh");
        let result = {
            let _op = self.op_lock.lock().await;
            self.fetch_and_persist().await
        };
        match result {
            Ok(fetched) => {
                info!(count = fetched.len(), "Catalog refresh complete");
                self.spawn_asset_caching(fetched.clone()).await;
                Ok(RefreshOutcome::Refreshed(fetched))
            }
            Err(e) => {
                self.record_error("refresh", &e).await;
                Err(e)
            }
        }
    }

    async fn fetch_and_persist(&self) -> Result<Vec<Recipe>> {
        let fetched = self.source.fetch_all().await?;
        self.store.replace_all(&fetched).await?;

        let mut displayed = fetched.clone();
        sort_by_name(&mut displayed);
        self.state.write().await.replace(displayed);
        Ok(fetched)
    }

    /// Fetch the catalog into memory only. The local store is not touched.
    pub async fn get_from_network(&self) -> Result<Vec<Recipe>> {
        let _op = self.op_lock.lock().await;
        self.network_into_memory().await
    }

    /// Caller holds `op_lock`.
    async fn network_into_memory(&self) -> Result<Vec<Recipe>> {
        match self.source.fetch_all().await {
            Ok(fetched) => {
                let mut displayed = fetched.clone();
                sort_by_name(&mut displayed);
                debug!(count = displayed.len(), "Showing recipes from network");
                self.state.write().await.replace(displayed);
                Ok(fetched)
            }
            Err(e) => {
                self.record_error("network fetch", &e).await;
                Err(e)
            }
        }
    }

    async fn record_error(&self, operation: &str, e: &CatalogError) {
        error!(operation, error = %e, "Recipe sync failed");
        self.state.write().await.error_message = Some(e.user_message());
    }

    // =========================================================================
    // Background Asset Caching
    // =========================================================================

    async fn spawn_asset_caching(&self, recipes: Vec<Recipe>) {
        let Some(cache) = self.assets.clone() else {
            return;
        };
        if recipes.is_empty() {
            return;
        }

        let handle = tokio::spawn(async move { cache.cache_assets(&recipes).await });

        // An earlier batch keeps running detached
        if self.asset_task.lock().await.replace(handle).is_some() {
            debug!("Previous asset caching still tracked, detaching it");
        }
    }

    /// Wait for the asset caching started by the latest refresh.
    ///
    /// Returns `None` when nothing is pending. Asset failures never surface
    /// here; they are only counted in the report.
    pub async fn wait_for_assets(&self) -> Option<AssetReport> {
        let handle = self.asset_task.lock().await.take()?;
        match handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, "Asset caching task failed");
                None
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> SyncPhase {
        if self.refreshing.load(Ordering::Acquire) {
            SyncPhase::Refreshing
        } else if self.loading.load(Ordering::Acquire) > 0 {
            SyncPhase::Loading
        } else {
            SyncPhase::Idle
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Snapshot of the displayed collection
    pub async fn recipes(&self) -> Vec<Recipe> {
        self.state.read().await.recipes.clone()
    }

    /// Displayed recipes matching `query` on name or cuisine
    pub async fn filtered(&self, query: &str) -> Vec<Recipe> {
        filter_recipes(&self.state.read().await.recipes, query)
    }

    /// List rows for the displayed recipes matching `query`
    pub async fn rows(&self, query: &str) -> Vec<RecipeRow> {
        self.filtered(query).await.iter().map(RecipeRow::from).collect()
    }

    pub async fn recipe(&self, id: Uuid) -> Option<Recipe> {
        self.state
            .read()
            .await
            .recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub async fn error_message(&self) -> Option<String> {
        self.state.read().await.error_message.clone()
    }

    /// Dismiss the current error message
    pub async fn clear_error(&self) {
        self.state.write().await.error_message = None;
    }

    /// Age of the stored catalog for display, `None` if never synced
    pub async fn cache_age(&self) -> Option<String> {
        match self.store.last_synced().await {
            Ok(synced_at) => synced_at.map(age::age_display),
            Err(e) => {
                debug!(error = %e, "Failed to read sync time for age display");
                None
            }
        }
    }

    /// Whether the stored catalog should be refreshed
    pub async fn is_stale(&self) -> bool {
        match self.store.last_synced().await {
            Ok(synced_at) => age::is_stale(synced_at),
            Err(e) => {
                debug!(error = %e, "Failed to read sync time for staleness check");
                true
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
