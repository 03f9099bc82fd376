//! Catalog synchronization.
//!
//! `SyncEngine` owns the in-memory recipe collection and coordinates the
//! remote source, the local store and the asset cache:
//!
//! - `load`: local store only, sorted by name, network fallback when empty
//! - `refresh`: fetch, replace the store, update memory, then cache photos
//!   in the background
//! - `get_from_network`: fetch into memory without persisting

pub mod assets;
pub mod engine;
pub mod state;

pub use assets::{AssetCache, AssetReport, DEFAULT_MAX_CONCURRENT_DOWNLOADS};
pub use engine::{RefreshOutcome, SyncEngine};
pub use state::{SyncPhase, SyncState};
