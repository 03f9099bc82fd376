//! recipecache - a command-line recipe catalog that works offline.
//!
//! Recipes are synced from the catalog endpoint into a local SQLite store,
//! so `list` and `show` keep working without a connection.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use recipecache_core::config::ENDPOINT_ENV;
use recipecache_core::utils::truncate_string;
use recipecache_core::{Config, RecipeClient, RefreshOutcome, SqliteStore, SyncEngine};

// ============================================================================
// Constants
// ============================================================================

/// Column widths for `list` output
const NAME_WIDTH: usize = 36;
const CUISINE_WIDTH: usize = 14;

#[derive(Parser)]
#[command(name = "recipecache", version, about = "Browse a recipe catalog, online or off")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored recipes sorted by name
    List {
        /// Only show recipes whose name or cuisine contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Fetch the catalog and replace the local store
    Refresh {
        /// Skip downloading recipe photos
        #[arg(long)]
        no_assets: bool,
    },
    /// Show one recipe in detail
    Show {
        /// Recipe id
        id: Uuid,
    },
    /// Show store location, size and age
    Status,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let config = Config::load_or_create()
        .context("Failed to load configuration")?
        .with_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
    info!(endpoint = %config.endpoint, "recipecache starting");

    let cache_assets = match &cli.command {
        Command::Refresh { no_assets } => config.cache_assets && !no_assets,
        _ => false,
    };
    let db_path = config.database_path()?;
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open recipe store at {}", db_path.display()))?;
    let engine = build_engine(&config, store.clone(), cache_assets)?;

    match cli.command {
        Command::List { search } => list(&engine, search.as_deref().unwrap_or("")).await,
        Command::Refresh { .. } => refresh(&engine).await,
        Command::Show { id } => show(&engine, id).await,
        Command::Status => {
            for line in status_report(&engine, &store, &config).await? {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

fn build_engine(config: &Config, store: SqliteStore, cache_assets: bool) -> Result<SyncEngine> {
    let client = Arc::new(RecipeClient::new(&config.endpoint, config.request_timeout())?);

    let engine = SyncEngine::new(client.clone(), Arc::new(store));
    if cache_assets {
        Ok(engine.with_asset_cache(client, config.max_concurrent_downloads))
    } else {
        Ok(engine)
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn list(engine: &SyncEngine, query: &str) -> Result<()> {
    engine.load().await;
    report_error(engine).await;

    let rows = engine.rows(query).await;
    if rows.is_empty() {
        if query.is_empty() {
            println!("No recipes available. Run `recipecache refresh` to fetch the catalog.");
        } else {
            println!("No recipes match \"{}\".", query);
        }
        return Ok(());
    }

    for row in &rows {
        println!(
            "{:<name_w$}  {:<cuisine_w$}  {}",
            truncate_string(&row.name, NAME_WIDTH),
            truncate_string(&row.display_cuisine(), CUISINE_WIDTH),
            row.id,
            name_w = NAME_WIDTH,
            cuisine_w = CUISINE_WIDTH,
        );
    }

    if engine.is_stale().await {
        eprintln!("Stored catalog is out of date. Run `recipecache refresh` to update.");
    }
    Ok(())
}

async fn refresh(engine: &SyncEngine) -> Result<()> {
    let outcome = engine.refresh().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match outcome {
        RefreshOutcome::Skipped => println!("A refresh is already running."),
        RefreshOutcome::Refreshed(recipes) => {
            println!("Fetched {} recipes.", recipes.len());
            if let Some(report) = engine.wait_for_assets().await {
                println!(
                    "Cached {} photos ({} skipped, {} failed).",
                    report.attached, report.skipped, report.failed
                );
                if report.failed > 0 {
                    warn!(failed = report.failed, "Some photos could not be cached");
                }
            }
        }
    }
    Ok(())
}

async fn show(engine: &SyncEngine, id: Uuid) -> Result<()> {
    engine.load().await;
    report_error(engine).await;

    let recipe = engine
        .recipe(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("No recipe with id {}", id))?;
    let row = recipe.row();

    println!("{}", recipe.name);
    println!("  Cuisine:  {}", row.display_cuisine());
    print_field("Source", &recipe.source_url);
    print_field("YouTube", &recipe.youtube_url);
    print_field("Photo", &recipe.photo_url_large);
    match (&recipe.image_small, &recipe.image_large) {
        (None, None) => println!("  Photos:   not cached"),
        (small, large) => println!(
            "  Photos:   small {}, large {}",
            cached_size(small.as_deref()),
            cached_size(large.as_deref())
        ),
    }
    Ok(())
}

/// Describe the local store. Reads the store directly and never touches
/// the network.
async fn status_report(engine: &SyncEngine, store: &SqliteStore, config: &Config) -> Result<Vec<String>> {
    let count = store.count().await.context("Failed to count stored recipes")?;
    let synced = match engine.cache_age().await {
        Some(age) => {
            let stale = if engine.is_stale().await { " (stale)" } else { "" };
            format!("{}{}", age, stale)
        }
        None => "never".to_string(),
    };

    Ok(vec![
        format!("Endpoint:  {}", config.endpoint),
        format!("Store:     {}", config.database_path()?.display()),
        format!("Recipes:   {}", count),
        format!("Synced:    {}", synced),
        format!("State:     {}", engine.phase().label()),
    ])
}

// ============================================================================
// Helpers
// ============================================================================

/// Print the engine's error banner to stderr, then dismiss it.
async fn report_error(engine: &SyncEngine) {
    if let Some(message) = engine.error_message().await {
        eprintln!("Error: {}", message);
        engine.clear_error().await;
    }
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("  {:<9} {}", format!("{}:", label), value);
    }
}

fn cached_size(payload: Option<&[u8]>) -> String {
    match payload {
        Some(bytes) => format!("{} KB", bytes.len().div_ceil(1024)),
        None => "missing".to_string(),
    }
}
