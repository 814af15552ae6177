use anyhow::Context;
use careerbridge::config::Config;
use careerbridge::db::Database;
use careerbridge::entities::marketplace_item::CatalogEntry;
use careerbridge::store;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SEED_PATH: &str = "data/marketplace_items.json";

fn load_catalog(path: &str) -> anyhow::Result<Vec<CatalogEntry>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    let entries: Vec<CatalogEntry> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path))?;
    Ok(entries)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // `--force` inserts even when the catalog already has rows
    let force = env::args().any(|a| a == "--force");
    let path = env::var("MARKETPLACE_SEED_PATH").unwrap_or_else(|_| DEFAULT_SEED_PATH.to_string());

    let config = Config::from_env()?;
    let db = Database::new(config.database);
    let conn = db.connect().await?;

    let existing = store::list_marketplace(conn).await?;
    if !existing.is_empty() && !force {
        warn!(count = existing.len(), "Marketplace catalog already populated; nothing to do");
        return Ok(());
    }

    let entries = load_catalog(&path)?;
    info!(path = %path, entries = entries.len(), "Loaded marketplace catalog");

    let inserted = store::insert_catalog(conn, entries).await?;
    info!(inserted, "Marketplace catalog seeded");
    Ok(())
}
