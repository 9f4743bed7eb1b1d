//! Bootstrap binary: prepares the marketplace database and storage
//! directories so an interface layer (HTTP, CLI, or otherwise) can be
//! pointed at them.

use dotenvy::dotenv;
use och_marketplace::config::{app::AppConfig, database};
use och_marketplace::errors::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = AppConfig::load()?;
    info!(database_url = %app_config.database_url, "Loaded application configuration.");

    // 4. Initialize database schema and indexes
    let db = database::create_connection(&app_config.database_url).await?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Ensure the payment-slip storage root exists
    std::fs::create_dir_all(&app_config.slip_dir)?;
    info!(slip_dir = %app_config.slip_dir, "Slip storage ready.");

    info!("Marketplace core bootstrap complete.");
    Ok(())
}
