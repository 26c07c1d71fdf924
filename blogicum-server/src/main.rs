use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;
    info!(http_addr = %settings.http_addr, "starting blogicum server");

    let pool = create_pool(&settings).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(pool, &settings)?;
    server::run_http(&settings, state).await
}
