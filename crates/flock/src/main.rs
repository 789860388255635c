//! Headless flocking simulation.

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Flock v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (optional path as the first argument)
    let config = match std::env::args().nth(1) {
        Some(path) => flock::Config::load_from(path)?,
        None => flock::Config::load()?,
    };
    info!("Loaded configuration");
    info!("  Scenario: {:?}", config.simulation.scenario);
    info!("  Border: {}x{}", config.border.width, config.border.height);
    info!("  Leaf capacity: {}", config.index.max_elements);
    info!("  Tick interval: {}ms", config.simulation.tick_interval_ms);

    flock::run(config).await?;

    Ok(())
}
