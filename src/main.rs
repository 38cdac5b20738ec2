use anyhow::Context;
use dotenvy::dotenv;

use agritrace::{config::AppConfig, routes::create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = AppConfig::from_env().context("reading configuration")?;
    let port = config.port;
    log::info!("using backend at {}", config.api_url);

    let state = AppState::new(config).context("building backend client")?;
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    log::info!("AgriTrace dashboard starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
