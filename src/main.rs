use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use quickbooks_connect::quickbooks::QuickBooksClient;
use quickbooks_connect::{api, providers, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickbooks_connect=info,tower_http=info".into()),
        )
        .init();

    // Load config
    let config = Config::from_env()?;
    info!(
        "quickbooks-connect v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.environment.as_str()
    );

    // Initialize components
    let provider = providers::from_config(&config)?;
    let accounting = QuickBooksClient::new(config.http_timeout)?;

    let state: SharedState = Arc::new(AppState::new(
        config.clone(),
        Box::new(provider),
        Box::new(accounting),
    ));

    // Build router
    let app = api::router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on {}", config.local_url());
    info!("OAuth callback URL: {}", config.redirect_uri);
    axum::serve(listener, app).await?;

    Ok(())
}
