use tokio::net::TcpListener;
use tracing::{error, info, warn};

use reviewhub::config::Settings;
use reviewhub::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting review event hub");

    let settings = Settings::new().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if !settings.auth_enabled() {
        warn!("No user_token configured, API authentication is disabled");
    }

    let addr = settings.addr();
    let state = AppState::new(settings);

    info!("Starting server on http://{}", addr);
    let listener = TcpListener::bind(&addr).await?;
    reviewhub::serve(listener, state).await?;

    Ok(())
}
