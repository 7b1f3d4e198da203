//! Live review and import notifications for the code review backend.
//!
//! The [`hub`] module holds the in-process broadcast hubs; [`api`] turns a
//! hub subscription into a server-sent event stream per client.

pub mod api;
pub mod auth;
pub mod config;
pub mod hub;

use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::hub::{Hub, ImportEvent, ReviewEvent};

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum ReviewHubError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReviewHubError>;

// ============================================================================
// Application state
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub reviews: Hub<ReviewEvent>,
    pub imports: Hub<ImportEvent>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State wired to the process-wide hubs, so background workers using
    /// [`hub::publish_review`] and [`hub::publish_import`] reach HTTP clients.
    pub fn new(settings: Settings) -> Self {
        Self::with_hubs(settings, hub::review_hub().clone(), hub::import_hub().clone())
    }

    pub fn with_hubs(
        settings: Settings,
        reviews: Hub<ReviewEvent>,
        imports: Hub<ImportEvent>,
    ) -> Self {
        Self {
            settings,
            reviews,
            imports,
            started_at: Utc::now(),
        }
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}

impl FromRef<AppState> for Hub<ReviewEvent> {
    fn from_ref(state: &AppState) -> Self {
        state.reviews.clone()
    }
}

impl FromRef<AppState> for Hub<ImportEvent> {
    fn from_ref(state: &AppState) -> Self {
        state.imports.clone()
    }
}

/// Serve the API on `listener` until the process stops.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!(addr = %listener.local_addr()?, "serving event streams");
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
