use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiError;
use crate::auth::AuthContext;
use crate::hub::{Hub, HubEvent, ImportEvent, ReviewEvent, ReviewStatus};
use crate::AppState;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PublishReviewRequest {
    pub review_id: u64,
    pub project_id: u64,
    pub commit_hash: String,
    pub status: ReviewStatus,
    pub score: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishImportRequest {
    pub project_id: u64,
    pub project_name: String,
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub skipped: u64,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishResponse {
    /// Subscribers registered just before publishing
    pub clients: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HubStatus {
    pub clients: usize,
    pub capacity: usize,
    pub dropped: u64,
}

impl<E> From<&Hub<E>> for HubStatus {
    fn from(hub: &Hub<E>) -> Self {
        Self {
            clients: hub.client_count(),
            capacity: hub.capacity(),
            dropped: hub.dropped_count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub reviews: HubStatus,
    pub imports: HubStatus,
    pub started_at: DateTime<Utc>,
}

// ============================================================================
// HTTP Handlers
// ============================================================================

fn accept<E: HubEvent>(hub: &Hub<E>, event: E) -> (StatusCode, Json<PublishResponse>) {
    let clients = hub.client_count();
    hub.publish(event);
    info!(kind = E::KIND, clients, "event published");
    (StatusCode::ACCEPTED, Json(PublishResponse { clients }))
}

/// POST /api/events/reviews - Publish a review status change
pub async fn publish_review(
    Extension(auth): Extension<AuthContext>,
    State(hub): State<Hub<ReviewEvent>>,
    Json(req): Json<PublishReviewRequest>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    auth.require_auth()?;

    if req.commit_hash.trim().is_empty() {
        return Err(ApiError::bad_request("commit_hash must not be empty"));
    }

    let event = ReviewEvent::new(
        req.review_id,
        req.project_id,
        req.commit_hash,
        req.status,
        req.score,
        req.error,
    );
    Ok(accept(&hub, event))
}

/// POST /api/events/imports - Publish a commit import completion
pub async fn publish_import(
    Extension(auth): Extension<AuthContext>,
    State(hub): State<Hub<ImportEvent>>,
    Json(req): Json<PublishImportRequest>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    auth.require_auth()?;

    let event = ImportEvent::new(
        req.project_id,
        req.project_name,
        req.imported,
        req.skipped,
        req.error,
    );
    Ok(accept(&hub, event))
}

/// GET /api/events/status - Subscriber counts and drop totals per hub
pub async fn get_status(
    Extension(auth): Extension<AuthContext>,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    auth.require_auth()?;

    Ok(Json(StatusResponse {
        reviews: HubStatus::from(&state.reviews),
        imports: HubStatus::from(&state.imports),
        started_at: state.started_at,
    }))
}
