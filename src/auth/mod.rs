use axum::{
    extract::{Query, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Settings;

/// Authentication context extracted from request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    Authenticated,
    None,
}

impl AuthContext {
    pub fn require_auth(&self) -> Result<(), crate::api::error::ApiError> {
        match self {
            AuthContext::Authenticated => Ok(()),
            AuthContext::None => Err(crate::api::error::ApiError::unauthorized()),
        }
    }
}

/// Query parameters for token authentication
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Token from `Authorization: Bearer ...`, or from a `token` query parameter
/// for EventSource clients that cannot set headers.
fn request_token(request: &Request) -> Option<String> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(query)| query.token)
    })
}

/// Simple token authentication middleware
pub async fn auth_middleware(
    State(settings): State<Settings>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = if !settings.auth_enabled() {
        AuthContext::Authenticated
    } else {
        match request_token(&request) {
            Some(t) if t == settings.user_token => {
                debug!("Token authenticated");
                AuthContext::Authenticated
            }
            Some(_) => {
                warn!("Invalid token provided");
                AuthContext::None
            }
            None => {
                debug!("No token provided");
                AuthContext::None
            }
        }
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}
