use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use futures_util::stream::{self, Stream};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::AuthContext;
use crate::config::Settings;
use crate::hub::{Hub, HubEvent, ImportEvent, ReviewEvent, Subscription};

/// One client's live feed. Dropping it (client disconnect) unsubscribes.
struct Connection<E> {
    subscription: Subscription<E>,
}

impl<E> Drop for Connection<E> {
    fn drop(&mut self) {
        info!(
            identity = %self.subscription.identity(),
            "client disconnected from event stream"
        );
    }
}

fn to_sse<E: HubEvent + Serialize>(event: &E) -> Event {
    match Event::default().event(E::KIND).json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            warn!(kind = E::KIND, error = %e, "failed to serialize event");
            Event::default().event("error").data("failed to serialize event")
        }
    }
}

/// Subscribe a fresh identity to `hub` and stream its events as SSE until
/// the client goes away.
pub fn event_stream<E>(
    hub: Hub<E>,
    keep_alive: Duration,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    E: HubEvent + Serialize,
{
    let identity = Uuid::new_v4().to_string();
    let subscription = hub.subscribe_guarded(identity.clone());

    info!(
        kind = E::KIND,
        identity = %identity,
        clients = hub.client_count(),
        "client connected to event stream"
    );

    let stream = stream::unfold(Connection { subscription }, |mut conn| async move {
        let event = conn.subscription.recv().await?;
        Some((Ok::<_, Infallible>(to_sse(&event)), conn))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(keep_alive))
}

fn keep_alive(settings: &Settings) -> Duration {
    Duration::from_secs(settings.keep_alive_secs.max(1))
}

/// GET /api/events/reviews - Live review status feed
pub async fn review_stream(
    Extension(auth): Extension<AuthContext>,
    State(settings): State<Settings>,
    State(hub): State<Hub<ReviewEvent>>,
) -> Result<Response, ApiError> {
    auth.require_auth()?;
    Ok(event_stream(hub, keep_alive(&settings)).into_response())
}

/// GET /api/events/imports - Live commit import feed
pub async fn import_stream(
    Extension(auth): Extension<AuthContext>,
    State(settings): State<Settings>,
    State(hub): State<Hub<ImportEvent>>,
) -> Result<Response, ApiError> {
    auth.require_auth()?;
    Ok(event_stream(hub, keep_alive(&settings)).into_response())
}
