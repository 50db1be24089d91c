//! Real-time notification endpoints.
//!
//! The stream endpoint hands the client one hub connection as an SSE
//! response. Dropping the response body (client disconnect) drops the
//! connection handle, which unsubscribes it; the hub's TTL covers the
//! timeout path independently.

use crate::auth::CurrentActor;
use crate::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures::stream::Stream;
use futures::StreamExt;
use serde_json::{json, Value};
use std::convert::Infallible;

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/api/notifications/stream", get(stream_notifications))
        .route("/api/notifications/connected-users", get(connected_users))
}

/// Open a long-lived event stream for the authenticated user.
async fn stream_notifications(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let handle = state.hub.subscribe(actor.id.as_uuid());

    let stream = handle.map(|event| {
        Ok(Event::default()
            .event(event.event)
            .data(event.data.to_string()))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Number of users currently holding at least one live stream.
async fn connected_users(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "count": state.hub.active_user_count() }))
}
