use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use storage::store::ChangeEvent;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use crate::state::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// SSE frame for a store change. A lagging client gets a `resync` frame and
/// should reload everything.
pub fn change_frame(change: Result<ChangeEvent, BroadcastStreamRecvError>) -> Option<Event> {
    match change {
        Ok(event) => Event::default().event("change").json_data(event).ok(),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Event stream client lagged");
            Some(Event::default().event("resync").data(skipped.to_string()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Server-sent table change notifications", content_type = "text/event-stream", body = ChangeEvent)
    ),
    tag = "events"
)]
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let changes = state.tournament.store().subscribe();
    tracing::debug!("Event stream client connected");

    let stream = BroadcastStream::new(changes).filter_map(|change| change_frame(change).map(Ok));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
