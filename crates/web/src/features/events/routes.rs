use axum::{Router, routing::get};

use super::handlers::stream_events;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(stream_events))
}
