use axum::{Router, routing::get};

use super::handlers::{get_progression, get_standings, list_live_scores, list_years};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_live_scores))
        .route("/standings", get(get_standings))
        .route("/years", get(list_years))
        .route("/progression", get(get_progression))
}
