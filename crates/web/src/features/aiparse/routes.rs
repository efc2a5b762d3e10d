use axum::{Router, routing::post};

use super::handlers::parse_scores;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/aiparse", post(parse_scores))
}
