use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{
    assign_cup, list_cups, random_cup, reset_all_cups, toggle_cup, unassign_cup,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cups))
        .route("/random", post(random_cup))
        .route("/reset", post(reset_all_cups))
        .route("/:slug/toggle", get(toggle_cup))
        .route("/:slug/assign", post(assign_cup))
        .route("/:slug/unassign", post(unassign_cup))
}
