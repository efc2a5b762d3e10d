use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::handlers::{
    add_player, confirm_round, import_scores, list_players, randomize_teams, remove_player,
    reset_all, reset_player_team, update_score,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_players))
        .route("/", post(add_player))
        .route("/randomize", post(randomize_teams))
        .route("/reset", post(reset_all))
        .route("/confirm", post(confirm_round))
        .route("/scores", post(import_scores))
        .route("/:uuid", delete(remove_player))
        .route("/:uuid/score", put(update_score))
        .route("/:uuid/reset", post(reset_player_team))
}
