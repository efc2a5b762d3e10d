use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::player::{
    AddPlayerRequest, ConfirmRoundResponse, ImportScoresRequest, ImportScoresResponse,
    RandomizeTeamsRequest, RemovePlayerResponse, RosterResponse, UpdateScoreRequest,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/players",
    responses(
        (status = 200, description = "Roster of the running tournament", body = RosterResponse)
    ),
    tag = "players"
)]
pub async fn list_players(State(state): State<AppState>) -> Result<Response, WebError> {
    let roster = services::roster(&state.tournament, true).await;

    Ok(Json(roster).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players",
    request_body = AddPlayerRequest,
    responses(
        (status = 200, description = "Roster after the insert; `applied` is false when the store refused it", body = RosterResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "players"
)]
pub async fn add_player(
    State(state): State<AppState>,
    Json(req): Json<AddPlayerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let roster = services::add_player(&state.tournament, &req.name).await;

    Ok(Json(roster).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/players/{uuid}",
    params(
        ("uuid" = Uuid, Path, description = "Player id")
    ),
    responses(
        (status = 200, description = "Removal outcome with the resulting roster", body = RemovePlayerResponse)
    ),
    tag = "players"
)]
pub async fn remove_player(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::remove_player(&state.tournament, uuid).await;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    put,
    path = "/api/players/{uuid}/score",
    params(
        ("uuid" = Uuid, Path, description = "Player id")
    ),
    request_body = UpdateScoreRequest,
    responses(
        (status = 200, description = "Roster after the update", body = RosterResponse)
    ),
    tag = "players"
)]
pub async fn update_score(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Json(req): Json<UpdateScoreRequest>,
) -> Result<Response, WebError> {
    let roster = services::update_score(&state.tournament, uuid, req.score).await;

    Ok(Json(roster).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players/{uuid}/reset",
    params(
        ("uuid" = Uuid, Path, description = "Player id")
    ),
    responses(
        (status = 200, description = "Player taken off their team", body = RosterResponse)
    ),
    tag = "players"
)]
pub async fn reset_player_team(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Result<Response, WebError> {
    let roster = services::reset_player_team(&state.tournament, uuid).await;

    Ok(Json(roster).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players/randomize",
    request_body = RandomizeTeamsRequest,
    responses(
        (status = 200, description = "Roster dealt into new teams", body = RosterResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "players"
)]
pub async fn randomize_teams(
    State(state): State<AppState>,
    Json(req): Json<RandomizeTeamsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let roster = services::randomize_teams(&state.tournament, req.team_count).await;

    Ok(Json(roster).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players/reset",
    responses(
        (status = 200, description = "Every team and score cleared", body = RosterResponse)
    ),
    tag = "players"
)]
pub async fn reset_all(State(state): State<AppState>) -> Result<Response, WebError> {
    let roster = services::reset_all(&state.tournament).await;

    Ok(Json(roster).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players/confirm",
    responses(
        (status = 200, description = "`saved` with the round written, `reset_pending` when the round is stored but the roster was not cleared, `rejected` or `failed` otherwise", body = ConfirmRoundResponse)
    ),
    tag = "players"
)]
pub async fn confirm_round(State(state): State<AppState>) -> Result<Response, WebError> {
    let response = services::confirm_round(&state.tournament).await;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players/scores",
    request_body = ImportScoresRequest,
    responses(
        (status = 200, description = "Parsed scores applied to the matching players", body = ImportScoresResponse),
        (status = 400, description = "Validation error"),
        (status = 422, description = "No parsed name matches an assigned player")
    ),
    tag = "players"
)]
pub async fn import_scores(
    State(state): State<AppState>,
    Json(req): Json<ImportScoresRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let response = services::import_scores(&state.tournament, &req.scores).await?;

    Ok(Json(response).into_response())
}
