use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::dto::score::{
    LiveScoresResponse, ProgressionParams, ProgressionResponse, StandingsParams, YearsResponse,
};
use storage::services::YearView;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/scores",
    responses(
        (status = 200, description = "Live ranking for the configured scope", body = LiveScoresResponse)
    ),
    tag = "scores"
)]
pub async fn list_live_scores(State(state): State<AppState>) -> Result<Response, WebError> {
    let scores = services::live_scores(&state.tournament).await;

    Ok(Json(scores).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scores/standings",
    params(StandingsParams),
    responses(
        (status = 200, description = "Score grid of a year with medals and year-over-year deltas", body = YearView)
    ),
    tag = "scores"
)]
pub async fn get_standings(
    State(state): State<AppState>,
    Query(params): Query<StandingsParams>,
) -> Result<Response, WebError> {
    let view = services::standings(&state.tournament, params.year, params.mode).await?;

    Ok(Json(view).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scores/years",
    responses(
        (status = 200, description = "Years with recorded scores", body = YearsResponse)
    ),
    tag = "scores"
)]
pub async fn list_years(State(state): State<AppState>) -> Result<Response, WebError> {
    let years = services::years(&state.tournament).await?;

    Ok(Json(years).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scores/progression",
    params(ProgressionParams),
    responses(
        (status = 200, description = "Per-round place or score series for every player", body = ProgressionResponse)
    ),
    tag = "scores"
)]
pub async fn get_progression(
    State(state): State<AppState>,
    Query(params): Query<ProgressionParams>,
) -> Result<Response, WebError> {
    let response = services::progression_for_year(&state.tournament, params.year, params.view).await?;

    Ok(Json(response).into_response())
}
