use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storage::dto::cup::{CupActionResponse, CupsResponse};
use storage::services::CupToggle;
use utoipa::IntoParams;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CupsParams {
    /// Defaults to the running tournament year.
    pub year: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/cups",
    params(CupsParams),
    responses(
        (status = 200, description = "Cup catalog with the rounds assigned in the year", body = CupsResponse)
    ),
    tag = "cups"
)]
pub async fn list_cups(
    State(state): State<AppState>,
    Query(params): Query<CupsParams>,
) -> Result<Response, WebError> {
    let cups = services::cups_for_year(&state.tournament, params.year).await?;

    Ok(Json(cups).into_response())
}

#[utoipa::path(
    post,
    path = "/api/cups/random",
    responses(
        (status = 200, description = "A random unplayed cup assigned to the next round, or `none_available`", body = CupActionResponse)
    ),
    tag = "cups"
)]
pub async fn random_cup(State(state): State<AppState>) -> Result<Response, WebError> {
    let response = services::random_cup(&state.tournament).await;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/cups/{slug}/toggle",
    params(
        ("slug" = String, Path, description = "Cup slug")
    ),
    responses(
        (status = 200, description = "What selecting the cup would do", body = CupToggle)
    ),
    tag = "cups"
)]
pub async fn toggle_cup(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let toggle = services::toggle_cup(&state.tournament, &slug).await;

    Ok(Json(toggle).into_response())
}

#[utoipa::path(
    post,
    path = "/api/cups/{slug}/assign",
    params(
        ("slug" = String, Path, description = "Cup slug")
    ),
    responses(
        (status = 200, description = "Cup assigned to the next round, or the reason it was not", body = CupActionResponse)
    ),
    tag = "cups"
)]
pub async fn assign_cup(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let response = services::assign_cup(&state.tournament, &slug).await;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/cups/{slug}/unassign",
    params(
        ("slug" = String, Path, description = "Cup slug")
    ),
    responses(
        (status = 200, description = "Latest unscored cup released, or the reason it was not", body = CupActionResponse)
    ),
    tag = "cups"
)]
pub async fn unassign_cup(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let response = services::unassign_cup(&state.tournament, &slug).await;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/cups/reset",
    responses(
        (status = 200, description = "Every assignment of the running year removed", body = CupActionResponse)
    ),
    tag = "cups"
)]
pub async fn reset_all_cups(State(state): State<AppState>) -> Result<Response, WebError> {
    let response = services::reset_all_cups(&state.tournament).await;

    Ok(Json(response).into_response())
}
