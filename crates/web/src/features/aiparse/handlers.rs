use axum::{
    Json,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use storage::dto::score::ParsedScoresResponse;
use utoipa::ToSchema;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

/// Multipart body of the score parsing endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AiParseForm {
    /// Results screenshot
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
    /// JSON array of player names
    players: String,
}

#[utoipa::path(
    post,
    path = "/api/scores/aiparse",
    request_body(content = AiParseForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Scores read from the image", body = ParsedScoresResponse),
        (status = 400, description = "Missing or malformed image or players"),
        (status = 502, description = "The model could not read the image")
    ),
    tag = "scores"
)]
pub async fn parse_scores(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let mut image: Option<Vec<u8>> = None;
    let mut players: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                if field.file_name().is_none() {
                    return Err(WebError::BadRequest("Image must be a file".to_string()));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::BadRequest(format!("Failed to read image: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            Some("players") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| WebError::BadRequest("Players must be a string".to_string()))?;
                players = Some(text);
            }
            _ => {}
        }
    }

    let (Some(image), Some(players)) = (image, players) else {
        return Err(WebError::BadRequest("Missing image or players".to_string()));
    };
    let players = services::parse_players(&players)?;

    let scores = state.score_reader.read_scores(&image, &players).await?;

    Ok(Json(ParsedScoresResponse { scores }).into_response())
}
