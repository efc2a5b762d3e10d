use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{aiparse, cups, events, players, scores};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::players::handlers::list_players,
        crate::features::players::handlers::add_player,
        crate::features::players::handlers::remove_player,
        crate::features::players::handlers::update_score,
        crate::features::players::handlers::reset_player_team,
        crate::features::players::handlers::randomize_teams,
        crate::features::players::handlers::reset_all,
        crate::features::players::handlers::confirm_round,
        crate::features::players::handlers::import_scores,
        crate::features::cups::handlers::list_cups,
        crate::features::cups::handlers::random_cup,
        crate::features::cups::handlers::toggle_cup,
        crate::features::cups::handlers::assign_cup,
        crate::features::cups::handlers::unassign_cup,
        crate::features::cups::handlers::reset_all_cups,
        crate::features::scores::handlers::list_live_scores,
        crate::features::scores::handlers::get_standings,
        crate::features::scores::handlers::list_years,
        crate::features::scores::handlers::get_progression,
        crate::features::aiparse::handlers::parse_scores,
        crate::features::events::handlers::stream_events,
    ),
    components(
        schemas(
            storage::dto::player::AddPlayerRequest,
            storage::dto::player::UpdateScoreRequest,
            storage::dto::player::RandomizeTeamsRequest,
            storage::dto::player::ImportScoresRequest,
            storage::dto::player::RosterResponse,
            storage::dto::player::RemovePlayerResponse,
            storage::dto::player::ConfirmRoundResponse,
            storage::dto::player::ImportScoresResponse,
            storage::dto::cup::CupsResponse,
            storage::dto::cup::CupActionResponse,
            storage::dto::score::LiveScoresResponse,
            storage::dto::score::YearsResponse,
            storage::dto::score::ProgressionResponse,
            storage::dto::score::ParsedScoresResponse,
            storage::models::Player,
            storage::models::Cup,
            storage::services::PlayerScore,
            storage::services::Medal,
            storage::services::ComparisonMode,
            storage::services::ProgressionView,
            storage::services::ProgressionSeries,
            storage::services::Removal,
            storage::services::Confirmation,
            storage::services::CupRejection,
            storage::services::CupToggle,
            storage::services::ScoreGrid,
            storage::services::YearView,
            storage::services::ScoreMatch,
            storage::services::MatchedScore,
            storage::services::grid::RoundHeader,
            storage::services::grid::RoundCell,
            storage::services::grid::StandingRow,
            storage::store::ChangeEvent,
            storage::store::Table,
            storage::store::ChangeKind,
            crate::features::aiparse::handlers::AiParseForm,
        )
    ),
    tags(
        (name = "players", description = "Roster, teams and round confirmation"),
        (name = "cups", description = "Cup to round assignments"),
        (name = "scores", description = "Standings, history and score parsing"),
        (name = "events", description = "Live change notifications"),
    )
)]
pub struct ApiDoc;

/// Full application router: API, Swagger UI, CORS and upload limit.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .nest("/players", players::routes::routes())
        .nest("/cups", cups::routes::routes())
        .nest(
            "/scores",
            scores::routes::routes().merge(aiparse::routes::routes()),
        )
        .nest("/events", events::routes::routes());

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use ::aiparse::{AiParseError, ScoreReader};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use storage::models::{Player, ScoreScope};
    use storage::services::Tournament;
    use storage::store::MemoryStore;
    use tower::ServiceExt;

    use super::*;

    const YEAR: i32 = 2025;

    /// Returns fixed scores for whichever players were asked for.
    struct FixedScores(u32);

    #[async_trait::async_trait]
    impl ScoreReader for FixedScores {
        async fn read_scores(
            &self,
            image: &[u8],
            players: &[String],
        ) -> ::aiparse::Result<BTreeMap<String, u32>> {
            if image.is_empty() {
                return Err(AiParseError::EmptyImage);
            }
            Ok(players.iter().map(|p| (p.clone(), self.0)).collect())
        }
    }

    async fn app_with(players: Vec<Player>) -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.seed(players, vec![], vec![]).await;
        let tournament = Tournament::load(store.clone(), YEAR, ScoreScope::Year(YEAR)).await;
        let state = AppState::new(tournament, Arc::new(FixedScores(12)));
        (router(state, 1024 * 1024), store)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let boundary = "kartboundary";
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            match file_name {
                Some(file) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                        name, file
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/scores/aiparse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_player_validation() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send(&app, json_request("POST", "/api/players", json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");

        let (status, body) =
            send(&app, json_request("POST", "/api/players", json!({"name": " King Boo "}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);
        assert_eq!(body["players"][0]["name"], "King Boo");
    }

    #[tokio::test]
    async fn test_store_failure_reported_as_not_applied() {
        let (app, store) = app_with(vec![]).await;
        store.set_offline(true);

        let (status, body) = send(&app, json_request("POST", "/api/players", json!({"name": "Lakitu"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
        assert_eq!(body["players"], json!([]));
    }

    #[tokio::test]
    async fn test_round_through_the_api() {
        let (app, _) = app_with(vec![Player::new("Mario"), Player::new("Luigi")]).await;

        let (_, body) = send(&app, json_request("POST", "/api/players/randomize", json!({"team_count": 2}))).await;
        assert_eq!(body["teams"], json!([1, 2]));
        assert_eq!(body["can_confirm"], false);

        let (_, body) = send(&app, json_request("POST", "/api/cups/star/assign", json!({}))).await;
        assert_eq!(body["applied"], true);
        assert_eq!(body["cup"]["round"], 1);

        let (_, body) = send(
            &app,
            json_request("POST", "/api/players/scores", json!({"scores": {"mario": 8, "LUIGI": 4}})),
        )
        .await;
        assert_eq!(body["unmatched"], json!([]));
        assert_eq!(body["roster"]["can_confirm"], true);

        let (_, body) = send(&app, json_request("POST", "/api/players/confirm", json!({}))).await;
        assert_eq!(body["outcome"], "saved");
        assert_eq!(body["round"], 1);
        assert_eq!(body["roster"]["teams"], json!([]));

        let (status, body) = send(&app, get("/api/scores/standings")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grid"]["rounds"][0]["cup"]["cup"], "star");
        assert_eq!(body["grid"]["rows"][0]["name"], "Mario");
        assert_eq!(body["grid"]["rows"][0]["medal"], "gold");

        let (_, body) = send(&app, json_request("POST", "/api/cups/star/unassign", json!({}))).await;
        assert_eq!(body["applied"], false);
        assert_eq!(body["reason"], "scored");

        let (_, body) = send(&app, get("/api/scores/years")).await;
        assert_eq!(body["years"], json!([YEAR]));
    }

    #[tokio::test]
    async fn test_import_without_matches() {
        let (app, _) = app_with(vec![Player::new("Mario")]).await;
        send(&app, json_request("POST", "/api/players/randomize", json!({"team_count": 1}))).await;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/players/scores", json!({"scores": {"Bowser Jr.": 3}})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["unmatched"], json!(["Bowser Jr."]));
    }

    #[tokio::test]
    async fn test_aiparse_form_errors() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send(&app, multipart_request(&[("players", None, b"[\"Mario\"]")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing image or players");

        let (status, body) = send(
            &app,
            multipart_request(&[("image", None, b"png"), ("players", None, b"[\"Mario\"]")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Image must be a file");

        let (status, body) = send(
            &app,
            multipart_request(&[("image", Some("race.png"), b"png"), ("players", None, b"Mario")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid players JSON");
    }

    #[tokio::test]
    async fn test_aiparse_returns_scores() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send(
            &app,
            multipart_request(&[
                ("image", Some("race.png"), b"png"),
                ("players", None, b"[\"Mario\", \"Peach\"]"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scores"], json!({"Mario": 12, "Peach": 12}));
    }

    #[tokio::test]
    async fn test_cup_listing_for_other_year() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send(&app, get("/api/cups?year=2019")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["year"], 2019);
        assert_eq!(body["cups"].as_array().map(Vec::len), Some(24));
        assert_eq!(body["max_round"], 0);
    }

    #[tokio::test]
    async fn test_toggle_unknown_cup() {
        let (app, _) = app_with(vec![]).await;

        let (_, body) = send(&app, get("/api/cups/rainbow/toggle")).await;
        assert_eq!(body, json!({"action": "rejected", "reason": "unknown_cup"}));
    }

    #[tokio::test]
    async fn test_random_cup_is_assigned() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send(&app, json_request("POST", "/api/cups/random", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);
        assert_eq!(body["cup"]["round"], 1);
        assert_eq!(body["state"]["max_round"], 1);

        let (status, _) = send(&app, get("/api/cups/random")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
