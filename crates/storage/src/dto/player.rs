use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Player;
use crate::services::{Confirmation, Removal, ScoreMatch};

/// Highest score a parsed results screen may report.
pub const MAX_PARSED_SCORE: u32 = 999;

/// Request payload for registering a player
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddPlayerRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Score entered for the current round
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateScoreRequest {
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RandomizeTeamsRequest {
    #[validate(range(min = 1, max = 64, message = "Team count must be between 1 and 64"))]
    pub team_count: u32,
}

/// Scores keyed by player name, as returned by the score parser
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ImportScoresRequest {
    #[validate(custom(function = "validate_parsed_scores"))]
    pub scores: BTreeMap<String, u32>,
}

/// Roster state returned by every player endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RosterResponse {
    pub year: i32,
    pub players: Vec<Player>,
    pub teams: Vec<i32>,
    pub team_averages: BTreeMap<i32, f64>,
    pub can_confirm: bool,
    /// Whether the requested change reached the store.
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemovePlayerResponse {
    pub outcome: Removal,
    pub roster: RosterResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmRoundResponse {
    #[serde(flatten)]
    pub confirmation: Confirmation,
    pub roster: RosterResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportScoresResponse {
    #[serde(flatten)]
    pub result: ScoreMatch,
    pub roster: RosterResponse,
}

fn validate_not_blank(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        Err(validator::ValidationError::new("blank_name"))
    } else {
        Ok(())
    }
}

fn validate_parsed_scores(scores: &BTreeMap<String, u32>) -> Result<(), validator::ValidationError> {
    if scores.is_empty() {
        return Err(validator::ValidationError::new("no_scores"));
    }
    if scores.values().any(|&score| score > MAX_PARSED_SCORE) {
        return Err(validator::ValidationError::new("score_out_of_range"));
    }
    Ok(())
}
