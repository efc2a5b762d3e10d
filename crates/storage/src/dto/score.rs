use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::{ComparisonMode, PlayerScore, ProgressionSeries, ProgressionView};

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StandingsParams {
    /// Defaults to the running tournament year.
    pub year: Option<i32>,
    #[serde(default)]
    pub mode: ComparisonMode,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProgressionParams {
    pub year: Option<i32>,
    #[serde(default)]
    pub view: ProgressionView,
}

/// Live standings of the running tournament
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LiveScoresResponse {
    pub scope: String,
    pub player_scores: Vec<PlayerScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct YearsResponse {
    pub current_year: i32,
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgressionResponse {
    pub year: i32,
    pub view: ProgressionView,
    pub rounds: i32,
    pub series: Vec<ProgressionSeries>,
}

/// Scores read from a results screenshot, keyed by player name
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParsedScoresResponse {
    pub scores: BTreeMap<String, u32>,
}
