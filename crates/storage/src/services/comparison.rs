use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::aggregation::PlayerScore;
use crate::models::Cup;

/// Smallest year-over-year difference worth showing.
pub const DELTA_EPSILON: f64 = 0.01;

// Absorbs float noise in team averages such as 6.01 - 6.0.
const DELTA_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Same round number last year.
    #[default]
    Round,
    /// Whatever round the same cup was played in last year.
    Cup,
}

/// Last year's data used for comparisons.
#[derive(Debug, Clone, Copy)]
pub struct PreviousYear<'a> {
    pub scores: &'a [PlayerScore],
    pub cups: &'a [Cup],
}

/// Score the same player had last year for the round being compared.
pub fn previous_score(
    previous: &PreviousYear<'_>,
    current_cups: &[Cup],
    mode: ComparisonMode,
    player: Uuid,
    round: i32,
) -> Option<f64> {
    let previous_player = previous.scores.iter().find(|p| p.uuid == player)?;

    let previous_round = match mode {
        ComparisonMode::Round => round,
        ComparisonMode::Cup => {
            let current_cup = current_cups.iter().find(|c| c.round == Some(round))?;
            previous
                .cups
                .iter()
                .find(|c| c.cup == current_cup.cup)?
                .round?
        }
    };

    previous_player.scores.get(&previous_round).copied()
}

/// The signed difference if it is large enough to show.
pub fn significant_delta(diff: f64) -> Option<f64> {
    if !diff.is_finite() || diff.abs() < DELTA_EPSILON - DELTA_TOLERANCE {
        None
    } else {
        Some(diff)
    }
}

pub fn score_delta(current: f64, previous: f64) -> Option<f64> {
    significant_delta(current - previous)
}

pub fn has_previous_year(available_years: &[i32], selected_year: i32) -> bool {
    available_years.contains(&(selected_year - 1))
}
