use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::aggregation::{Medal, PlayerScore, round_medal, round_scores, rounds_played};
use super::comparison::{ComparisonMode, PreviousYear, previous_score, score_delta};
use crate::models::Cup;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoundHeader {
    pub round: i32,
    pub cup: Option<Cup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoundCell {
    pub round: i32,
    pub score: f64,
    pub medal: Option<Medal>,
    /// Signed change against last year, present only when significant.
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StandingRow {
    pub medal: Option<Medal>,
    pub uuid: Uuid,
    pub name: String,
    pub average_score: f64,
    pub cells: Vec<RoundCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreGrid {
    pub rounds: Vec<RoundHeader>,
    pub rows: Vec<StandingRow>,
    pub comparison_mode: ComparisonMode,
    pub has_previous_year: bool,
}

/// Lays out ranked player scores as a table: one column per round, podium
/// medals for the overall top three rows, per-round medals and deltas.
pub fn build_score_grid(
    player_scores: &[PlayerScore],
    cups: &[Cup],
    mode: ComparisonMode,
    previous: Option<PreviousYear<'_>>,
) -> ScoreGrid {
    let rounds = rounds_played(player_scores);

    let headers = (1..=rounds)
        .map(|round| RoundHeader {
            round,
            cup: cups.iter().find(|c| c.round == Some(round)).cloned(),
        })
        .collect();

    let per_round: Vec<Vec<f64>> = (1..=rounds)
        .map(|round| round_scores(player_scores, round))
        .collect();

    let rows = player_scores
        .iter()
        .enumerate()
        .map(|(index, ps)| StandingRow {
            medal: Medal::from_index(index),
            uuid: ps.uuid,
            name: ps.name.clone(),
            average_score: ps.average_score,
            cells: ps
                .scores
                .iter()
                .map(|(&round, &score)| {
                    let medal = usize::try_from(round - 1)
                        .ok()
                        .and_then(|i| per_round.get(i))
                        .and_then(|all| round_medal(all, score));
                    let delta = previous.as_ref().and_then(|prev| {
                        let before = previous_score(prev, cups, mode, ps.uuid, round)?;
                        score_delta(score, before)
                    });
                    RoundCell {
                        round,
                        score,
                        medal,
                        delta,
                    }
                })
                .collect(),
        })
        .collect();

    ScoreGrid {
        rounds: headers,
        rows,
        comparison_mode: mode,
        has_previous_year: previous.is_some(),
    }
}
