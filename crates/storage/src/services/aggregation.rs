//! Score aggregation: rebuilds per-player round maps from raw score rows and
//! derives averages, ranking, medals and progression series.
//!
//! Everything here is recomputed from scratch on each call.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{PlayerIdentity, Score};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    pub uuid: Uuid,
    pub name: String,
    pub average_score: f64,
    pub scores: BTreeMap<i32, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Medal for a zero-based place, if it is on the podium.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Gold),
            1 => Some(Self::Silver),
            2 => Some(Self::Bronze),
            _ => None,
        }
    }
}

/// Mean of the defined round scores only; 0 when none were played.
pub fn average_score(scores: &BTreeMap<i32, f64>) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.values().sum::<f64>() / scores.len() as f64
}

/// Ranking order: average descending, then name ascending.
pub fn ranking_order(a: &PlayerScore, b: &PlayerScore) -> Ordering {
    b.average_score
        .partial_cmp(&a.average_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
}

/// Builds one `PlayerScore` per known player, ranked.
///
/// Rows for players that no longer exist are ignored.
pub fn build_player_scores(players: &[PlayerIdentity], scores: &[Score]) -> Vec<PlayerScore> {
    let mut by_player: HashMap<Uuid, PlayerScore> = players
        .iter()
        .map(|p| {
            (
                p.uuid,
                PlayerScore {
                    uuid: p.uuid,
                    name: p.name.clone(),
                    average_score: 0.0,
                    scores: BTreeMap::new(),
                },
            )
        })
        .collect();

    for row in scores {
        if let Some(entry) = by_player.get_mut(&row.player) {
            entry.scores.insert(row.round, row.score);
        }
    }

    let mut ranked: Vec<PlayerScore> = by_player
        .into_values()
        .map(|mut ps| {
            ps.average_score = average_score(&ps.scores);
            ps
        })
        .collect();
    ranked.sort_by(ranking_order);
    ranked
}

/// Highest round any player has a score for (the number of grid columns).
pub fn rounds_played(player_scores: &[PlayerScore]) -> i32 {
    player_scores
        .iter()
        .filter_map(|ps| ps.scores.keys().next_back().copied())
        .max()
        .unwrap_or(0)
}

pub fn round_scores(player_scores: &[PlayerScore], round: i32) -> Vec<f64> {
    player_scores
        .iter()
        .filter_map(|ps| ps.scores.get(&round).copied())
        .collect()
}

/// Top three distinct values, highest first.
pub fn top_three(scores: &[f64]) -> Vec<f64> {
    let mut distinct: Vec<f64> = Vec::with_capacity(scores.len());
    for &score in scores {
        if !distinct.contains(&score) {
            distinct.push(score);
        }
    }
    distinct.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    distinct.truncate(3);
    distinct
}

/// Medal for `score` among `round_scores`; equal scores share a medal.
pub fn round_medal(round_scores: &[f64], score: f64) -> Option<Medal> {
    top_three(round_scores)
        .iter()
        .position(|&s| s == score)
        .and_then(Medal::from_index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgressionView {
    #[default]
    Place,
    Score,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressionSeries {
    pub uuid: Uuid,
    pub name: String,
    /// One entry per round from 1 to `rounds_played`; `None` when the player
    /// has no score for that round.
    pub points: Vec<Option<f64>>,
}

/// 1-based position of a player's score within a round, highest first.
/// Unlike medals, equal scores get consecutive positions.
pub fn place_for_round(player_scores: &[PlayerScore], round: i32, uuid: Uuid) -> Option<usize> {
    let mut entries: Vec<(Uuid, f64)> = player_scores
        .iter()
        .filter_map(|ps| ps.scores.get(&round).map(|&s| (ps.uuid, s)))
        .collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    entries
        .iter()
        .position(|(id, _)| *id == uuid)
        .map(|index| index + 1)
}

/// Per-player series for the progression chart; players without any round are omitted.
pub fn progression(player_scores: &[PlayerScore], view: ProgressionView) -> Vec<ProgressionSeries> {
    let rounds = rounds_played(player_scores);

    player_scores
        .iter()
        .filter(|ps| !ps.scores.is_empty())
        .map(|ps| ProgressionSeries {
            uuid: ps.uuid,
            name: ps.name.clone(),
            points: (1..=rounds)
                .map(|round| {
                    let score = ps.scores.get(&round)?;
                    match view {
                        ProgressionView::Score => Some(*score),
                        ProgressionView::Place => {
                            place_for_round(player_scores, round, ps.uuid).map(|p| p as f64)
                        }
                    }
                })
                .collect(),
        })
        .collect()
}
