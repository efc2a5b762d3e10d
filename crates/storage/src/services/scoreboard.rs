use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::aggregation::{PlayerScore, build_player_scores};
use super::comparison::{ComparisonMode, PreviousYear, has_previous_year};
use super::cups::load_cups;
use super::grid::{ScoreGrid, build_score_grid};
use crate::error::Result;
use crate::models::{Cup, ScoreScope};
use crate::store::Store;

/// Live per-player aggregation for the configured scope.
///
/// Rebuilt from the store on every refresh.
pub struct Scoreboard {
    store: Arc<dyn Store>,
    scope: ScoreScope,
    player_scores: RwLock<Vec<PlayerScore>>,
}

impl Scoreboard {
    pub fn new(store: Arc<dyn Store>, scope: ScoreScope) -> Self {
        Self {
            store,
            scope,
            player_scores: RwLock::new(Vec::new()),
        }
    }

    pub fn scope(&self) -> ScoreScope {
        self.scope
    }

    pub async fn player_scores(&self) -> Vec<PlayerScore> {
        self.player_scores.read().await.clone()
    }

    /// Refetches players and scores. On failure the previous snapshot stays.
    pub async fn refresh(&self) -> bool {
        match load_player_scores(self.store.as_ref(), self.scope).await {
            Ok(scores) => {
                tracing::debug!(scope = %self.scope, players = scores.len(), "Scoreboard refreshed");
                *self.player_scores.write().await = scores;
                true
            }
            Err(e) => {
                tracing::error!("Failed to refresh scoreboard ({}): {}", self.scope, e);
                false
            }
        }
    }
}

pub async fn load_player_scores(store: &dyn Store, scope: ScoreScope) -> Result<Vec<PlayerScore>> {
    let players = store.list_player_identities().await?;
    let scores = store.list_scores(scope).await?;
    Ok(build_player_scores(&players, &scores))
}

/// Years with recorded scores plus the running year, ascending.
pub async fn available_years(store: &dyn Store, current_year: i32) -> Result<Vec<i32>> {
    let mut years = store.list_years().await?;
    if !years.contains(&current_year) {
        years.push(current_year);
        years.sort_unstable();
    }
    Ok(years)
}

/// Everything needed to render one year's standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct YearView {
    pub year: i32,
    pub available_years: Vec<i32>,
    pub player_scores: Vec<PlayerScore>,
    pub cups: Vec<Cup>,
    pub grid: ScoreGrid,
}

/// Loads a year's standings and, when last year has data, the comparison
/// against it.
pub async fn load_year_view(
    store: &dyn Store,
    year: i32,
    current_year: i32,
    mode: ComparisonMode,
) -> Result<YearView> {
    let years = available_years(store, current_year).await?;
    let player_scores = load_player_scores(store, ScoreScope::Year(year)).await?;
    let cups = load_cups(store, year).await?;

    let grid = if has_previous_year(&years, year) {
        let previous_scores = load_player_scores(store, ScoreScope::Year(year - 1)).await?;
        let previous_cups = load_cups(store, year - 1).await?;
        let previous = PreviousYear {
            scores: &previous_scores,
            cups: &previous_cups,
        };
        build_score_grid(&player_scores, &cups, mode, Some(previous))
    } else {
        build_score_grid(&player_scores, &cups, mode, None)
    };

    Ok(YearView {
        year,
        available_years: years,
        player_scores,
        cups,
        grid,
    })
}
