//! Live roster for the running tournament.
//!
//! The manager mirrors the `players` table and keeps the in-progress round
//! state (team and entered score per player). Store failures are logged and
//! reported as "not applied"; the mirror only changes after the store accepts
//! a write.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use super::score_import::{ScoreImportError, ScoreMatch, match_parsed_scores};
use super::scoreboard::Scoreboard;
use super::teams;
use crate::error::StorageError;
use crate::models::{Player, sort_roster};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Removal {
    Removed,
    /// Players on a team are kept until they are unassigned.
    Assigned,
    NotFound,
    Failed,
}

impl Removal {
    pub fn is_applied(&self) -> bool {
        matches!(self, Removal::Removed)
    }
}

/// Result of finalizing a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Confirmation {
    /// Rows written and the roster cleared.
    Saved { round: i32 },
    /// Rows written but clearing teams and scores failed. The next confirm
    /// retries the reset instead of writing another round.
    ResetPending { round: i32 },
    /// Guard not met, nothing written.
    Rejected,
    Failed,
}

impl Confirmation {
    /// Round whose rows are in the store, if any.
    pub fn round(&self) -> Option<i32> {
        match self {
            Self::Saved { round } | Self::ResetPending { round } => Some(*round),
            Self::Rejected | Self::Failed => None,
        }
    }
}

pub struct RosterManager {
    store: Arc<dyn Store>,
    year: i32,
    scoreboard: Arc<Scoreboard>,
    players: RwLock<Vec<Player>>,
    /// Saved round whose roster reset has not gone through yet.
    pending_reset: RwLock<Option<i32>>,
}

impl RosterManager {
    pub fn new(store: Arc<dyn Store>, year: i32, scoreboard: Arc<Scoreboard>) -> Self {
        Self {
            store,
            year,
            scoreboard,
            players: RwLock::new(Vec::new()),
            pending_reset: RwLock::new(None),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Roster snapshot: unassigned first, then by team, then by name.
    pub async fn players(&self) -> Vec<Player> {
        self.players.read().await.clone()
    }

    pub async fn refresh(&self) -> bool {
        match self.store.list_players().await {
            Ok(mut players) => {
                sort_roster(&mut players);
                *self.players.write().await = players;
                true
            }
            Err(e) => {
                tracing::error!("Failed to load players: {}", e);
                false
            }
        }
    }

    pub async fn teams_with_players(&self) -> BTreeSet<i32> {
        teams::teams_with_players(&self.players.read().await)
    }

    pub async fn team_averages(&self) -> BTreeMap<i32, f64> {
        teams::team_averages(&self.players.read().await)
    }

    pub async fn are_all_team_scores_valid(&self) -> bool {
        teams::are_all_team_scores_valid(&self.players.read().await)
    }

    pub async fn add_player(&self, name: &str) -> Option<Player> {
        match self.store.insert_player(name).await {
            Ok(player) => {
                tracing::info!(uuid = %player.uuid, "Player added: {}", player.name);
                let mut players = self.players.write().await;
                players.push(player.clone());
                sort_roster(&mut players);
                Some(player)
            }
            Err(e) => {
                tracing::error!("Failed to add player {}: {}", name, e);
                None
            }
        }
    }

    pub async fn remove_player(&self, uuid: Uuid) -> Removal {
        let assigned = self
            .players
            .read()
            .await
            .iter()
            .find(|p| p.uuid == uuid)
            .map(|p| p.is_assigned());

        if assigned == Some(true) {
            tracing::warn!(%uuid, "Refusing to remove a player assigned to a team");
            return Removal::Assigned;
        }

        match self.store.delete_player(uuid).await {
            Ok(()) => {
                tracing::info!(%uuid, "Player removed");
                self.players.write().await.retain(|p| p.uuid != uuid);
                // Cascaded score rows disappear from the standings too.
                self.scoreboard.refresh().await;
                Removal::Removed
            }
            Err(StorageError::NotFound) => {
                tracing::warn!(%uuid, "Player to remove does not exist");
                Removal::NotFound
            }
            Err(StorageError::ConstraintViolation(reason)) => {
                // The mirror missed a team assignment.
                tracing::warn!(%uuid, "Refusing to remove player: {}", reason);
                self.refresh().await;
                Removal::Assigned
            }
            Err(e) => {
                tracing::error!("Failed to remove player {}: {}", uuid, e);
                Removal::Failed
            }
        }
    }

    /// Stores the entered score for the current round. Invalid numbers are ignored.
    pub async fn update_score(&self, uuid: Uuid, score: f64) -> bool {
        let Some(score) = teams::parse_score_input(score) else {
            tracing::warn!(%uuid, score, "Ignoring invalid score input");
            return false;
        };

        match self.store.update_player_score(uuid, score).await {
            Ok(updated) => {
                self.replace(updated).await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to update score for {}: {}", uuid, e);
                false
            }
        }
    }

    /// Deals the whole roster into `team_count` teams and clears every score.
    pub async fn randomize_teams(&self, team_count: usize) -> bool {
        if team_count == 0 {
            tracing::warn!("Refusing to randomize into zero teams");
            return false;
        }

        let assignments = {
            let players = self.players.read().await;
            teams::assign_teams(&players, team_count, &mut rand::thread_rng())
        };

        match self.store.upsert_players(&assignments).await {
            Ok(()) => {
                tracing::info!(team_count, players = assignments.len(), "Teams randomized");
                *self.pending_reset.write().await = None;
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to randomize teams: {}", e);
                false
            }
        }
    }

    pub async fn reset_player_team(&self, uuid: Uuid) -> bool {
        match self.store.set_player_team(uuid, None, 0).await {
            Ok(updated) => {
                self.replace(updated).await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to reset team for {}: {}", uuid, e);
                false
            }
        }
    }

    pub async fn reset_all_scores_and_teams(&self) -> bool {
        let uuids: Vec<Uuid> = self.players.read().await.iter().map(|p| p.uuid).collect();

        match self.store.reset_players(&uuids).await {
            Ok(reset) => {
                tracing::info!(reset, "Scores and teams reset");
                *self.pending_reset.write().await = None;
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to reset scores and teams: {}", e);
                false
            }
        }
    }

    /// Finalizes the current round: one row per assigned player carrying the
    /// team average, written all at once, then the roster is cleared.
    ///
    /// When a previous round was saved but its reset failed, only the reset
    /// is retried.
    pub async fn confirm_and_save_scores(&self) -> Confirmation {
        let pending = *self.pending_reset.read().await;
        if let Some(round) = pending {
            tracing::warn!(round, "Retrying the roster reset of an already saved round");
            return self.finish_round(round).await;
        }

        if !self.refresh().await {
            return Confirmation::Failed;
        }

        let players = self.players().await;
        if !teams::are_all_team_scores_valid(&players) {
            tracing::warn!("Round not confirmed: need two teams and a positive score for everyone");
            return Confirmation::Rejected;
        }

        let round = match self.store.max_round(self.year).await {
            Ok(max) => teams::next_round(max),
            Err(e) => {
                tracing::error!("Failed to read the latest round for {}: {}", self.year, e);
                return Confirmation::Failed;
            }
        };

        let rows = teams::round_scores(&players, round, self.year);
        if let Err(e) = self.store.insert_scores(&rows).await {
            tracing::error!("Failed to save scores for round {}: {}", round, e);
            return Confirmation::Failed;
        }
        tracing::info!(year = self.year, round, rows = rows.len(), "Round saved");

        self.finish_round(round).await
    }

    async fn finish_round(&self, round: i32) -> Confirmation {
        let outcome = if self.reset_all_scores_and_teams().await {
            Confirmation::Saved { round }
        } else {
            tracing::error!(round, "Round saved but the roster still holds its teams and scores");
            *self.pending_reset.write().await = Some(round);
            Confirmation::ResetPending { round }
        };
        self.scoreboard.refresh().await;
        outcome
    }

    /// Applies scores read from a results screenshot.
    ///
    /// Matched players are updated one by one; a failed update keeps the
    /// player in `matched` since the store logs the failure.
    pub async fn apply_parsed_scores(
        &self,
        parsed: &BTreeMap<String, u32>,
    ) -> Result<ScoreMatch, ScoreImportError> {
        let players = self.players().await;
        let result = match_parsed_scores(&players, parsed)?;

        for matched in &result.matched {
            self.update_score(matched.uuid, f64::from(matched.score)).await;
        }

        if !result.unmatched.is_empty() {
            tracing::warn!(unmatched = ?result.unmatched, "Parsed names without a player");
        }

        Ok(result)
    }

    async fn replace(&self, updated: Player) {
        let mut players = self.players.write().await;
        match players.iter().position(|p| p.uuid == updated.uuid) {
            Some(index) => players[index] = updated,
            None => players.push(updated),
        }
        sort_roster(&mut players);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Score, ScoreScope};
    use crate::store::{MemoryStore, PlayerStore, ScoreStore, Table};

    async fn roster_with(store: Arc<MemoryStore>) -> RosterManager {
        let scoreboard = Arc::new(Scoreboard::new(store.clone(), ScoreScope::Year(2025)));
        let roster = RosterManager::new(store, 2025, scoreboard);
        assert!(roster.refresh().await);
        roster
    }

    fn player(name: &str, team: Option<i32>, score: i32) -> Player {
        Player {
            team,
            score,
            ..Player::new(name)
        }
    }

    #[tokio::test]
    async fn test_add_and_list_in_roster_order() {
        let store = Arc::new(MemoryStore::new());
        store.seed(vec![player("Yoshi", Some(1), 0)], vec![], vec![]).await;
        let roster = roster_with(store).await;

        roster.add_player("Birdo").await.unwrap();
        roster.add_player("Toad").await.unwrap();

        let names: Vec<String> = roster.players().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Birdo", "Toad", "Yoshi"]);
    }

    #[tokio::test]
    async fn test_remove_refuses_assigned_player() {
        let yoshi = player("Yoshi", Some(1), 0);
        let toad = player("Toad", None, 0);
        let store = Arc::new(MemoryStore::new());
        store.seed(vec![yoshi.clone(), toad.clone()], vec![], vec![]).await;
        let roster = roster_with(store).await;

        assert_eq!(roster.remove_player(yoshi.uuid).await, Removal::Assigned);
        assert_eq!(roster.remove_player(toad.uuid).await, Removal::Removed);
        assert_eq!(roster.remove_player(toad.uuid).await, Removal::NotFound);
        assert_eq!(roster.players().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_checks_store_assignment() {
        let koopa = player("Koopa", None, 0);
        let store = Arc::new(MemoryStore::new());
        store.seed(vec![koopa.clone()], vec![], vec![]).await;
        let roster = roster_with(store.clone()).await;

        // Assigned behind the mirror's back.
        store.set_player_team(koopa.uuid, Some(2), 0).await.unwrap();

        assert_eq!(roster.remove_player(koopa.uuid).await, Removal::Assigned);
        assert_eq!(store.list_players().await.unwrap().len(), 1);
        assert_eq!(roster.players().await[0].team, Some(2));
    }

    #[tokio::test]
    async fn test_update_score_ignores_invalid_numbers() {
        let peach = player("Peach", Some(1), 3);
        let store = Arc::new(MemoryStore::new());
        store.seed(vec![peach.clone()], vec![], vec![]).await;
        let roster = roster_with(store).await;

        assert!(!roster.update_score(peach.uuid, f64::NAN).await);
        assert!(!roster.update_score(peach.uuid, -4.0).await);
        assert_eq!(roster.players().await[0].score, 3);

        assert!(roster.update_score(peach.uuid, 12.7).await);
        assert_eq!(roster.players().await[0].score, 12);
    }

    #[tokio::test]
    async fn test_randomize_teams() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                (0..5).map(|i| player(&format!("P{}", i), None, 9)).collect(),
                vec![],
                vec![],
            )
            .await;
        let roster = roster_with(store).await;

        assert!(!roster.randomize_teams(0).await);
        assert!(roster.randomize_teams(2).await);

        let players = roster.players().await;
        assert!(players.iter().all(|p| p.is_assigned() && p.score == 0));
        assert_eq!(roster.teams_with_players().await.len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_rejected_by_guard() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                vec![player("A", Some(1), 5), player("B", Some(1), 7)],
                vec![],
                vec![],
            )
            .await;
        let roster = roster_with(store.clone()).await;

        assert_eq!(roster.confirm_and_save_scores().await, Confirmation::Rejected);
        assert!(store.list_scores(ScoreScope::AllTime).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_continues_after_latest_round() {
        let a = player("A", Some(1), 4);
        let b = player("B", Some(2), 8);
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                vec![a.clone(), b.clone()],
                vec![
                    Score {
                        player: a.uuid,
                        round: 3,
                        score: 2.0,
                        year: 2025,
                    },
                    Score {
                        player: a.uuid,
                        round: 9,
                        score: 2.0,
                        year: 2024,
                    },
                ],
                vec![],
            )
            .await;
        let roster = roster_with(store.clone()).await;

        assert_eq!(
            roster.confirm_and_save_scores().await,
            Confirmation::Saved { round: 4 }
        );

        let players = roster.players().await;
        assert!(players.iter().all(|p| p.team.is_none() && p.score == 0));
        assert_eq!(store.max_round(2025).await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_failed_reset_is_not_saved_twice() {
        let a = player("A", Some(1), 4);
        let b = player("B", Some(2), 8);
        let store = Arc::new(MemoryStore::new());
        store.seed(vec![a, b], vec![], vec![]).await;
        let roster = roster_with(store.clone()).await;

        store.set_offline_after_write(Table::Scores);
        assert_eq!(
            roster.confirm_and_save_scores().await,
            Confirmation::ResetPending { round: 1 }
        );
        assert!(roster.players().await.iter().all(|p| p.is_assigned()));

        // Still offline: the retry neither writes nor reports success.
        assert_eq!(
            roster.confirm_and_save_scores().await,
            Confirmation::ResetPending { round: 1 }
        );

        store.set_offline(false);
        assert_eq!(
            roster.confirm_and_save_scores().await,
            Confirmation::Saved { round: 1 }
        );
        assert!(roster.players().await.iter().all(|p| p.team.is_none() && p.score == 0));
        assert_eq!(store.max_round(2025).await.unwrap(), Some(1));
        assert_eq!(store.list_scores(ScoreScope::AllTime).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_outage_leaves_mirror_untouched() {
        let mario = player("Mario", Some(1), 4);
        let store = Arc::new(MemoryStore::new());
        store.seed(vec![mario.clone()], vec![], vec![]).await;
        let roster = roster_with(store.clone()).await;

        store.set_offline(true);

        assert!(roster.add_player("Luigi").await.is_none());
        assert!(!roster.update_score(mario.uuid, 10.0).await);
        assert!(!roster.reset_all_scores_and_teams().await);
        assert_eq!(roster.remove_player(Uuid::new_v4()).await, Removal::Failed);
        assert_eq!(roster.players().await, vec![mario]);
    }

    #[tokio::test]
    async fn test_apply_parsed_scores() {
        let daisy = player("Daisy", Some(1), 0);
        let wario = player("Wario", Some(2), 0);
        let store = Arc::new(MemoryStore::new());
        store.seed(vec![daisy.clone(), wario.clone()], vec![], vec![]).await;
        let roster = roster_with(store).await;

        let parsed: BTreeMap<String, u32> = [("daisy ".to_string(), 31), ("Waluigi".to_string(), 2)]
            .into_iter()
            .collect();
        let result = roster.apply_parsed_scores(&parsed).await.unwrap();

        assert_eq!(result.unmatched, vec!["Waluigi".to_string()]);
        let players = roster.players().await;
        assert_eq!(players.iter().find(|p| p.uuid == daisy.uuid).unwrap().score, 31);
        assert_eq!(players.iter().find(|p| p.uuid == wario.uuid).unwrap().score, 0);
    }
}
