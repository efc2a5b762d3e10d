use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use super::{
    CHANGE_FEED_CAPACITY, ChangeEvent, ChangeFeed, ChangeKind, CupRoundStore, PlayerStore,
    ScoreStore, Table,
};
use crate::error::{Result, StorageError};
use crate::models::{
    CupRound, Player, PlayerAssignment, PlayerIdentity, Score, ScoreScope, sort_roster,
};

#[derive(Debug, Default)]
struct Tables {
    players: Vec<Player>,
    scores: Vec<Score>,
    cups_rounds: Vec<CupRound>,
}

/// In-process store with the same constraints as the Postgres schema.
///
/// Used by tests and when no `DATABASE_URL` is configured. Every successful
/// mutation is announced on the change feed.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    changes: broadcast::Sender<ChangeEvent>,
    offline: AtomicBool,
    offline_after_write: Mutex<Option<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            tables: RwLock::new(Tables::default()),
            changes,
            offline: AtomicBool::new(false),
            offline_after_write: Mutex::new(None),
        }
    }

    /// While offline every operation fails with `StorageError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Goes offline right after the next successful write to `table`.
    pub fn set_offline_after_write(&self, table: Table) {
        if let Ok(mut trip) = self.offline_after_write.lock() {
            *trip = Some(table);
        }
    }

    /// Seeds rows without emitting change events.
    pub async fn seed(&self, players: Vec<Player>, scores: Vec<Score>, cups_rounds: Vec<CupRound>) {
        let mut tables = self.tables.write().await;
        tables.players.extend(players);
        tables.scores.extend(scores);
        tables.cups_rounds.extend(cups_rounds);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn announce(&self, table: Table, kind: ChangeKind) {
        if let Ok(mut trip) = self.offline_after_write.lock() {
            if *trip == Some(table) {
                *trip = None;
                self.set_offline(true);
            }
        }
        // No subscribers is fine.
        let _ = self.changes.send(ChangeEvent::new(table, kind));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for MemoryStore {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn list_players(&self) -> Result<Vec<Player>> {
        self.check_online()?;
        let mut players = self.tables.read().await.players.clone();
        sort_roster(&mut players);
        Ok(players)
    }

    async fn list_player_identities(&self) -> Result<Vec<PlayerIdentity>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.players.iter().map(PlayerIdentity::from).collect())
    }

    async fn insert_player(&self, name: &str) -> Result<Player> {
        self.check_online()?;
        let player = Player::new(name);
        self.tables.write().await.players.push(player.clone());
        self.announce(Table::Players, ChangeKind::Insert);
        Ok(player)
    }

    async fn delete_player(&self, uuid: Uuid) -> Result<()> {
        self.check_online()?;
        {
            let mut tables = self.tables.write().await;
            let index = tables
                .players
                .iter()
                .position(|p| p.uuid == uuid)
                .ok_or(StorageError::NotFound)?;
            if tables.players[index].is_assigned() {
                return Err(StorageError::ConstraintViolation(format!(
                    "player {} is assigned to a team",
                    uuid
                )));
            }
            tables.players.remove(index);
            tables.scores.retain(|s| s.player != uuid);
        }
        self.announce(Table::Players, ChangeKind::Delete);
        Ok(())
    }

    async fn update_player_score(&self, uuid: Uuid, score: i32) -> Result<Player> {
        self.check_online()?;
        if score < 0 {
            return Err(StorageError::ConstraintViolation("players_score_check".to_string()));
        }
        let updated = {
            let mut tables = self.tables.write().await;
            let player = tables
                .players
                .iter_mut()
                .find(|p| p.uuid == uuid)
                .ok_or(StorageError::NotFound)?;
            player.score = score;
            player.updated_at = Utc::now();
            player.clone()
        };
        self.announce(Table::Players, ChangeKind::Update);
        Ok(updated)
    }

    async fn set_player_team(&self, uuid: Uuid, team: Option<i32>, score: i32) -> Result<Player> {
        self.check_online()?;
        if team.is_some_and(|t| t < 1) || score < 0 {
            return Err(StorageError::ConstraintViolation("players_check".to_string()));
        }
        let updated = {
            let mut tables = self.tables.write().await;
            let player = tables
                .players
                .iter_mut()
                .find(|p| p.uuid == uuid)
                .ok_or(StorageError::NotFound)?;
            player.team = team;
            player.score = score;
            player.updated_at = Utc::now();
            player.clone()
        };
        self.announce(Table::Players, ChangeKind::Update);
        Ok(updated)
    }

    async fn upsert_players(&self, assignments: &[PlayerAssignment]) -> Result<()> {
        self.check_online()?;
        if assignments
            .iter()
            .any(|a| a.team.is_some_and(|t| t < 1) || a.score < 0)
        {
            return Err(StorageError::ConstraintViolation("players_check".to_string()));
        }
        {
            let mut tables = self.tables.write().await;
            let now = Utc::now();
            for assignment in assignments {
                match tables.players.iter().position(|p| p.uuid == assignment.uuid) {
                    Some(index) => {
                        let player = &mut tables.players[index];
                        player.name = assignment.name.clone();
                        player.team = assignment.team;
                        player.score = assignment.score;
                        player.updated_at = now;
                    }
                    None => tables.players.push(Player {
                        uuid: assignment.uuid,
                        name: assignment.name.clone(),
                        team: assignment.team,
                        score: assignment.score,
                        created_at: now,
                        updated_at: now,
                    }),
                }
            }
        }
        self.announce(Table::Players, ChangeKind::Update);
        Ok(())
    }

    async fn reset_players(&self, uuids: &[Uuid]) -> Result<u64> {
        self.check_online()?;
        let mut affected = 0;
        {
            let mut tables = self.tables.write().await;
            let now = Utc::now();
            for player in tables.players.iter_mut().filter(|p| uuids.contains(&p.uuid)) {
                player.team = None;
                player.score = 0;
                player.updated_at = now;
                affected += 1;
            }
        }
        self.announce(Table::Players, ChangeKind::Update);
        Ok(affected)
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn list_scores(&self, scope: ScoreScope) -> Result<Vec<Score>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut scores: Vec<Score> = tables
            .scores
            .iter()
            .filter(|s| scope.includes(s.year))
            .cloned()
            .collect();
        scores.sort_by_key(|s| (s.year, s.round));
        Ok(scores)
    }

    async fn max_round(&self, year: i32) -> Result<Option<i32>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .scores
            .iter()
            .filter(|s| s.year == year)
            .map(|s| s.round)
            .max())
    }

    async fn insert_scores(&self, rows: &[Score]) -> Result<()> {
        self.check_online()?;
        {
            let mut tables = self.tables.write().await;

            // Validate the whole batch before touching the table.
            let mut keys = BTreeSet::new();
            for row in rows {
                if row.round < 1 {
                    return Err(StorageError::ConstraintViolation("scores_round_check".to_string()));
                }
                if !tables.players.iter().any(|p| p.uuid == row.player) {
                    return Err(StorageError::ConstraintViolation(format!(
                        "player {} does not exist",
                        row.player
                    )));
                }
                let key = (row.player, row.round, row.year);
                let taken = tables
                    .scores
                    .iter()
                    .any(|s| (s.player, s.round, s.year) == key);
                if taken || !keys.insert(key) {
                    return Err(StorageError::ConstraintViolation(format!(
                        "round {} of {} already has a score for player {}",
                        row.round, row.year, row.player
                    )));
                }
            }

            tables.scores.extend(rows.iter().cloned());
        }
        self.announce(Table::Scores, ChangeKind::Insert);
        Ok(())
    }

    async fn has_scores_for_round(&self, year: i32, round: i32) -> Result<bool> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .scores
            .iter()
            .any(|s| s.year == year && s.round == round))
    }

    async fn list_years(&self) -> Result<Vec<i32>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let years: BTreeSet<i32> = tables.scores.iter().map(|s| s.year).collect();
        Ok(years.into_iter().collect())
    }
}

#[async_trait]
impl CupRoundStore for MemoryStore {
    async fn list_cup_rounds(&self, year: i32) -> Result<Vec<CupRound>> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<CupRound> = tables
            .cups_rounds
            .iter()
            .filter(|r| r.year == year)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.round.cmp(&a.round));
        Ok(rows)
    }

    async fn insert_cup_round(&self, row: &CupRound) -> Result<()> {
        self.check_online()?;
        {
            let mut tables = self.tables.write().await;
            let clash = tables
                .cups_rounds
                .iter()
                .any(|r| r.year == row.year && (r.cup == row.cup || r.round == row.round));
            if clash {
                return Err(StorageError::ConstraintViolation(format!(
                    "cup '{}' or round {} is already taken in {}",
                    row.cup, row.round, row.year
                )));
            }
            tables.cups_rounds.push(row.clone());
        }
        self.announce(Table::CupsRounds, ChangeKind::Insert);
        Ok(())
    }

    async fn delete_cup_round(&self, year: i32, cup: &str) -> Result<()> {
        self.check_online()?;
        {
            let mut tables = self.tables.write().await;
            let before = tables.cups_rounds.len();
            tables
                .cups_rounds
                .retain(|r| !(r.year == year && r.cup == cup));
            if tables.cups_rounds.len() == before {
                return Err(StorageError::NotFound);
            }
        }
        self.announce(Table::CupsRounds, ChangeKind::Delete);
        Ok(())
    }

    async fn delete_cup_rounds(&self, year: i32) -> Result<u64> {
        self.check_online()?;
        let removed = {
            let mut tables = self.tables.write().await;
            let before = tables.cups_rounds.len();
            tables.cups_rounds.retain(|r| r.year != year);
            (before - tables.cups_rounds.len()) as u64
        };
        self.announce(Table::CupsRounds, ChangeKind::Delete);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_announces_change() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.insert_player("Peach").await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event, ChangeEvent::new(Table::Players, ChangeKind::Insert));
    }

    #[tokio::test]
    async fn test_duplicate_score_row_rejected_atomically() {
        let store = MemoryStore::new();
        let mario = store.insert_player("Mario").await.unwrap();
        let luigi = store.insert_player("Luigi").await.unwrap();
        let row = |player, score| Score {
            player,
            round: 1,
            score,
            year: 2025,
        };

        store.insert_scores(&[row(mario.uuid, 6.0)]).await.unwrap();
        let err = store
            .insert_scores(&[row(luigi.uuid, 3.0), row(mario.uuid, 6.0)])
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        let scores = store.list_scores(ScoreScope::Year(2025)).await.unwrap();
        assert_eq!(scores.len(), 1);
    }

    #[tokio::test]
    async fn test_score_for_unknown_player_rejected() {
        let store = MemoryStore::new();
        let ghost = Uuid::new_v4();
        let row = Score {
            player: ghost,
            round: 1,
            score: 4.0,
            year: 2025,
        };

        let err = store.insert_scores(&[row]).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(ref reason) if reason.contains("does not exist")));
        assert!(store.list_scores(ScoreScope::Year(2025)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cup_round_uniqueness_per_year() {
        let store = MemoryStore::new();
        let row = |year, cup: &str, round| CupRound {
            year,
            cup: cup.to_string(),
            round,
        };

        store.insert_cup_round(&row(2025, "star", 1)).await.unwrap();
        assert!(store.insert_cup_round(&row(2025, "moon", 1)).await.is_err());
        assert!(store.insert_cup_round(&row(2025, "star", 2)).await.is_err());
        store.insert_cup_round(&row(2024, "star", 1)).await.unwrap();

        assert_eq!(store.delete_cup_rounds(2025).await.unwrap(), 1);
        assert_eq!(store.list_cup_rounds(2024).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_refuses_assigned_player() {
        let store = MemoryStore::new();
        let daisy = store.insert_player("Daisy").await.unwrap();
        store.set_player_team(daisy.uuid, Some(1), 0).await.unwrap();

        assert!(matches!(
            store.delete_player(daisy.uuid).await,
            Err(StorageError::ConstraintViolation(_))
        ));

        store.set_player_team(daisy.uuid, None, 0).await.unwrap();
        store.delete_player(daisy.uuid).await.unwrap();
        assert!(matches!(
            store.delete_player(daisy.uuid).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.list_players().await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.insert_player("Toad").await.is_err());

        store.set_offline(false);
        assert!(store.list_players().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_after_write() {
        let store = MemoryStore::new();
        store.set_offline_after_write(Table::Players);

        store.list_cup_rounds(2025).await.unwrap();
        store.insert_player("Toad").await.unwrap();
        assert!(matches!(
            store.list_players().await,
            Err(StorageError::Unavailable(_))
        ));
    }
}
