use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{
    CHANGE_FEED_CAPACITY, ChangeEvent, ChangeFeed, ChangeKind, CupRoundStore, PlayerStore,
    ScoreStore,
};
use crate::Database;
use crate::error::Result;
use crate::models::{CupRound, Player, PlayerAssignment, PlayerIdentity, Score, ScoreScope};
use crate::repository::{CupRoundRepository, PlayerRepository, ScoreRepository};

/// Postgres channel the migration triggers notify on.
pub const NOTIFY_CHANNEL: &str = "table_changes";

const LISTENER_BACKOFF: Duration = Duration::from_secs(2);

/// Store backed by Postgres. Change events come from `LISTEN table_changes`.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
    changes: broadcast::Sender<ChangeEvent>,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { db, changes }
    }

    /// Starts forwarding Postgres notifications into the change feed.
    pub async fn start_listener(&self) -> Result<JoinHandle<()>> {
        let mut listener = PgListener::connect_with(self.db.pool()).await?;
        listener.listen(NOTIFY_CHANNEL).await?;
        tracing::info!("Listening for table changes on '{}'", NOTIFY_CHANNEL);

        let changes = self.changes.clone();
        Ok(tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        match serde_json::from_str::<ChangeEvent>(notification.payload()) {
                            Ok(event) => {
                                tracing::debug!(?event, "Table change received");
                                let _ = changes.send(event);
                            }
                            Err(e) => tracing::warn!(
                                "Ignoring malformed change payload '{}': {}",
                                notification.payload(),
                                e
                            ),
                        }
                    }
                    Err(e) => {
                        // Notifications sent while disconnected are lost, so
                        // every mirror is told to refetch once we are back.
                        tracing::error!("Change listener error: {}", e);
                        tokio::time::sleep(LISTENER_BACKOFF).await;
                        for table in super::Table::ALL {
                            let _ = changes.send(ChangeEvent::new(table, ChangeKind::Update));
                        }
                    }
                }
            }
        }))
    }
}

impl ChangeFeed for PgStore {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl PlayerStore for PgStore {
    async fn list_players(&self) -> Result<Vec<Player>> {
        PlayerRepository::new(self.db.pool()).list().await
    }

    async fn list_player_identities(&self) -> Result<Vec<PlayerIdentity>> {
        PlayerRepository::new(self.db.pool()).list_identities().await
    }

    async fn insert_player(&self, name: &str) -> Result<Player> {
        PlayerRepository::new(self.db.pool()).create(name).await
    }

    async fn delete_player(&self, uuid: Uuid) -> Result<()> {
        PlayerRepository::new(self.db.pool()).delete(uuid).await
    }

    async fn update_player_score(&self, uuid: Uuid, score: i32) -> Result<Player> {
        PlayerRepository::new(self.db.pool())
            .update_score(uuid, score)
            .await
    }

    async fn set_player_team(&self, uuid: Uuid, team: Option<i32>, score: i32) -> Result<Player> {
        PlayerRepository::new(self.db.pool())
            .set_team(uuid, team, score)
            .await
    }

    async fn upsert_players(&self, assignments: &[PlayerAssignment]) -> Result<()> {
        PlayerRepository::new(self.db.pool())
            .upsert_many(assignments)
            .await
    }

    async fn reset_players(&self, uuids: &[Uuid]) -> Result<u64> {
        PlayerRepository::new(self.db.pool()).reset_many(uuids).await
    }
}

#[async_trait]
impl ScoreStore for PgStore {
    async fn list_scores(&self, scope: ScoreScope) -> Result<Vec<Score>> {
        ScoreRepository::new(self.db.pool()).list(scope).await
    }

    async fn max_round(&self, year: i32) -> Result<Option<i32>> {
        ScoreRepository::new(self.db.pool()).max_round(year).await
    }

    async fn insert_scores(&self, rows: &[Score]) -> Result<()> {
        ScoreRepository::new(self.db.pool()).insert_many(rows).await
    }

    async fn has_scores_for_round(&self, year: i32, round: i32) -> Result<bool> {
        ScoreRepository::new(self.db.pool())
            .exists_for_round(year, round)
            .await
    }

    async fn list_years(&self) -> Result<Vec<i32>> {
        ScoreRepository::new(self.db.pool()).list_years().await
    }
}

#[async_trait]
impl CupRoundStore for PgStore {
    async fn list_cup_rounds(&self, year: i32) -> Result<Vec<CupRound>> {
        CupRoundRepository::new(self.db.pool())
            .list_for_year(year)
            .await
    }

    async fn insert_cup_round(&self, row: &CupRound) -> Result<()> {
        CupRoundRepository::new(self.db.pool()).create(row).await
    }

    async fn delete_cup_round(&self, year: i32, cup: &str) -> Result<()> {
        CupRoundRepository::new(self.db.pool())
            .delete(year, cup)
            .await
    }

    async fn delete_cup_rounds(&self, year: i32) -> Result<u64> {
        CupRoundRepository::new(self.db.pool())
            .delete_for_year(year)
            .await
    }
}
