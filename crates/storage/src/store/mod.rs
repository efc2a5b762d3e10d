//! Persistent store adapter.
//!
//! The managers only see these traits: row CRUD over `players`, `scores` and
//! `cups_rounds`, plus a change feed that announces which table changed.
//! Subscribers are expected to refetch, not to patch their caches from the
//! event payload.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CupRound, Player, PlayerAssignment, PlayerIdentity, Score, ScoreScope};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Capacity of the change broadcast channel. Slow subscribers lag and resync.
pub const CHANGE_FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Players,
    Scores,
    CupsRounds,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Players, Table::Scores, Table::CupsRounds];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(table: Table, kind: ChangeKind) -> Self {
        Self { table, kind }
    }
}

#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// All players, unassigned first, then by team, then by name.
    async fn list_players(&self) -> Result<Vec<Player>>;

    async fn list_player_identities(&self) -> Result<Vec<PlayerIdentity>>;

    async fn insert_player(&self, name: &str) -> Result<Player>;

    /// Deletes an unassigned player and their score rows. A player on a team
    /// is refused with `ConstraintViolation`.
    async fn delete_player(&self, uuid: Uuid) -> Result<()>;

    async fn update_player_score(&self, uuid: Uuid, score: i32) -> Result<Player>;

    async fn set_player_team(&self, uuid: Uuid, team: Option<i32>, score: i32) -> Result<Player>;

    async fn upsert_players(&self, assignments: &[PlayerAssignment]) -> Result<()>;

    /// Clears team and score for the given players.
    async fn reset_players(&self, uuids: &[Uuid]) -> Result<u64>;
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn list_scores(&self, scope: ScoreScope) -> Result<Vec<Score>>;

    async fn max_round(&self, year: i32) -> Result<Option<i32>>;

    /// Writes all rows or none.
    async fn insert_scores(&self, rows: &[Score]) -> Result<()>;

    async fn has_scores_for_round(&self, year: i32, round: i32) -> Result<bool>;

    /// Distinct years that have score rows, ascending.
    async fn list_years(&self) -> Result<Vec<i32>>;
}

#[async_trait]
pub trait CupRoundStore: Send + Sync {
    async fn list_cup_rounds(&self, year: i32) -> Result<Vec<CupRound>>;

    async fn insert_cup_round(&self, row: &CupRound) -> Result<()>;

    async fn delete_cup_round(&self, year: i32, cup: &str) -> Result<()>;

    async fn delete_cup_rounds(&self, year: i32) -> Result<u64>;
}

pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// Everything the managers need from a backing store.
pub trait Store: PlayerStore + ScoreStore + CupRoundStore + ChangeFeed {}

impl<T> Store for T where T: PlayerStore + ScoreStore + CupRoundStore + ChangeFeed {}
