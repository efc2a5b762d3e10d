use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A registered participant together with their in-progress round state.
///
/// `team = None` means the player is not assigned to a team. `score` is the
/// score being entered for the current round and goes back to 0 when the round
/// is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Player {
    pub uuid: Uuid,
    pub name: String,
    pub team: Option<i32>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            team: None,
            score: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.team.is_some()
    }
}

/// Row written by team randomization (bulk upsert keyed on `uuid`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlayerAssignment {
    pub uuid: Uuid,
    pub name: String,
    pub team: Option<i32>,
    pub score: i32,
}

/// Identity projection used by score aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlayerIdentity {
    pub uuid: Uuid,
    pub name: String,
}

impl From<&Player> for PlayerIdentity {
    fn from(player: &Player) -> Self {
        Self {
            uuid: player.uuid,
            name: player.name.clone(),
        }
    }
}

/// Roster display order: unassigned players first, then by team, then by name.
pub fn roster_order(a: &Player, b: &Player) -> Ordering {
    match (a.team, b.team) {
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (ta, tb) => ta.cmp(&tb).then_with(|| a.name.cmp(&b.name)),
    }
}

pub fn sort_roster(players: &mut [Player]) {
    players.sort_by(roster_order);
}
