use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Player, PlayerAssignment, PlayerIdentity};

const PLAYER_COLUMNS: &str = "uuid, name, team, score, created_at, updated_at";

pub struct PlayerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List players, unassigned first, then by team and name
    pub async fn list(&self) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(&format!(
            "SELECT {} FROM players ORDER BY team ASC NULLS FIRST, name ASC",
            PLAYER_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(players)
    }

    pub async fn list_identities(&self) -> Result<Vec<PlayerIdentity>> {
        let identities = sqlx::query_as::<_, PlayerIdentity>("SELECT uuid, name FROM players")
            .fetch_all(self.pool)
            .await?;

        Ok(identities)
    }

    pub async fn create(&self, name: &str) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(&format!(
            "INSERT INTO players (name) VALUES ($1) RETURNING {}",
            PLAYER_COLUMNS
        ))
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(player)
    }

    /// Delete a player that is not on a team
    pub async fn delete(&self, uuid: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM players WHERE uuid = $1 AND team IS NULL")
            .bind(uuid)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM players WHERE uuid = $1)")
                    .bind(uuid)
                    .fetch_one(self.pool)
                    .await?;

            if exists {
                return Err(StorageError::ConstraintViolation(format!(
                    "player {} is assigned to a team",
                    uuid
                )));
            }
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    pub async fn update_score(&self, uuid: Uuid, score: i32) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(&format!(
            r#"
            UPDATE players
            SET score = $2, updated_at = now()
            WHERE uuid = $1
            RETURNING {}
            "#,
            PLAYER_COLUMNS
        ))
        .bind(uuid)
        .bind(score)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(player)
    }

    pub async fn set_team(&self, uuid: Uuid, team: Option<i32>, score: i32) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(&format!(
            r#"
            UPDATE players
            SET team = $2, score = $3, updated_at = now()
            WHERE uuid = $1
            RETURNING {}
            "#,
            PLAYER_COLUMNS
        ))
        .bind(uuid)
        .bind(team)
        .bind(score)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(player)
    }

    /// Upsert every assignment in one transaction
    pub async fn upsert_many(&self, assignments: &[PlayerAssignment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for assignment in assignments {
            sqlx::query(
                r#"
                INSERT INTO players (uuid, name, team, score)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (uuid) DO UPDATE
                SET name = EXCLUDED.name,
                    team = EXCLUDED.team,
                    score = EXCLUDED.score,
                    updated_at = now()
                "#,
            )
            .bind(assignment.uuid)
            .bind(&assignment.name)
            .bind(assignment.team)
            .bind(assignment.score)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn reset_many(&self, uuids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET team = NULL, score = 0, updated_at = now()
            WHERE uuid = ANY($1)
            "#,
        )
        .bind(uuids)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
