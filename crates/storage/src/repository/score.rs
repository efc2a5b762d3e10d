use sqlx::{PgPool, QueryBuilder};

use crate::error::{Result, StorageError};
use crate::models::{Score, ScoreScope};

pub struct ScoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScoreRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: ScoreScope) -> Result<Vec<Score>> {
        let mut query = QueryBuilder::new("SELECT player, round, score, year FROM scores WHERE 1=1");

        if let Some(year) = scope.year() {
            query.push(" AND year = ");
            query.push_bind(year);
        }

        query.push(" ORDER BY year, round");

        let scores: Vec<Score> = query.build_query_as().fetch_all(self.pool).await?;
        Ok(scores)
    }

    pub async fn max_round(&self, year: i32) -> Result<Option<i32>> {
        let round = sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(round) FROM scores WHERE year = $1")
            .bind(year)
            .fetch_one(self.pool)
            .await?;

        Ok(round)
    }

    /// Insert a whole round in one transaction
    pub async fn insert_many(&self, rows: &[Score]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            let inserted = sqlx::query(
                r#"
                INSERT INTO scores (player, round, score, year)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(row.player)
            .bind(row.round)
            .bind(row.score)
            .bind(row.year)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                let err = StorageError::from(e);
                if err.is_unique_violation() {
                    return Err(StorageError::ConstraintViolation(format!(
                        "round {} of {} already has a score for player {}",
                        row.round, row.year, row.player
                    )));
                }
                if err.is_foreign_key_violation() {
                    return Err(StorageError::ConstraintViolation(format!(
                        "player {} does not exist",
                        row.player
                    )));
                }
                return Err(err);
            }
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn exists_for_round(&self, year: i32, round: i32) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM scores WHERE year = $1 AND round = $2)",
        )
        .bind(year)
        .bind(round)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn list_years(&self) -> Result<Vec<i32>> {
        let years = sqlx::query_scalar::<_, i32>("SELECT DISTINCT year FROM scores ORDER BY year")
            .fetch_all(self.pool)
            .await?;

        Ok(years)
    }
}
