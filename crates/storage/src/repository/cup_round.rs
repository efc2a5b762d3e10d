use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::CupRound;

pub struct CupRoundRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CupRoundRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_year(&self, year: i32) -> Result<Vec<CupRound>> {
        let rows = sqlx::query_as::<_, CupRound>(
            r#"
            SELECT year, cup, round
            FROM cups_rounds
            WHERE year = $1
            ORDER BY round DESC
            "#,
        )
        .bind(year)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create(&self, row: &CupRound) -> Result<()> {
        let result = sqlx::query("INSERT INTO cups_rounds (year, cup, round) VALUES ($1, $2, $3)")
            .bind(row.year)
            .bind(&row.cup)
            .bind(row.round)
            .execute(self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = StorageError::from(e);
                if err.is_unique_violation() {
                    Err(StorageError::ConstraintViolation(format!(
                        "cup '{}' or round {} is already taken in {}",
                        row.cup, row.round, row.year
                    )))
                } else {
                    Err(err)
                }
            }
        }
    }

    pub async fn delete(&self, year: i32, cup: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM cups_rounds WHERE year = $1 AND cup = $2")
            .bind(year)
            .bind(cup)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    pub async fn delete_for_year(&self, year: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cups_rounds WHERE year = $1")
            .bind(year)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
