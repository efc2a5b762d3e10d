use std::sync::Arc;

use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;

use super::tournament::Tournament;
use crate::store::{ChangeEvent, Table};

/// Refetches whatever a change touched. Runs until the feed closes.
pub async fn run(tournament: Arc<Tournament>, mut changes: Receiver<ChangeEvent>) {
    loop {
        match changes.recv().await {
            Ok(event) => apply(&tournament, event.table).await,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Change feed lagged, reloading everything");
                tournament.refresh_all().await;
            }
            Err(RecvError::Closed) => {
                tracing::info!("Change feed closed");
                break;
            }
        }
    }
}

pub async fn apply(tournament: &Tournament, table: Table) {
    tracing::debug!(?table, "Refreshing after change");
    match table {
        Table::Players => {
            tournament.roster.refresh().await;
            tournament.scoreboard.refresh().await;
        }
        Table::Scores => {
            tournament.scoreboard.refresh().await;
        }
        Table::CupsRounds => {
            tournament.cups.refresh().await;
        }
    }
}
