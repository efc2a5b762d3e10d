use std::sync::Arc;

use tokio::task::JoinHandle;

use super::cups::CupManager;
use super::roster::RosterManager;
use super::scoreboard::Scoreboard;
use super::sync;
use crate::models::ScoreScope;
use crate::store::Store;

/// Shared state of one tournament year: roster, cups and standings over a
/// single store.
pub struct Tournament {
    pub year: i32,
    pub roster: RosterManager,
    pub cups: CupManager,
    pub scoreboard: Arc<Scoreboard>,
    store: Arc<dyn Store>,
}

impl Tournament {
    pub fn new(store: Arc<dyn Store>, year: i32, scope: ScoreScope) -> Self {
        let scoreboard = Arc::new(Scoreboard::new(store.clone(), scope));
        Self {
            year,
            roster: RosterManager::new(store.clone(), year, scoreboard.clone()),
            cups: CupManager::new(store.clone(), year),
            scoreboard,
            store,
        }
    }

    /// Builds the tournament and fills every mirror once.
    pub async fn load(store: Arc<dyn Store>, year: i32, scope: ScoreScope) -> Arc<Self> {
        let tournament = Arc::new(Self::new(store, year, scope));
        tournament.refresh_all().await;
        tracing::info!(year, %scope, "Tournament loaded");
        tournament
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn refresh_all(&self) {
        self.roster.refresh().await;
        self.cups.refresh().await;
        self.scoreboard.refresh().await;
    }

    /// Keeps the mirrors in step with the store's change feed.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let changes = self.store.subscribe();
        tokio::spawn(sync::run(self.clone(), changes))
    }
}
