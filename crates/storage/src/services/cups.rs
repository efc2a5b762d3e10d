use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::{Cup, CupRound, find_cup, join_cups, max_round};
use crate::store::Store;

/// Why a cup action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CupRejection {
    #[error("Unknown cup")]
    UnknownCup,
    #[error("Cup is already assigned to a round")]
    AlreadyPlayed,
    #[error("Every cup has already been played")]
    NoneAvailable,
    #[error("Cup is not assigned to a round")]
    NotPlayed,
    #[error("Only the most recent round can be unassigned")]
    NotLatest,
    #[error("Scores were already recorded for that round")]
    Scored,
    #[error("The store rejected the change")]
    StoreFailure,
}

/// What clicking a cup should lead to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CupToggle {
    ConfirmAssign { cup: Cup, round: i32 },
    ConfirmUnassign { cup: Cup },
    Rejected { reason: CupRejection },
}

/// Catalog joined with this year's assignments. Unknown rows are dropped.
pub async fn load_cups(store: &dyn Store, year: i32) -> Result<Vec<Cup>> {
    let rows = store.list_cup_rounds(year).await?;
    Ok(join_cups(&rows))
}

/// Keeps the cup catalog of one tournament year in sync with `cups_rounds`.
pub struct CupManager {
    store: Arc<dyn Store>,
    year: i32,
    cups: RwLock<Vec<Cup>>,
}

impl CupManager {
    pub fn new(store: Arc<dyn Store>, year: i32) -> Self {
        Self {
            store,
            year,
            cups: RwLock::new(join_cups(&[])),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub async fn cups(&self) -> Vec<Cup> {
        self.cups.read().await.clone()
    }

    pub async fn max_round(&self) -> i32 {
        max_round(&self.cups.read().await)
    }

    pub async fn refresh(&self) -> bool {
        match load_cups(self.store.as_ref(), self.year).await {
            Ok(cups) => {
                *self.cups.write().await = cups;
                true
            }
            Err(e) => {
                tracing::error!("Failed to load cups for {}: {}", self.year, e);
                false
            }
        }
    }

    /// Picks a uniformly random unplayed cup and assigns it to the next round.
    pub async fn select_random_cup(&self) -> std::result::Result<Cup, CupRejection> {
        let slug = {
            let cups = self.cups.read().await;
            let unplayed: Vec<&Cup> = cups.iter().filter(|c| !c.is_played()).collect();
            unplayed
                .choose(&mut rand::thread_rng())
                .map(|c| c.cup.clone())
                .ok_or(CupRejection::NoneAvailable)?
        };

        self.assign_cup(&slug).await
    }

    /// Assigns `slug` to the next round and returns the updated cup.
    pub async fn assign_cup(&self, slug: &str) -> std::result::Result<Cup, CupRejection> {
        let (cup, round) = self.next_assignment(slug).await?;

        let row = CupRound {
            year: self.year,
            cup: cup.cup.clone(),
            round,
        };
        if let Err(e) = self.store.insert_cup_round(&row).await {
            tracing::error!("Failed to assign cup {} to round {}: {}", slug, round, e);
            return Err(CupRejection::StoreFailure);
        }

        tracing::info!(year = self.year, cup = slug, round, "Cup assigned");
        self.refresh().await;
        Ok(Cup {
            round: Some(round),
            ..cup
        })
    }

    /// Checks whether `slug` can be unassigned without touching the store's rows.
    pub async fn can_unassign(&self, slug: &str) -> std::result::Result<Cup, CupRejection> {
        let cups = self.cups().await;
        let cup = cups
            .iter()
            .find(|c| c.cup == slug)
            .cloned()
            .ok_or(CupRejection::UnknownCup)?;

        let round = cup.round.ok_or(CupRejection::NotPlayed)?;
        if round != max_round(&cups) {
            return Err(CupRejection::NotLatest);
        }

        match self.store.has_scores_for_round(self.year, round).await {
            Ok(false) => Ok(cup),
            Ok(true) => Err(CupRejection::Scored),
            Err(e) => {
                tracing::error!("Failed to check scores for round {}: {}", round, e);
                Err(CupRejection::StoreFailure)
            }
        }
    }

    /// Removes the latest cup assignment if no scores reference its round.
    pub async fn unassign_cup(&self, slug: &str) -> std::result::Result<Cup, CupRejection> {
        let cup = self.can_unassign(slug).await?;

        if let Err(e) = self.store.delete_cup_round(self.year, &cup.cup).await {
            tracing::error!("Failed to unassign cup {}: {}", slug, e);
            return Err(CupRejection::StoreFailure);
        }

        tracing::info!(year = self.year, cup = slug, "Cup unassigned");
        self.refresh().await;
        Ok(Cup { round: None, ..cup })
    }

    /// Decides what a click on `slug` means: assign when unplayed, unassign
    /// when it is the latest unscored round, refuse otherwise.
    pub async fn toggle_cup(&self, slug: &str) -> CupToggle {
        let is_played = {
            let cups = self.cups.read().await;
            match cups.iter().find(|c| c.cup == slug) {
                Some(cup) => cup.is_played(),
                None => {
                    return CupToggle::Rejected {
                        reason: CupRejection::UnknownCup,
                    };
                }
            }
        };

        let outcome = if is_played {
            self.can_unassign(slug)
                .await
                .map(|cup| CupToggle::ConfirmUnassign { cup })
        } else {
            self.next_assignment(slug)
                .await
                .map(|(cup, round)| CupToggle::ConfirmAssign { cup, round })
        };

        outcome.unwrap_or_else(|reason| CupToggle::Rejected { reason })
    }

    /// Deletes every assignment of the tournament year.
    pub async fn reset_all_cups(&self) -> bool {
        match self.store.delete_cup_rounds(self.year).await {
            Ok(removed) => {
                tracing::info!(year = self.year, removed, "Cups reset");
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to reset cups for {}: {}", self.year, e);
                false
            }
        }
    }

    async fn next_assignment(&self, slug: &str) -> std::result::Result<(Cup, i32), CupRejection> {
        if find_cup(slug).is_none() {
            return Err(CupRejection::UnknownCup);
        }

        let cups = self.cups.read().await;
        if cups.iter().all(|c| c.is_played()) {
            return Err(CupRejection::NoneAvailable);
        }

        let cup = cups
            .iter()
            .find(|c| c.cup == slug)
            .cloned()
            .ok_or(CupRejection::UnknownCup)?;
        if cup.is_played() {
            return Err(CupRejection::AlreadyPlayed);
        }

        Ok((cup, max_round(&cups) + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CUPS, Player, Score};
    use crate::store::{CupRoundStore, MemoryStore, ScoreStore};

    async fn manager_with(store: Arc<MemoryStore>) -> CupManager {
        let manager = CupManager::new(store, 2025);
        assert!(manager.refresh().await);
        manager
    }

    #[tokio::test]
    async fn test_assign_uses_next_round() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone()).await;

        let first = manager.assign_cup("mushroom").await.unwrap();
        let second = manager.assign_cup("flower").await.unwrap();

        assert_eq!(first.round, Some(1));
        assert_eq!(second.round, Some(2));
        assert_eq!(manager.max_round().await, 2);
        assert_eq!(
            manager.assign_cup("mushroom").await,
            Err(CupRejection::AlreadyPlayed)
        );
        assert_eq!(manager.assign_cup("nope").await, Err(CupRejection::UnknownCup));
    }

    #[tokio::test]
    async fn test_random_cup_assigns_next_round() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone()).await;
        assert_eq!(manager.max_round().await, 0);

        let picked = manager.select_random_cup().await.unwrap();

        assert_eq!(picked.round, Some(1));
        assert_eq!(manager.max_round().await, 1);
        let rows = store.list_cup_rounds(2025).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cup, picked.cup);
    }

    #[tokio::test]
    async fn test_random_cup_is_unplayed() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone()).await;

        for cup in CUPS.iter().skip(1) {
            manager.assign_cup(cup.cup).await.unwrap();
        }

        let picked = manager.select_random_cup().await.unwrap();
        assert_eq!(picked.cup, CUPS[0].cup);
        assert_eq!(picked.round, Some(CUPS.len() as i32));

        assert_eq!(
            manager.select_random_cup().await,
            Err(CupRejection::NoneAvailable)
        );
        assert_eq!(
            manager.assign_cup(CUPS[0].cup).await,
            Err(CupRejection::NoneAvailable)
        );
    }

    #[tokio::test]
    async fn test_unassign_rules() {
        let store = Arc::new(MemoryStore::new());
        let mario = Player::new("Mario");
        store.seed(vec![mario.clone()], vec![], vec![]).await;
        let manager = manager_with(store.clone()).await;

        manager.assign_cup("mushroom").await.unwrap();
        manager.assign_cup("flower").await.unwrap();

        assert_eq!(manager.unassign_cup("mushroom").await, Err(CupRejection::NotLatest));
        assert_eq!(manager.unassign_cup("star").await, Err(CupRejection::NotPlayed));

        store
            .insert_scores(&[Score {
                player: mario.uuid,
                round: 2,
                score: 5.0,
                year: 2025,
            }])
            .await
            .unwrap();
        assert_eq!(manager.unassign_cup("flower").await, Err(CupRejection::Scored));

        assert!(manager.unassign_cup("mushroom").await.is_err());
        assert_eq!(manager.max_round().await, 2);
    }

    #[tokio::test]
    async fn test_unassign_latest_unscored() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone()).await;

        manager.assign_cup("mushroom").await.unwrap();
        manager.assign_cup("flower").await.unwrap();

        let cup = manager.unassign_cup("flower").await.unwrap();
        assert_eq!(cup.round, None);
        assert_eq!(manager.max_round().await, 1);
        assert_eq!(manager.assign_cup("star").await.unwrap().round, Some(2));
    }

    #[tokio::test]
    async fn test_toggle_cup() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone()).await;

        match manager.toggle_cup("star").await {
            CupToggle::ConfirmAssign { cup, round } => {
                assert_eq!(cup.cup, "star");
                assert_eq!(round, 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        manager.assign_cup("star").await.unwrap();
        assert!(matches!(
            manager.toggle_cup("star").await,
            CupToggle::ConfirmUnassign { .. }
        ));
        assert_eq!(
            manager.toggle_cup("rainbow").await,
            CupToggle::Rejected {
                reason: CupRejection::UnknownCup
            }
        );
    }

    #[tokio::test]
    async fn test_reset_only_touches_year() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                vec![],
                vec![],
                vec![CupRound {
                    year: 2024,
                    cup: "star".to_string(),
                    round: 1,
                }],
            )
            .await;
        let manager = manager_with(store.clone()).await;
        manager.assign_cup("leaf").await.unwrap();

        assert!(manager.reset_all_cups().await);
        assert_eq!(manager.max_round().await, 0);
        assert_eq!(store.list_cup_rounds(2024).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_state() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone()).await;
        manager.assign_cup("leaf").await.unwrap();

        store.set_offline(true);
        assert_eq!(manager.assign_cup("star").await, Err(CupRejection::StoreFailure));
        assert!(!manager.reset_all_cups().await);
        assert_eq!(manager.max_round().await, 1);
    }
}
