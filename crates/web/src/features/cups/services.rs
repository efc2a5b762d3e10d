use storage::dto::cup::{CupActionResponse, CupsResponse};
use storage::error::Result;
use storage::models::max_round;
use storage::services::{CupToggle, Tournament, load_cups};

pub async fn live_cups(tournament: &Tournament) -> CupsResponse {
    let cups = tournament.cups.cups().await;
    CupsResponse {
        year: tournament.cups.year(),
        max_round: max_round(&cups),
        cups,
    }
}

/// Live mirror for the running year, a one-off read for any other year.
pub async fn cups_for_year(tournament: &Tournament, year: Option<i32>) -> Result<CupsResponse> {
    match year {
        Some(year) if year != tournament.year => {
            let cups = load_cups(tournament.store().as_ref(), year).await?;
            Ok(CupsResponse {
                year,
                max_round: max_round(&cups),
                cups,
            })
        }
        _ => Ok(live_cups(tournament).await),
    }
}

pub async fn random_cup(tournament: &Tournament) -> CupActionResponse {
    let result = tournament.cups.select_random_cup().await;
    CupActionResponse::from_result(result, live_cups(tournament).await)
}

pub async fn assign_cup(tournament: &Tournament, slug: &str) -> CupActionResponse {
    let result = tournament.cups.assign_cup(slug).await;
    CupActionResponse::from_result(result, live_cups(tournament).await)
}

pub async fn unassign_cup(tournament: &Tournament, slug: &str) -> CupActionResponse {
    let result = tournament.cups.unassign_cup(slug).await;
    CupActionResponse::from_result(result, live_cups(tournament).await)
}

pub async fn toggle_cup(tournament: &Tournament, slug: &str) -> CupToggle {
    tournament.cups.toggle_cup(slug).await
}

pub async fn reset_all_cups(tournament: &Tournament) -> CupActionResponse {
    let applied = tournament.cups.reset_all_cups().await;
    CupActionResponse {
        applied,
        cup: None,
        reason: None,
        state: live_cups(tournament).await,
    }
}
