use std::collections::BTreeMap;

use storage::dto::player::{
    ConfirmRoundResponse, ImportScoresResponse, RemovePlayerResponse, RosterResponse,
};
use storage::services::{Confirmation, ScoreImportError, Tournament};
use uuid::Uuid;

/// Current roster with the derived team state
pub async fn roster(tournament: &Tournament, applied: bool) -> RosterResponse {
    let roster = &tournament.roster;
    RosterResponse {
        year: roster.year(),
        players: roster.players().await,
        teams: roster.teams_with_players().await.into_iter().collect(),
        team_averages: roster.team_averages().await,
        can_confirm: roster.are_all_team_scores_valid().await,
        applied,
    }
}

pub async fn add_player(tournament: &Tournament, name: &str) -> RosterResponse {
    let applied = tournament.roster.add_player(name.trim()).await.is_some();
    roster(tournament, applied).await
}

pub async fn remove_player(tournament: &Tournament, uuid: Uuid) -> RemovePlayerResponse {
    let outcome = tournament.roster.remove_player(uuid).await;
    RemovePlayerResponse {
        outcome,
        roster: roster(tournament, outcome.is_applied()).await,
    }
}

pub async fn update_score(tournament: &Tournament, uuid: Uuid, score: f64) -> RosterResponse {
    let applied = tournament.roster.update_score(uuid, score).await;
    roster(tournament, applied).await
}

pub async fn randomize_teams(tournament: &Tournament, team_count: u32) -> RosterResponse {
    let applied = tournament.roster.randomize_teams(team_count as usize).await;
    roster(tournament, applied).await
}

pub async fn reset_player_team(tournament: &Tournament, uuid: Uuid) -> RosterResponse {
    let applied = tournament.roster.reset_player_team(uuid).await;
    roster(tournament, applied).await
}

pub async fn reset_all(tournament: &Tournament) -> RosterResponse {
    let applied = tournament.roster.reset_all_scores_and_teams().await;
    roster(tournament, applied).await
}

pub async fn confirm_round(tournament: &Tournament) -> ConfirmRoundResponse {
    let confirmation = tournament.roster.confirm_and_save_scores().await;
    ConfirmRoundResponse {
        confirmation,
        roster: roster(tournament, matches!(confirmation, Confirmation::Saved { .. })).await,
    }
}

pub async fn import_scores(
    tournament: &Tournament,
    scores: &BTreeMap<String, u32>,
) -> Result<ImportScoresResponse, ScoreImportError> {
    let result = tournament.roster.apply_parsed_scores(scores).await?;
    Ok(ImportScoresResponse {
        result,
        roster: roster(tournament, true).await,
    })
}
