use storage::dto::score::{LiveScoresResponse, ProgressionResponse, YearsResponse};
use storage::error::Result;
use storage::models::ScoreScope;
use storage::services::aggregation::rounds_played;
use storage::services::{
    ComparisonMode, ProgressionView, Tournament, YearView, available_years, load_player_scores,
    load_year_view, progression,
};

pub async fn live_scores(tournament: &Tournament) -> LiveScoresResponse {
    LiveScoresResponse {
        scope: tournament.scoreboard.scope().to_string(),
        player_scores: tournament.scoreboard.player_scores().await,
    }
}

pub async fn years(tournament: &Tournament) -> Result<YearsResponse> {
    let years = available_years(tournament.store().as_ref(), tournament.year).await?;
    Ok(YearsResponse {
        current_year: tournament.year,
        years,
    })
}

pub async fn standings(
    tournament: &Tournament,
    year: Option<i32>,
    mode: ComparisonMode,
) -> Result<YearView> {
    load_year_view(
        tournament.store().as_ref(),
        year.unwrap_or(tournament.year),
        tournament.year,
        mode,
    )
    .await
}

pub async fn progression_for_year(
    tournament: &Tournament,
    year: Option<i32>,
    view: ProgressionView,
) -> Result<ProgressionResponse> {
    let year = year.unwrap_or(tournament.year);
    let player_scores =
        load_player_scores(tournament.store().as_ref(), ScoreScope::Year(year)).await?;

    Ok(ProgressionResponse {
        year,
        view,
        rounds: rounds_played(&player_scores),
        series: progression(&player_scores, view),
    })
}
