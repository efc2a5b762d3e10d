use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A finalized round result. Rows are never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub player: Uuid,
    pub round: i32,
    pub score: f64,
    pub year: i32,
}

/// Which score rows an aggregation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreScope {
    Year(i32),
    AllTime,
}

impl ScoreScope {
    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Year(year) => Some(*year),
            Self::AllTime => None,
        }
    }

    pub fn includes(&self, year: i32) -> bool {
        self.year().is_none_or(|y| y == year)
    }
}

impl fmt::Display for ScoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "year {}", year),
            Self::AllTime => write!(f, "all time"),
        }
    }
}

/// Parses the `SCORE_SCOPE` setting; `year` resolves against the tournament year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSetting {
    TournamentYear,
    AllTime,
}

impl ScopeSetting {
    pub fn resolve(self, tournament_year: i32) -> ScoreScope {
        match self {
            Self::TournamentYear => ScoreScope::Year(tournament_year),
            Self::AllTime => ScoreScope::AllTime,
        }
    }
}

impl FromStr for ScopeSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Self::TournamentYear),
            "all" | "all_time" => Ok(Self::AllTime),
            other => Err(format!("unknown score scope '{}', expected 'year' or 'all'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_includes() {
        assert!(ScoreScope::Year(2025).includes(2025));
        assert!(!ScoreScope::Year(2025).includes(2024));
        assert!(ScoreScope::AllTime.includes(1999));
    }

    #[test]
    fn test_scope_setting_parse() {
        assert_eq!("year".parse(), Ok(ScopeSetting::TournamentYear));
        assert_eq!(" ALL ".parse(), Ok(ScopeSetting::AllTime));
        assert!("forever".parse::<ScopeSetting>().is_err());
        assert_eq!(ScopeSetting::TournamentYear.resolve(2024), ScoreScope::Year(2024));
    }
}
