use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Player;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchedScore {
    pub uuid: Uuid,
    pub name: String,
    /// The key as it came back from the parser.
    pub parsed_name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreMatch {
    pub matched: Vec<MatchedScore>,
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreImportError {
    #[error("No players are assigned to a team")]
    NoAssignedPlayers,

    #[error("None of the parsed names match an assigned player: {}", .unmatched.join(", "))]
    NoMatches { unmatched: Vec<String> },
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Matches parsed `name -> score` pairs against the assigned players,
/// ignoring case and surrounding whitespace.
///
/// Keys that match nobody are reported in `unmatched`; a result with no
/// match at all is an error.
pub fn match_parsed_scores(
    players: &[Player],
    parsed: &BTreeMap<String, u32>,
) -> Result<ScoreMatch, ScoreImportError> {
    let candidates: Vec<&Player> = players.iter().filter(|p| p.is_assigned()).collect();
    if candidates.is_empty() {
        return Err(ScoreImportError::NoAssignedPlayers);
    }

    let mut result = ScoreMatch::default();

    for (parsed_name, &score) in parsed {
        let key = normalize(parsed_name);
        let found = candidates.iter().find(|p| normalize(&p.name) == key);

        match found {
            Some(player) if !result.matched.iter().any(|m| m.uuid == player.uuid) => {
                result.matched.push(MatchedScore {
                    uuid: player.uuid,
                    name: player.name.clone(),
                    parsed_name: parsed_name.clone(),
                    score,
                });
            }
            _ => result.unmatched.push(parsed_name.clone()),
        }
    }

    if result.matched.is_empty() {
        return Err(ScoreImportError::NoMatches {
            unmatched: result.unmatched,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigned(name: &str) -> Player {
        Player {
            team: Some(1),
            ..Player::new(name)
        }
    }

    fn parsed(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(n, s)| (n.to_string(), *s)).collect()
    }

    #[test]
    fn test_case_insensitive_match_with_unmatched_keys() {
        let players = vec![assigned("Rosalina"), assigned("Dry Bones"), Player::new("Lakitu")];

        let result = match_parsed_scores(
            &players,
            &parsed(&[("ROSALINA", 42), (" dry bones ", 30), ("Lakitu", 12), ("Shy Guy", 7)]),
        )
        .unwrap();

        assert_eq!(result.matched.len(), 2);
        assert!(result.matched.iter().any(|m| m.name == "Rosalina" && m.score == 42));
        assert_eq!(result.unmatched, vec!["Lakitu".to_string(), "Shy Guy".to_string()]);
    }

    #[test]
    fn test_zero_matches_is_an_error() {
        let players = vec![assigned("Rosalina")];
        let err = match_parsed_scores(&players, &parsed(&[("Waluigi", 3)])).unwrap_err();
        assert_eq!(
            err,
            ScoreImportError::NoMatches {
                unmatched: vec!["Waluigi".to_string()]
            }
        );
    }

    #[test]
    fn test_no_assigned_players() {
        let players = vec![Player::new("Rosalina")];
        assert_eq!(
            match_parsed_scores(&players, &parsed(&[("Rosalina", 3)])),
            Err(ScoreImportError::NoAssignedPlayers)
        );
    }
}
