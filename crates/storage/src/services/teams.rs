use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::{Player, PlayerAssignment, Score};

/// Shuffles the whole roster and deals players into `team_count` teams.
///
/// Every player gets `team = (index mod team_count) + 1` and a zero score, so
/// team sizes differ by at most one. Returns nothing for `team_count == 0`.
pub fn assign_teams<R: Rng + ?Sized>(
    players: &[Player],
    team_count: usize,
    rng: &mut R,
) -> Vec<PlayerAssignment> {
    if team_count == 0 {
        return Vec::new();
    }

    let mut shuffled: Vec<&Player> = players.iter().collect();
    shuffled.shuffle(rng);

    shuffled
        .into_iter()
        .enumerate()
        .map(|(index, player)| PlayerAssignment {
            uuid: player.uuid,
            name: player.name.clone(),
            team: Some((index % team_count) as i32 + 1),
            score: 0,
        })
        .collect()
}

pub fn teams_with_players(players: &[Player]) -> BTreeSet<i32> {
    players.iter().filter_map(|p| p.team).collect()
}

/// Mean in-progress score of a team; 0 for an empty team.
pub fn team_average<'a>(members: impl IntoIterator<Item = &'a Player>) -> f64 {
    let (total, count) = members
        .into_iter()
        .fold((0i64, 0usize), |(total, count), p| (total + i64::from(p.score), count + 1));

    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

pub fn team_averages(players: &[Player]) -> BTreeMap<i32, f64> {
    teams_with_players(players)
        .into_iter()
        .map(|team| {
            let average = team_average(players.iter().filter(|p| p.team == Some(team)));
            (team, average)
        })
        .collect()
}

/// A round can be confirmed once two or more teams have members and every
/// assigned player has entered a positive score.
pub fn are_all_team_scores_valid(players: &[Player]) -> bool {
    teams_with_players(players).len() >= 2
        && players
            .iter()
            .filter(|p| p.is_assigned())
            .all(|p| p.score > 0)
}

/// One row per assigned player carrying their team's average.
pub fn round_scores(players: &[Player], round: i32, year: i32) -> Vec<Score> {
    let averages = team_averages(players);

    players
        .iter()
        .filter_map(|player| {
            let team = player.team?;
            Some(Score {
                player: player.uuid,
                round,
                score: averages.get(&team).copied().unwrap_or(0.0),
                year,
            })
        })
        .collect()
}

pub fn next_round(max_round: Option<i32>) -> i32 {
    max_round.map_or(1, |round| round + 1)
}

/// Turns a raw score entry into a storable value.
///
/// NaN, infinities and negatives are rejected; fractions are truncated the way
/// an integer input field would.
pub fn parse_score_input(score: f64) -> Option<i32> {
    if !score.is_finite() || score < 0.0 || score > f64::from(i32::MAX) {
        return None;
    }
    Some(score.trunc() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn player(name: &str, team: Option<i32>, score: i32) -> Player {
        Player {
            team,
            score,
            ..Player::new(name)
        }
    }

    #[test]
    fn test_assign_teams_balances_sizes() {
        let players: Vec<Player> = (0..7).map(|i| player(&format!("P{}", i), None, 4)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        for team_count in 1..=4 {
            let assignments = assign_teams(&players, team_count, &mut rng);
            assert_eq!(assignments.len(), players.len());

            let mut sizes = BTreeMap::new();
            for a in &assignments {
                let team = a.team.unwrap();
                assert!((1..=team_count as i32).contains(&team));
                assert_eq!(a.score, 0);
                *sizes.entry(team).or_insert(0) += 1;
            }
            let max = sizes.values().max().unwrap();
            let min = sizes.values().min().unwrap();
            assert!(max - min <= 1, "sizes {:?}", sizes);
        }
    }

    #[test]
    fn test_assign_teams_zero_count() {
        let players = vec![player("Wario", Some(2), 9)];
        assert!(assign_teams(&players, 0, &mut rand::thread_rng()).is_empty());
    }

    #[test]
    fn test_guard_needs_two_teams() {
        let one_team = vec![player("A", Some(1), 5), player("B", Some(1), 7)];
        assert!(!are_all_team_scores_valid(&one_team));

        let two_teams = vec![player("A", Some(1), 5), player("B", Some(2), 7), player("C", None, 0)];
        assert!(are_all_team_scores_valid(&two_teams));
    }

    #[test]
    fn test_guard_rejects_zero_score() {
        let players = vec![player("A", Some(1), 5), player("B", Some(2), 0)];
        assert!(!are_all_team_scores_valid(&players));
    }

    #[test]
    fn test_round_scores_use_team_average() {
        let players = vec![
            player("A", Some(1), 5),
            player("B", Some(1), 7),
            player("C", Some(2), 3),
            player("D", None, 0),
        ];

        let rows = round_scores(&players, 4, 2025);

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.round == 4 && r.year == 2025));
        assert_eq!(rows[0].score, 6.0);
        assert_eq!(rows[1].score, 6.0);
        assert_eq!(rows[2].score, 3.0);
    }

    #[test]
    fn test_team_average_of_empty_team() {
        assert_eq!(team_average(std::iter::empty::<&Player>()), 0.0);
    }

    #[test]
    fn test_next_round() {
        assert_eq!(next_round(None), 1);
        assert_eq!(next_round(Some(3)), 4);
    }

    #[test]
    fn test_parse_score_input() {
        assert_eq!(parse_score_input(f64::NAN), None);
        assert_eq!(parse_score_input(-1.0), None);
        assert_eq!(parse_score_input(f64::INFINITY), None);
        assert_eq!(parse_score_input(0.0), Some(0));
        assert_eq!(parse_score_input(42.9), Some(42));
    }
}
