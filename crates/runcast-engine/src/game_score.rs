// Team and game run totals from per-batter projections.

use crate::engine::BatterProjection;
use runcast_core::{GameId, PlayerId, TeamGameKey, TeamId};
use std::collections::BTreeMap;

/// Expected runs for one team in one game.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamGameProjection {
    pub game_id: GameId,
    pub team_id: TeamId,
    pub expected_runs: f64,
    pub batters: usize,
}

/// Expected combined runs for both teams in one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameTotal {
    pub game_id: GameId,
    pub expected_runs: f64,
    pub teams: usize,
}

/// Sum batter expected runs per (game, team). Batters are summed in player
/// id order so the totals do not depend on row order. Output is sorted by
/// key; empty input gives empty output.
pub fn team_totals(batters: &[BatterProjection]) -> Vec<TeamGameProjection> {
    let mut grouped: BTreeMap<TeamGameKey, Vec<(&PlayerId, f64)>> = BTreeMap::new();
    for b in batters {
        grouped
            .entry((b.game_id.clone(), b.team_id.clone()))
            .or_default()
            .push((&b.player_id, b.run_value.expected_runs));
    }

    grouped
        .into_iter()
        .map(|((game_id, team_id), mut rows)| {
            rows.sort_by(|a, b| a.0.cmp(b.0));
            TeamGameProjection {
                game_id,
                team_id,
                expected_runs: rows.iter().map(|(_, runs)| runs).sum(),
                batters: rows.len(),
            }
        })
        .collect()
}

/// Sum team totals per game, in team id order.
pub fn game_totals(teams: &[TeamGameProjection]) -> Vec<GameTotal> {
    let mut grouped: BTreeMap<&GameId, Vec<(&TeamId, f64)>> = BTreeMap::new();
    for t in teams {
        grouped
            .entry(&t.game_id)
            .or_default()
            .push((&t.team_id, t.expected_runs));
    }

    grouped
        .into_iter()
        .map(|(game_id, mut rows)| {
            rows.sort_by(|a, b| a.0.cmp(b.0));
            GameTotal {
                game_id: game_id.clone(),
                expected_runs: rows.iter().map(|(_, runs)| runs).sum(),
                teams: rows.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_value::RunValue;
    use runcast_core::OutcomeProbabilities;

    fn batter(player: &str, game: &str, team: &str, runs: f64) -> BatterProjection {
        BatterProjection {
            player_id: PlayerId::new(player),
            game_id: GameId::new(game),
            team_id: TeamId::new(team),
            opponent_team_id: TeamId::new("OPP"),
            projected_pa: 4.0,
            env_factor: 1.0,
            probabilities: OutcomeProbabilities {
                k: 0.0,
                bb: 0.0,
                single: 0.0,
                double: 0.0,
                triple: 0.0,
                hr: 0.0,
                out: 1.0,
            },
            run_value: RunValue {
                runs_per_pa: runs / 4.0,
                expected_runs: runs,
            },
            opponent_fallback: false,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(team_totals(&[]).is_empty());
        assert!(game_totals(&[]).is_empty());
    }

    #[test]
    fn sums_per_team_and_game() {
        let totals = team_totals(&[
            batter("1", "g1", "NYY", 0.5),
            batter("2", "g1", "NYY", 0.25),
            batter("3", "g1", "BOS", 0.4),
            batter("1", "g2", "NYY", 0.6),
        ]);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].game_id, GameId::new("g1"));
        assert_eq!(totals[0].team_id, TeamId::new("BOS"));
        assert_eq!(totals[0].expected_runs, 0.4);
        assert_eq!(totals[1].team_id, TeamId::new("NYY"));
        assert_eq!(totals[1].expected_runs, 0.75);
        assert_eq!(totals[1].batters, 2);
        assert_eq!(totals[2].game_id, GameId::new("g2"));

        let games = game_totals(&totals);
        assert_eq!(games.len(), 2);
        assert!((games[0].expected_runs - 1.15).abs() < 1e-12);
        assert_eq!(games[0].teams, 2);
        assert_eq!(games[1].expected_runs, 0.6);
    }

    #[test]
    fn totals_do_not_depend_on_row_order() {
        let mut rows: Vec<BatterProjection> = (0..9)
            .map(|i| batter(&i.to_string(), "g1", "NYY", 0.1 + i as f64 * 0.037))
            .collect();
        let forward = team_totals(&rows);
        rows.reverse();
        let reversed = team_totals(&rows);
        assert_eq!(forward, reversed);
    }
}
