// Integration tests for the projection engine's public API.

use runcast_core::{
    DailyAssignment, EngineConfig, EnvironmentFactor, EventRates, GameId, LinearWeights, PlayerId,
    PlayerSeasonProfile, TeamId,
};
use runcast_engine::lineup::{GroupMember, GroupProfiles};
use runcast_engine::matchup::blend_rates;
use runcast_engine::{project_slate, LeagueBaseline, SlateInputs};

fn profile(id: &str, pa: u32, counts: [u32; 6]) -> PlayerSeasonProfile {
    PlayerSeasonProfile {
        player_id: PlayerId::new(id),
        pa,
        strikeout: counts[0],
        walk: counts[1],
        single: counts[2],
        double: counts[3],
        triple: counts[4],
        home_run: counts[5],
    }
}

fn assignment(player: &str, team: &str, opp: &str, pa: f64) -> DailyAssignment {
    DailyAssignment {
        player_id: PlayerId::new(player),
        game_id: GameId::new("g1"),
        team_id: TeamId::new(team),
        opponent_team_id: TeamId::new(opp),
        projected_pa: pa,
    }
}

/// One batter against one starter; the league baseline comes from a
/// two-player population.
fn single_matchup(projected_pa: f64) -> SlateInputs {
    SlateInputs {
        season_batters: vec![
            profile("1", 600, [120, 60, 100, 30, 5, 25]),
            profile("2", 500, [110, 45, 80, 22, 3, 12]),
        ],
        season_pitchers: vec![profile("99", 650, [150, 50, 110, 25, 3, 15])],
        daily_batters: vec![assignment("1", "NYY", "BOS", projected_pa)],
        daily_pitchers: vec![assignment("99", "BOS", "NYY", 25.0)],
        environment: vec![EnvironmentFactor {
            player_id: PlayerId::new("1"),
            game_id: GameId::new("g1"),
            factor: 1.05,
        }],
    }
}

#[test]
fn single_matchup_end_to_end() {
    let config = EngineConfig::default();
    let first = project_slate(&single_matchup(4.3), &config).unwrap();
    let second = project_slate(&single_matchup(4.3), &config).unwrap();

    assert_eq!(first.batters, second.batters, "projection is not deterministic");
    assert_eq!(first.batters.len(), 1);

    let batter = &first.batters[0];
    assert!((batter.probabilities.sum() - 1.0).abs() <= 1e-9);
    assert!(batter.run_value.expected_runs > 0.0);
    assert!(!batter.opponent_fallback);

    assert_eq!(first.team_scores.len(), 1);
    assert_eq!(first.team_scores[0].expected_runs, batter.run_value.expected_runs);
    assert_eq!(first.game_totals.len(), 1);
    assert_eq!(first.game_totals[0].expected_runs, batter.run_value.expected_runs);
}

#[test]
fn one_row_season_tables_end_to_end() {
    let inputs = SlateInputs {
        season_batters: vec![profile("1", 600, [120, 60, 100, 30, 5, 25])],
        season_pitchers: vec![profile("99", 650, [150, 50, 110, 25, 3, 15])],
        daily_batters: vec![assignment("1", "NYY", "BOS", 4.3)],
        daily_pitchers: vec![assignment("99", "BOS", "NYY", 25.0)],
        environment: vec![EnvironmentFactor {
            player_id: PlayerId::new("1"),
            game_id: GameId::new("g1"),
            factor: 1.05,
        }],
    };
    let result = project_slate(&inputs, &EngineConfig::default()).unwrap();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    assert_eq!(result.batters.len(), 1);
    let batter = &result.batters[0];
    assert!((batter.probabilities.sum() - 1.0).abs() <= 1e-9);
    assert!(batter.run_value.expected_runs > 0.0);

    assert_eq!(result.team_scores.len(), 1);
    assert_eq!(result.team_scores[0].expected_runs, batter.run_value.expected_runs);
}

#[test]
fn doubling_projected_pa_doubles_expected_runs() {
    let config = EngineConfig::default();
    for pa in [1.0, 3.8, 4.3, 4.7] {
        let once = project_slate(&single_matchup(pa), &config).unwrap();
        let twice = project_slate(&single_matchup(pa * 2.0), &config).unwrap();
        assert_eq!(
            twice.batters[0].run_value.expected_runs,
            once.batters[0].run_value.expected_runs * 2.0
        );
    }
}

#[test]
fn league_average_matchup_reproduces_league_rates() {
    let population = vec![
        profile("1", 600, [120, 60, 100, 30, 5, 25]),
        profile("2", 500, [110, 45, 80, 22, 3, 12]),
        profile("3", 640, [150, 52, 115, 26, 1, 33]),
    ];
    let league = LeagueBaseline::from_population(&population);
    let blended = blend_rates(&league.rates, &league.rates, &league).unwrap();
    for o in runcast_core::Outcome::ALL {
        assert!((blended.get(o) - league.rate(o)).abs() < 1e-15);
    }
}

#[test]
fn missing_lineup_profile_equals_league_baseline() {
    let league = LeagueBaseline::from_rates(EventRates {
        k: 0.224,
        bb: 0.083,
        single: 0.142,
        double: 0.044,
        triple: 0.004,
        hr: 0.031,
    });
    let lineups = GroupProfiles::build(vec![(
        (GameId::new("g1"), TeamId::new("NYY")),
        GroupMember {
            player_id: PlayerId::new("1"),
            weight: 4.3,
            rates: league.rates,
            env_factor: 1.1,
        },
    )]);
    let resolved = lineups.resolve(&(GameId::new("g1"), TeamId::new("SEA")), &league);
    assert!(resolved.is_fallback());
    assert_eq!(resolved.profile().rates, league.rates);
    assert_eq!(resolved.profile().env_factor, 1.0);
}

#[test]
fn configured_weights_flow_through() {
    let zero = EngineConfig {
        linear_weights: LinearWeights {
            walk: 0.0,
            single: 0.0,
            double: 0.0,
            triple: 0.0,
            home_run: 0.0,
        },
        ..EngineConfig::default()
    };
    let result = project_slate(&single_matchup(4.3), &zero).unwrap();
    assert_eq!(result.batters[0].run_value.expected_runs, 0.0);
    assert_eq!(result.team_scores[0].expected_runs, 0.0);
}
