// Single-pass slate projection.
//
// Pipeline:
// 1. League baseline from the season batter population.
// 2. Season rates for batters and pitchers.
// 3. De-duplicate daily assignments per (player, game).
// 4. Resolve every batter's environment factor (fatal if any are missing).
// 5. Group profiles: opposing staff per batting team, lineup per team.
// 6. Batter rows: log5 vs opposing staff, environment, normalize, run value.
// 7. Pitcher rows: log5 vs faced lineup, lineup environment, normalize,
//    run value over the lineup's plate appearances.
// 8. Team and game totals.

use crate::environment::{apply_environment, EnvironmentTable};
use crate::game_score::{game_totals, team_totals, GameTotal, TeamGameProjection};
use crate::lineup::{GroupMember, GroupProfiles, Resolved};
use crate::matchup::blend_rates;
use crate::normalize::normalize;
use crate::rates::{LeagueBaseline, RateTable, SeasonRates};
use crate::run_value::{run_value, RunValue};
use runcast_core::{
    DailyAssignment, Diagnostic, Diagnostics, EngineConfig, EnvironmentFactor, EventRates,
    GameId, OutcomeProbabilities, PlayerGameKey, PlayerId, PlayerRole, PlayerSeasonProfile,
    ProjectionError, TeamGameKey, TeamId,
};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// The four input tables, fully materialized.
#[derive(Debug, Clone, Default)]
pub struct SlateInputs {
    pub season_batters: Vec<PlayerSeasonProfile>,
    pub season_pitchers: Vec<PlayerSeasonProfile>,
    pub daily_batters: Vec<DailyAssignment>,
    pub daily_pitchers: Vec<DailyAssignment>,
    pub environment: Vec<EnvironmentFactor>,
}

/// One batter's outcome distribution and run value for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct BatterProjection {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub team_id: TeamId,
    pub opponent_team_id: TeamId,
    pub projected_pa: f64,
    pub env_factor: f64,
    pub probabilities: OutcomeProbabilities,
    pub run_value: RunValue,
    /// True when the opposing staff could not be resolved and league
    /// baseline rates stood in.
    pub opponent_fallback: bool,
}

/// One pitcher's outcome distribution against the opposing lineup.
#[derive(Debug, Clone, PartialEq)]
pub struct PitcherProjection {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub team_id: TeamId,
    pub opponent_team_id: TeamId,
    pub pa: f64,
    /// Plate appearances the run value is taken over: the faced lineup's
    /// total, or `pa` when the lineup fell back to the baseline.
    pub faced_pa: f64,
    pub env_factor: f64,
    pub probabilities: OutcomeProbabilities,
    pub run_value: RunValue,
    pub lineup_fallback: bool,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct SlateProjection {
    pub league: LeagueBaseline,
    pub batters: Vec<BatterProjection>,
    pub pitchers: Vec<PitcherProjection>,
    pub team_scores: Vec<TeamGameProjection>,
    pub game_totals: Vec<GameTotal>,
    pub diagnostics: Vec<Diagnostic>,
}

// ---------------------------------------------------------------------------
// Pipeline helpers
// ---------------------------------------------------------------------------

/// Keep one row per (player, game): the largest projected PA, first seen on
/// ties. Output keeps first-seen order.
pub fn dedupe_assignments(
    rows: &[DailyAssignment],
    role: PlayerRole,
    diagnostics: &mut Diagnostics,
) -> Vec<DailyAssignment> {
    let mut order: Vec<PlayerGameKey> = Vec::new();
    let mut best: BTreeMap<PlayerGameKey, (DailyAssignment, usize)> = BTreeMap::new();

    for row in rows {
        let key = row.key();
        match best.get_mut(&key) {
            Some((kept, count)) => {
                *count += 1;
                if row.projected_pa > kept.projected_pa {
                    *kept = row.clone();
                }
            }
            None => {
                order.push(key.clone());
                best.insert(key, (row.clone(), 1));
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| best.remove(&key))
        .map(|(kept, count)| {
            if count > 1 {
                diagnostics.record(Diagnostic::DuplicateAssignment {
                    role,
                    player_id: kept.player_id.clone(),
                    game_id: kept.game_id.clone(),
                    rows: count,
                    kept_pa: kept.projected_pa,
                });
            }
            kept
        })
        .collect()
}

/// Season rates for a daily player. A player with no season row, or with a
/// row of zero PA, is reported once and treated as having no data.
fn lookup_rates(
    table: &RateTable,
    role: PlayerRole,
    player_id: &PlayerId,
    reported: &mut HashSet<(PlayerRole, PlayerId)>,
    diagnostics: &mut Diagnostics,
) -> SeasonRates {
    let (rates, diagnostic) = match table.get(player_id) {
        Some(rates) if rates.has_data() => return *rates,
        Some(_) => (
            SeasonRates::NO_DATA,
            Diagnostic::EmptySeasonProfile {
                role,
                player_id: player_id.clone(),
            },
        ),
        None => (
            SeasonRates::NO_DATA,
            Diagnostic::MissingSeasonProfile {
                role,
                player_id: player_id.clone(),
            },
        ),
    };
    if reported.insert((role, player_id.clone())) {
        diagnostics.record(diagnostic);
    }
    rates
}

/// Blend, adjust for environment and normalize one matchup.
fn project_matchup(
    batting: &EventRates,
    pitching: &EventRates,
    env_factor: f64,
    league: &LeagueBaseline,
) -> Result<OutcomeProbabilities, ProjectionError> {
    let blended = blend_rates(batting, pitching, league)?;
    Ok(normalize(&apply_environment(&blended, env_factor)))
}

fn record_fallback_once(
    resolved: &Resolved,
    diagnostic: impl FnOnce() -> Diagnostic,
    key: &TeamGameKey,
    reported: &mut HashSet<TeamGameKey>,
    diagnostics: &mut Diagnostics,
) {
    if resolved.is_fallback() && reported.insert(key.clone()) {
        diagnostics.record(diagnostic());
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Project every batter and pitcher on the slate.
///
/// Fails, with no partial output, if any batter lacks an environment factor
/// or if a blend is needed against a non-positive league rate. Every other
/// gap is resolved by a named fallback and listed in `diagnostics`.
pub fn project_slate(
    inputs: &SlateInputs,
    config: &EngineConfig,
) -> Result<SlateProjection, ProjectionError> {
    let mut diagnostics = Diagnostics::new();

    // ---- 1. League baseline ----
    let league = LeagueBaseline::from_population(&inputs.season_batters);
    info!(
        "league baseline over {} PA: k={:.4} bb={:.4} 1b={:.4} 2b={:.4} 3b={:.4} hr={:.4}",
        league.pa,
        league.rates.k,
        league.rates.bb,
        league.rates.single,
        league.rates.double,
        league.rates.triple,
        league.rates.hr
    );

    // ---- 2. Season rates ----
    let batter_rates = RateTable::from_profiles(&inputs.season_batters);
    let pitcher_rates = RateTable::from_profiles(&inputs.season_pitchers);

    // ---- 3. Daily rows ----
    let batters = dedupe_assignments(&inputs.daily_batters, PlayerRole::Batter, &mut diagnostics);
    let pitchers =
        dedupe_assignments(&inputs.daily_pitchers, PlayerRole::Pitcher, &mut diagnostics);

    // ---- 4. Environment ----
    let environment = EnvironmentTable::new(&inputs.environment);
    let env_factors = environment.resolve(&batters, &config.environment, &mut diagnostics)?;

    // ---- 5. Group profiles ----
    let mut missing_profiles = HashSet::new();

    let batter_season: Vec<SeasonRates> = batters
        .iter()
        .map(|b| {
            lookup_rates(
                &batter_rates,
                PlayerRole::Batter,
                &b.player_id,
                &mut missing_profiles,
                &mut diagnostics,
            )
        })
        .collect();
    let pitcher_season: Vec<SeasonRates> = pitchers
        .iter()
        .map(|p| {
            lookup_rates(
                &pitcher_rates,
                PlayerRole::Pitcher,
                &p.player_id,
                &mut missing_profiles,
                &mut diagnostics,
            )
        })
        .collect();

    // Lineups: batters with usable season data, grouped by their own team.
    let lineups = GroupProfiles::build(
        batters
            .iter()
            .zip(&batter_season)
            .zip(&env_factors)
            .filter(|((_, season), _)| season.has_data())
            .map(|((b, season), &env_factor)| {
                (
                    (b.game_id.clone(), b.team_id.clone()),
                    GroupMember {
                        player_id: b.player_id.clone(),
                        weight: b.projected_pa,
                        rates: season.rates,
                        env_factor,
                    },
                )
            }),
    );

    // Opposing staffs: pitchers with usable season data, grouped by the
    // team they pitch against.
    let staffs = GroupProfiles::build(
        pitchers
            .iter()
            .zip(&pitcher_season)
            .filter(|(_, season)| season.has_data())
            .map(|(p, season)| {
                (
                    (p.game_id.clone(), p.opponent_team_id.clone()),
                    GroupMember {
                        player_id: p.player_id.clone(),
                        weight: p.projected_pa,
                        rates: season.rates,
                        env_factor: 1.0,
                    },
                )
            }),
    );
    info!(
        "{} lineups and {} opposing staffs on the slate",
        lineups.len(),
        staffs.len()
    );

    // ---- 6. Batters ----
    let weights = &config.linear_weights;
    let mut reported_staffs = HashSet::new();
    let mut batter_rows = Vec::with_capacity(batters.len());
    for ((b, season), &env_factor) in batters.iter().zip(&batter_season).zip(&env_factors) {
        let key = (b.game_id.clone(), b.team_id.clone());
        let staff = staffs.resolve(&key, &league);
        record_fallback_once(
            &staff,
            || Diagnostic::MissingOpposingStaff {
                game_id: b.game_id.clone(),
                team_id: b.team_id.clone(),
            },
            &key,
            &mut reported_staffs,
            &mut diagnostics,
        );

        let probabilities =
            project_matchup(&season.rates, &staff.profile().rates, env_factor, &league)?;
        batter_rows.push(BatterProjection {
            player_id: b.player_id.clone(),
            game_id: b.game_id.clone(),
            team_id: b.team_id.clone(),
            opponent_team_id: b.opponent_team_id.clone(),
            projected_pa: b.projected_pa,
            env_factor,
            probabilities,
            run_value: run_value(&probabilities, weights, b.projected_pa),
            opponent_fallback: staff.is_fallback(),
        });
    }

    // ---- 7. Pitchers ----
    let mut reported_lineups = HashSet::new();
    let mut pitcher_rows = Vec::with_capacity(pitchers.len());
    for (p, season) in pitchers.iter().zip(&pitcher_season) {
        let key = (p.game_id.clone(), p.opponent_team_id.clone());
        let lineup = lineups.resolve(&key, &league);
        record_fallback_once(
            &lineup,
            || Diagnostic::MissingOpponentLineup {
                game_id: p.game_id.clone(),
                team_id: p.opponent_team_id.clone(),
            },
            &key,
            &mut reported_lineups,
            &mut diagnostics,
        );

        let faced = lineup.profile();
        let probabilities =
            project_matchup(&faced.rates, &season.rates, faced.env_factor, &league)?;
        let faced_pa = if lineup.is_fallback() {
            p.projected_pa
        } else {
            faced.total_weight
        };
        pitcher_rows.push(PitcherProjection {
            player_id: p.player_id.clone(),
            game_id: p.game_id.clone(),
            team_id: p.team_id.clone(),
            opponent_team_id: p.opponent_team_id.clone(),
            pa: p.projected_pa,
            faced_pa,
            env_factor: faced.env_factor,
            probabilities,
            run_value: run_value(&probabilities, weights, faced_pa),
            lineup_fallback: lineup.is_fallback(),
        });
    }

    // ---- 8. Totals ----
    batter_rows.sort_by(|a, b| {
        (&a.game_id, &a.team_id, &a.player_id).cmp(&(&b.game_id, &b.team_id, &b.player_id))
    });
    pitcher_rows.sort_by(|a, b| {
        (&a.game_id, &a.team_id, &a.player_id).cmp(&(&b.game_id, &b.team_id, &b.player_id))
    });
    let team_scores = team_totals(&batter_rows);
    let games = game_totals(&team_scores);

    info!(
        "projected {} batters, {} pitchers, {} team totals ({} diagnostics)",
        batter_rows.len(),
        pitcher_rows.len(),
        team_scores.len(),
        diagnostics.len()
    );

    Ok(SlateProjection {
        league,
        batters: batter_rows,
        pitchers: pitcher_rows,
        team_scores,
        game_totals: games,
        diagnostics: diagnostics.into_vec(),
    })
}
