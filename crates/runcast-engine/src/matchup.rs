// Odds-ratio (log5) blending of a batting side against a pitching side.

use crate::rates::LeagueBaseline;
use runcast_core::{EventRates, Outcome, ProjectionError};

/// Blend one outcome: `(batter * opposing) / league`.
///
/// A zero on either side yields zero for that outcome. The league rate must
/// be strictly positive; anything else (including NaN) is a domain error.
pub fn log5(
    outcome: Outcome,
    batter: f64,
    opposing: f64,
    league: f64,
) -> Result<f64, ProjectionError> {
    if league.is_nan() || league <= 0.0 {
        return Err(ProjectionError::Domain {
            outcome,
            league_rate: league,
        });
    }
    Ok(batter * opposing / league)
}

/// Apply [`log5`] independently to every outcome.
pub fn blend_rates(
    batter: &EventRates,
    opposing: &EventRates,
    league: &LeagueBaseline,
) -> Result<EventRates, ProjectionError> {
    EventRates::try_from_fn(|o| log5(o, batter.get(o), opposing.get(o), league.rate(o)))
}
