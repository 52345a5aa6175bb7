// Park and weather adjustment of ball-in-play outcomes.

use runcast_core::{
    DailyAssignment, Diagnostic, Diagnostics, EnvironmentFactor, EnvironmentRange, EventRates,
    PlayerGameKey, ProjectionError,
};
use std::collections::HashMap;
use tracing::warn;

/// Scale singles, doubles, triples and home runs by `factor`. Strikeouts and
/// walks pass through untouched.
pub fn apply_environment(rates: &EventRates, factor: f64) -> EventRates {
    EventRates::from_fn(|o| {
        let value = rates.get(o);
        if o.is_ball_in_play() {
            value * factor
        } else {
            value
        }
    })
}

/// Environment factors for the slate, keyed by (player, game).
#[derive(Debug, Clone, Default)]
pub struct EnvironmentTable {
    factors: HashMap<PlayerGameKey, f64>,
}

impl EnvironmentTable {
    /// Duplicate keys: the later row wins.
    pub fn new(factors: &[EnvironmentFactor]) -> Self {
        let mut map = HashMap::with_capacity(factors.len());
        for f in factors {
            if map.insert(f.key(), f.factor).is_some() {
                warn!(
                    "duplicate environment factor for player {} in game {}, using latest row",
                    f.player_id, f.game_id
                );
            }
        }
        EnvironmentTable { factors: map }
    }

    pub fn get(&self, key: &PlayerGameKey) -> Option<f64> {
        self.factors.get(key).copied()
    }

    /// Factor for every assignment, in input order.
    ///
    /// Any assignment without a factor fails the whole call, but only after
    /// every assignment has been checked: the error lists all offending keys.
    /// Factors outside `range` are returned as given and recorded.
    pub fn resolve(
        &self,
        assignments: &[DailyAssignment],
        range: &EnvironmentRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<f64>, ProjectionError> {
        let mut resolved = Vec::with_capacity(assignments.len());
        let mut missing = Vec::new();
        let mut flagged = Vec::new();

        for a in assignments {
            let key = a.key();
            match self.get(&key) {
                Some(factor) => {
                    if !range.contains(factor) {
                        flagged.push(Diagnostic::EnvironmentOutOfRange {
                            player_id: a.player_id.clone(),
                            game_id: a.game_id.clone(),
                            factor,
                        });
                    }
                    resolved.push(factor);
                }
                None => missing.push(key),
            }
        }

        if !missing.is_empty() {
            missing.sort();
            missing.dedup();
            return Err(ProjectionError::MissingContext { keys: missing });
        }

        for diagnostic in flagged {
            diagnostics.record(diagnostic);
        }
        Ok(resolved)
    }
}
