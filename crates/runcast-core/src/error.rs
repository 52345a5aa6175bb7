// Fatal engine errors. Any of these aborts the run with no output.

use crate::ids::PlayerGameKey;
use crate::model::Outcome;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    /// The league baseline for an outcome is not a positive rate, so the
    /// odds-ratio blend is undefined.
    #[error("cannot blend {outcome}: league rate is {league_rate}, expected > 0")]
    Domain { outcome: Outcome, league_rate: f64 },

    /// Batter assignments with no environment factor. Every offending key is
    /// listed, sorted.
    #[error("missing environment factor for {} batter assignment(s): {}", keys.len(), format_keys(keys))]
    MissingContext { keys: Vec<PlayerGameKey> },
}

/// Number of keys spelled out in the error message before eliding.
const MAX_KEYS_IN_MESSAGE: usize = 10;

fn format_keys(keys: &[PlayerGameKey]) -> String {
    let mut shown: Vec<String> = keys
        .iter()
        .take(MAX_KEYS_IN_MESSAGE)
        .map(|(player, game)| format!("(player {player}, game {game})"))
        .collect();
    if keys.len() > MAX_KEYS_IN_MESSAGE {
        shown.push(format!("... {} more", keys.len() - MAX_KEYS_IN_MESSAGE));
    }
    shown.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{GameId, PlayerId};

    #[test]
    fn missing_context_lists_keys() {
        let err = ProjectionError::MissingContext {
            keys: vec![
                (PlayerId::new("1"), GameId::new("g1")),
                (PlayerId::new("2"), GameId::new("g1")),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 batter assignment(s)"));
        assert!(msg.contains("(player 1, game g1)"));
        assert!(msg.contains("(player 2, game g1)"));
    }

    #[test]
    fn missing_context_elides_long_lists() {
        let keys = (0..25)
            .map(|i| (PlayerId::new(i.to_string()), GameId::new("g")))
            .collect();
        let msg = ProjectionError::MissingContext { keys }.to_string();
        assert!(msg.contains("25 batter assignment(s)"));
        assert!(msg.contains("... 15 more"));
    }

    #[test]
    fn domain_error_names_outcome() {
        let err = ProjectionError::Domain {
            outcome: Outcome::Triple,
            league_rate: 0.0,
        };
        assert_eq!(
            err.to_string(),
            "cannot blend triple: league rate is 0, expected > 0"
        );
    }
}
