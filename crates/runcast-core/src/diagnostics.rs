// Non-fatal conditions resolved by a named fallback.
//
// Each one is logged when recorded and returned next to the successful output.

use crate::ids::{GameId, PlayerId, TeamId};
use crate::model::PlayerRole;
use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No lineup rows for the team a pitcher faces; league baseline rates and
    /// a neutral environment were used instead.
    MissingOpponentLineup { game_id: GameId, team_id: TeamId },

    /// No resolvable opposing pitcher for a batting team; league baseline
    /// rates were used as the opposing side.
    MissingOpposingStaff { game_id: GameId, team_id: TeamId },

    /// A daily player has no season row and is treated as having no data.
    MissingSeasonProfile { role: PlayerRole, player_id: PlayerId },

    /// A daily player's season row has no plate appearances. Treated as having
    /// no data and left out of lineup and staff aggregates.
    EmptySeasonProfile { role: PlayerRole, player_id: PlayerId },

    /// Several daily rows shared one (player, game); the row with the largest
    /// projected PA was kept.
    DuplicateAssignment {
        role: PlayerRole,
        player_id: PlayerId,
        game_id: GameId,
        rows: usize,
        kept_pa: f64,
    },

    /// Environment factor outside the configured practical range. Used as is.
    EnvironmentOutOfRange {
        player_id: PlayerId,
        game_id: GameId,
        factor: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingOpponentLineup { game_id, team_id } => write!(
                f,
                "no lineup for team {team_id} in game {game_id}; using league baseline"
            ),
            Diagnostic::MissingOpposingStaff { game_id, team_id } => write!(
                f,
                "no opposing pitcher resolved for team {team_id} in game {game_id}; using league baseline"
            ),
            Diagnostic::MissingSeasonProfile { role, player_id } => {
                write!(f, "{role} {player_id} has no season profile; rates set to 0")
            }
            Diagnostic::EmptySeasonProfile { role, player_id } => {
                write!(f, "{role} {player_id} has a season row with 0 PA; rates set to 0")
            }
            Diagnostic::DuplicateAssignment {
                role,
                player_id,
                game_id,
                rows,
                kept_pa,
            } => write!(
                f,
                "{role} {player_id} appears {rows} times in game {game_id}; kept row with {kept_pa} PA"
            ),
            Diagnostic::EnvironmentOutOfRange {
                player_id,
                game_id,
                factor,
            } => write!(
                f,
                "environment factor {factor} for player {player_id} in game {game_id} is outside the practical range"
            ),
        }
    }
}

/// Ordered collector for the diagnostic side-channel of one run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
