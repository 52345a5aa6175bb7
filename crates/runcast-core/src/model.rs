// Value records shared by the projection engine and the table boundary.

use crate::ids::{GameId, PlayerGameKey, PlayerId, TeamId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// The six rated plate-appearance outcomes. "Out" is the residual and is
/// never rated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Strikeout,
    Walk,
    Single,
    Double,
    Triple,
    HomeRun,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::Strikeout,
        Outcome::Walk,
        Outcome::Single,
        Outcome::Double,
        Outcome::Triple,
        Outcome::HomeRun,
    ];

    /// Ball-in-play outcomes are the ones park and weather can move.
    /// Strikeouts and walks are plate-discipline outcomes.
    pub fn is_ball_in_play(self) -> bool {
        matches!(
            self,
            Outcome::Single | Outcome::Double | Outcome::Triple | Outcome::HomeRun
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Strikeout => "strikeout",
            Outcome::Walk => "walk",
            Outcome::Single => "single",
            Outcome::Double => "double",
            Outcome::Triple => "triple",
            Outcome::HomeRun => "home_run",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Per-outcome rates
// ---------------------------------------------------------------------------

/// One value per rated outcome: season rates, blended probabilities, or
/// lineup means depending on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventRates {
    pub k: f64,
    pub bb: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub hr: f64,
}

impl EventRates {
    pub const ZERO: EventRates = EventRates {
        k: 0.0,
        bb: 0.0,
        single: 0.0,
        double: 0.0,
        triple: 0.0,
        hr: 0.0,
    };

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Strikeout => self.k,
            Outcome::Walk => self.bb,
            Outcome::Single => self.single,
            Outcome::Double => self.double,
            Outcome::Triple => self.triple,
            Outcome::HomeRun => self.hr,
        }
    }

    /// Build rates by evaluating `f` once per outcome.
    pub fn from_fn(mut f: impl FnMut(Outcome) -> f64) -> Self {
        EventRates {
            k: f(Outcome::Strikeout),
            bb: f(Outcome::Walk),
            single: f(Outcome::Single),
            double: f(Outcome::Double),
            triple: f(Outcome::Triple),
            hr: f(Outcome::HomeRun),
        }
    }

    /// Fallible variant of [`EventRates::from_fn`]; stops at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Outcome) -> Result<f64, E>) -> Result<Self, E> {
        Ok(EventRates {
            k: f(Outcome::Strikeout)?,
            bb: f(Outcome::Walk)?,
            single: f(Outcome::Single)?,
            double: f(Outcome::Double)?,
            triple: f(Outcome::Triple)?,
            hr: f(Outcome::HomeRun)?,
        })
    }

    /// Sum in fixed outcome order.
    pub fn sum(&self) -> f64 {
        self.k + self.bb + self.single + self.double + self.triple + self.hr
    }
}

/// A complete seven-way distribution over plate-appearance outcomes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbabilities {
    pub k: f64,
    pub bb: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub hr: f64,
    pub out: f64,
}

impl OutcomeProbabilities {
    pub fn events(&self) -> EventRates {
        EventRates {
            k: self.k,
            bb: self.bb,
            single: self.single,
            double: self.double,
            triple: self.triple,
            hr: self.hr,
        }
    }

    pub fn sum(&self) -> f64 {
        self.events().sum() + self.out
    }
}

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// Season counting totals for one player. Counts never exceed `pa`; the table
/// boundary rejects rows that violate this.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeasonProfile {
    pub player_id: PlayerId,
    pub pa: u32,
    pub strikeout: u32,
    pub walk: u32,
    pub single: u32,
    pub double: u32,
    pub triple: u32,
    pub home_run: u32,
}

impl PlayerSeasonProfile {
    pub fn count(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Strikeout => self.strikeout,
            Outcome::Walk => self.walk,
            Outcome::Single => self.single,
            Outcome::Double => self.double,
            Outcome::Triple => self.triple,
            Outcome::HomeRun => self.home_run,
        }
    }

    /// A profile with zero plate appearances carries no rate information.
    pub fn has_data(&self) -> bool {
        self.pa > 0
    }
}

/// Which side of the matchup a daily row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    Batter,
    Pitcher,
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerRole::Batter => f.write_str("batter"),
            PlayerRole::Pitcher => f.write_str("pitcher"),
        }
    }
}

/// One player's assignment to a game on today's slate.
///
/// For batters `projected_pa` is the projected plate appearances; for
/// pitchers it is the projected batters faced, used as the staff weight.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAssignment {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub team_id: TeamId,
    pub opponent_team_id: TeamId,
    pub projected_pa: f64,
}

impl DailyAssignment {
    pub fn key(&self) -> PlayerGameKey {
        (self.player_id.clone(), self.game_id.clone())
    }
}

/// Combined park and weather multiplier for one batter in one game.
/// 1.0 is neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentFactor {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub factor: f64,
}

impl EnvironmentFactor {
    pub fn key(&self) -> PlayerGameKey {
        (self.player_id.clone(), self.game_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hits_are_ball_in_play() {
        let bip: Vec<Outcome> = Outcome::ALL
            .into_iter()
            .filter(|o| o.is_ball_in_play())
            .collect();
        assert_eq!(
            bip,
            vec![Outcome::Single, Outcome::Double, Outcome::Triple, Outcome::HomeRun]
        );
    }

    #[test]
    fn from_fn_and_get_agree() {
        let rates = EventRates::from_fn(|o| match o {
            Outcome::Strikeout => 0.1,
            Outcome::Walk => 0.2,
            Outcome::Single => 0.3,
            Outcome::Double => 0.4,
            Outcome::Triple => 0.5,
            Outcome::HomeRun => 0.6,
        });
        assert_eq!(rates.get(Outcome::Strikeout), 0.1);
        assert_eq!(rates.get(Outcome::HomeRun), 0.6);
        assert_eq!(rates.triple, 0.5);
    }

    #[test]
    fn try_from_fn_stops_on_error() {
        let mut seen = Vec::new();
        let result: Result<EventRates, Outcome> = EventRates::try_from_fn(|o| {
            seen.push(o);
            if o == Outcome::Single {
                Err(o)
            } else {
                Ok(1.0)
            }
        });
        assert_eq!(result, Err(Outcome::Single));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn profile_without_pa_has_no_data() {
        let profile = PlayerSeasonProfile {
            player_id: PlayerId::new("1"),
            pa: 0,
            strikeout: 0,
            walk: 0,
            single: 0,
            double: 0,
            triple: 0,
            home_run: 0,
        };
        assert!(!profile.has_data());
    }
}
