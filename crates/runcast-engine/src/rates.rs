// Season counting totals -> per-outcome rates, and the league baseline.

use runcast_core::{EventRates, Outcome, PlayerId, PlayerSeasonProfile};
use std::collections::HashMap;
use tracing::warn;

// ---------------------------------------------------------------------------
// Per-player rates
// ---------------------------------------------------------------------------

/// Rates for one player together with the plate appearances behind them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonRates {
    pub pa: u32,
    pub rates: EventRates,
}

impl SeasonRates {
    pub const NO_DATA: SeasonRates = SeasonRates {
        pa: 0,
        rates: EventRates::ZERO,
    };

    pub fn has_data(&self) -> bool {
        self.pa > 0
    }
}

/// `count / pa` per outcome. A profile with no plate appearances yields all
/// zeros ("no data"), never an error.
pub fn season_rates(profile: &PlayerSeasonProfile) -> SeasonRates {
    if !profile.has_data() {
        return SeasonRates::NO_DATA;
    }
    let pa = profile.pa as f64;
    SeasonRates {
        pa: profile.pa,
        rates: EventRates::from_fn(|o| profile.count(o) as f64 / pa),
    }
}

/// Season rates for one population (batters or pitchers), keyed by player.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    by_player: HashMap<PlayerId, SeasonRates>,
}

impl RateTable {
    /// Duplicate player rows: the later row wins.
    pub fn from_profiles(profiles: &[PlayerSeasonProfile]) -> Self {
        let mut by_player = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            if by_player
                .insert(profile.player_id.clone(), season_rates(profile))
                .is_some()
            {
                warn!(
                    "duplicate season profile for player {}, using latest row",
                    profile.player_id
                );
            }
        }
        RateTable { by_player }
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&SeasonRates> {
        self.by_player.get(player_id)
    }

    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }
}

// ---------------------------------------------------------------------------
// League baseline
// ---------------------------------------------------------------------------

/// Population-wide outcome rates: the log5 denominator and the fallback for
/// unresolvable opponents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeagueBaseline {
    pub pa: u64,
    pub rates: EventRates,
}

impl LeagueBaseline {
    /// Pooled rates: total count of each outcome over total plate
    /// appearances. An empty or zero-PA population yields all-zero rates,
    /// which the blender later rejects.
    pub fn from_population(profiles: &[PlayerSeasonProfile]) -> Self {
        let total_pa: u64 = profiles.iter().map(|p| p.pa as u64).sum();
        if total_pa == 0 {
            return LeagueBaseline {
                pa: 0,
                rates: EventRates::ZERO,
            };
        }
        let rates = EventRates::from_fn(|o| {
            let total: u64 = profiles.iter().map(|p| p.count(o) as u64).sum();
            total as f64 / total_pa as f64
        });
        LeagueBaseline {
            pa: total_pa,
            rates,
        }
    }

    /// Baseline with explicitly supplied rates.
    pub fn from_rates(rates: EventRates) -> Self {
        LeagueBaseline { pa: 0, rates }
    }

    pub fn rate(&self, outcome: Outcome) -> f64 {
        self.rates.get(outcome)
    }
}
