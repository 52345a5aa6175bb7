// Plate-appearance-weighted reduction of a group of players into one profile.
//
// Used twice: the batting lineup a pitcher faces, and the pitching staff a
// lineup faces. Groups are keyed by (game, team) and each group is reduced
// independently.

use crate::rates::LeagueBaseline;
use runcast_core::{EventRates, Outcome, PlayerId, TeamGameKey};
use std::collections::BTreeMap;
use tracing::debug;

// ---------------------------------------------------------------------------
// Group members and profiles
// ---------------------------------------------------------------------------

/// One player's contribution to a group profile.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub player_id: PlayerId,
    /// Projected plate appearances (batters) or batters faced (pitchers).
    pub weight: f64,
    pub rates: EventRates,
    pub env_factor: f64,
}

/// The reduced profile of one (game, team) group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupProfile {
    pub rates: EventRates,
    pub env_factor: f64,
    /// Sum of member weights.
    pub total_weight: f64,
    pub members: usize,
}

impl GroupProfile {
    /// The stand-in for a group with no rows: league rates in a neutral
    /// environment, zero weight.
    pub fn baseline(league: &LeagueBaseline) -> Self {
        GroupProfile {
            rates: league.rates,
            env_factor: 1.0,
            total_weight: 0.0,
            members: 0,
        }
    }
}

/// Weighted mean of `(value, weight)` pairs. Falls back to the plain mean
/// when the weights sum to zero; an empty slice yields 0.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let total_weight: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total_weight > 0.0 {
        pairs.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight
    } else {
        pairs.iter().map(|(v, _)| v).sum::<f64>() / pairs.len() as f64
    }
}

fn weighted_column(
    members: &[&GroupMember],
    value: impl Fn(&GroupMember) -> f64,
) -> Vec<(f64, f64)> {
    members.iter().map(|m| (value(m), m.weight)).collect()
}

/// Reduce one group. Members are ordered by player id first, so the result
/// does not depend on input order. Returns `None` for an empty group.
pub fn aggregate_group(members: &[GroupMember]) -> Option<GroupProfile> {
    if members.is_empty() {
        return None;
    }
    let mut ordered: Vec<&GroupMember> = members.iter().collect();
    ordered.sort_by(|a, b| a.player_id.cmp(&b.player_id));

    let rates = EventRates::from_fn(|o: Outcome| {
        weighted_mean(&weighted_column(&ordered, |m| m.rates.get(o)))
    });
    let env_factor = weighted_mean(&weighted_column(&ordered, |m| m.env_factor));
    let total_weight: f64 = ordered.iter().map(|m| m.weight).sum();

    Some(GroupProfile {
        rates,
        env_factor,
        total_weight,
        members: ordered.len(),
    })
}

// ---------------------------------------------------------------------------
// Keyed profiles
// ---------------------------------------------------------------------------

/// Group profiles for every (game, team) that has at least one member.
#[derive(Debug, Clone, Default)]
pub struct GroupProfiles {
    by_key: BTreeMap<TeamGameKey, GroupProfile>,
}

/// Outcome of looking up a group a player needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved {
    Found(GroupProfile),
    /// No rows for the key; carries the league-baseline stand-in.
    Fallback(GroupProfile),
}

impl Resolved {
    pub fn profile(&self) -> &GroupProfile {
        match self {
            Resolved::Found(p) | Resolved::Fallback(p) => p,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolved::Fallback(_))
    }
}

impl GroupProfiles {
    pub fn build(members: impl IntoIterator<Item = (TeamGameKey, GroupMember)>) -> Self {
        let mut grouped: BTreeMap<TeamGameKey, Vec<GroupMember>> = BTreeMap::new();
        for (key, member) in members {
            grouped.entry(key).or_default().push(member);
        }

        let by_key = grouped
            .into_iter()
            .filter_map(|(key, members)| {
                let profile = aggregate_group(&members)?;
                debug!(
                    "group game={} team={}: {} members, weight {:.2}",
                    key.0, key.1, profile.members, profile.total_weight
                );
                Some((key, profile))
            })
            .collect();

        GroupProfiles { by_key }
    }

    pub fn get(&self, key: &TeamGameKey) -> Option<&GroupProfile> {
        self.by_key.get(key)
    }

    /// The profile for `key`, or the league-baseline stand-in if the group
    /// has no rows.
    pub fn resolve(&self, key: &TeamGameKey, league: &LeagueBaseline) -> Resolved {
        match self.by_key.get(key) {
            Some(profile) => Resolved::Found(*profile),
            None => Resolved::Fallback(GroupProfile::baseline(league)),
        }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
