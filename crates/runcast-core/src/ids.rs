// Strongly typed identifiers for players, games and teams.
//
// Upstream tables use a mix of numeric and string keys; everything is carried
// as trimmed text so a numeric id and its string form compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl AsRef<str>) -> Self {
                $name(raw.as_ref().trim().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                $name::new(raw)
            }
        }
    };
}

string_id!(
    /// Player identifier shared by season and daily tables.
    PlayerId
);
string_id!(
    /// Game identifier for one scheduled game on the slate.
    GameId
);
string_id!(
    /// Canonical team identifier (after alias resolution).
    TeamId
);

/// Key of every per-(player, game) record: daily assignments, environment
/// factors and projection rows.
pub type PlayerGameKey = (PlayerId, GameId);

/// Key of every per-(game, team) reduction: lineup profiles and game scores.
pub type TeamGameKey = (GameId, TeamId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_trimmed() {
        assert_eq!(PlayerId::new("  660271 ").as_str(), "660271");
        assert_eq!(TeamId::from(" NYY"), TeamId::new("NYY"));
    }

    #[test]
    fn ids_order_lexically() {
        let mut ids = vec![GameId::new("b"), GameId::new("a"), GameId::new("c")];
        ids.sort();
        assert_eq!(ids, vec![GameId::new("a"), GameId::new("b"), GameId::new("c")]);
    }

    #[test]
    fn display_matches_raw_value() {
        assert_eq!(PlayerId::new("99").to_string(), "99");
        assert!(TeamId::new("   ").is_empty());
    }
}
