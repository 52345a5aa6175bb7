// Projection engine: season rates, log5 matchups, environment adjustment,
// normalization, run values and lineup/game aggregation.

pub mod engine;
pub mod environment;
pub mod game_score;
pub mod lineup;
pub mod matchup;
pub mod normalize;
pub mod rates;
pub mod run_value;

pub use engine::{project_slate, BatterProjection, PitcherProjection, SlateInputs, SlateProjection};
pub use game_score::{GameTotal, TeamGameProjection};
pub use rates::LeagueBaseline;
pub use run_value::RunValue;
