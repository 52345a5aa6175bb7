// Shared kernel for the runcast projection engine: identifiers, value
// records, the error taxonomy, diagnostics and configuration.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod model;

pub use config::{Config, EngineConfig, EnvironmentRange, LinearWeights};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::ProjectionError;
pub use ids::{GameId, PlayerGameKey, PlayerId, TeamGameKey, TeamId};
pub use model::{
    DailyAssignment, EnvironmentFactor, EventRates, Outcome, OutcomeProbabilities, PlayerRole,
    PlayerSeasonProfile,
};
