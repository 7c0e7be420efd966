//! RecipeForge - Recipe-to-Resource Matching in Rust
//!
//! Assigns every step of a process recipe to a plant resource whose
//! capabilities, parameters and connections satisfy it. Fast mode returns
//! the first assignment, Pro enumerates all of them, and Ultra ranks them by
//! energy, usage cost and CO2.
//!
//! # Example
//!
//! ```rust
//! use recipeforge::prelude::*;
//! use recipeforge_test::mix_heat::{mix_heat_capabilities, mix_heat_requirements};
//!
//! let config = MatchConfig::new().with_mode(MatchMode::Ultra);
//! let outcome = match_recipe_with(config, &mix_heat_requirements(), &mix_heat_capabilities())
//!     .unwrap();
//!
//! let best = outcome.solutions().and_then(|s| s.best()).unwrap();
//! assert_eq!(best.assignment().resource_for("B"), Some("R2"));
//! assert_eq!(best.score(), Some(0.0));
//! ```

#[cfg(feature = "console")]
pub mod console;

mod matcher;

pub use matcher::{match_recipe, match_recipe_with, spawn_match, CONFIG_FILE};

// Domain model
pub use recipeforge_core::{
    Assignment, AssignmentEntry, Capability, CapabilityMatch, CapabilityModel, Capacity,
    Comparison, Connection, CostTotals, InfeasibleReason, MatchError, MatchMode, MatchOutcome,
    MatchedParameter, Material, OfferValue, ParameterOffer, ParameterRequirement, Precondition,
    RequirementModel, Resource, ResourceCosts, Result, ScoredAssignment, Solution, SolutionSet,
    Step, ValueConstraint,
};

// Configuration
pub use recipeforge_config::{CapacityPolicy, MatchConfig, TerminationConfig, WeightConfig};

// Ranking
pub use recipeforge_scoring::{CostAnalysis, Ranker, ScoreWeights};

// Engine
pub use recipeforge_solver::{
    LoggingEventListener, MatchDriver, MatchEvent, MatchEventListener, MatchHandle, MatchJob,
    MatchManager, MatchStats, MatchStatus, SatBackend,
};

pub mod prelude {
    pub use super::{match_recipe, match_recipe_with, spawn_match};
    pub use super::{
        Assignment, CapabilityModel, InfeasibleReason, MatchError, MatchMode, MatchOutcome,
        RequirementModel, SolutionSet,
    };
    pub use super::{CapacityPolicy, MatchConfig};
    pub use super::{MatchEvent, MatchEventListener, MatchHandle, MatchJob};
}
