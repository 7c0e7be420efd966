//! Matching entry points that hide the engine wiring.

use recipeforge_config::MatchConfig;
use recipeforge_core::{CapabilityModel, MatchOutcome, RequirementModel, Result};
use recipeforge_solver::{MatchDriver, MatchJob, MatchManager};
use tracing::debug;

/// Configuration file read by [`match_recipe`] when present.
pub const CONFIG_FILE: &str = "recipeforge.toml";

/// Runs a match with the configuration from [`CONFIG_FILE`], or the
/// defaults if the file is missing or invalid.
pub fn match_recipe(
    requirements: &RequirementModel,
    capabilities: &CapabilityModel,
) -> Result<MatchOutcome> {
    let config = MatchConfig::load(CONFIG_FILE).unwrap_or_default();
    match_recipe_with(config, requirements, capabilities)
}

/// Runs a match on the calling thread.
pub fn match_recipe_with(
    config: MatchConfig,
    requirements: &RequirementModel,
    capabilities: &CapabilityModel,
) -> Result<MatchOutcome> {
    #[cfg(feature = "console")]
    crate::console::init();

    debug!(event = "config", mode = %config.mode, in_place_transfer = config.in_place_transfer);
    MatchDriver::new(config).run(requirements, capabilities)
}

/// Starts a match on a worker thread.
///
/// The returned job streams events and can be cancelled through its
/// handle.
pub fn spawn_match(
    config: MatchConfig,
    requirements: RequirementModel,
    capabilities: CapabilityModel,
) -> Result<MatchJob> {
    #[cfg(feature = "console")]
    crate::console::init();

    MatchManager::new(config).spawn(requirements, capabilities)
}
