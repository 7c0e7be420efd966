//! Runs one match from validated models to an outcome.

use std::ops::ControlFlow;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use recipeforge_config::MatchConfig;
use recipeforge_core::{
    Assignment, CapabilityModel, InfeasibleReason, MatchError, MatchMode, MatchOutcome,
    RequirementModel, Result, SolutionSet,
};
use recipeforge_scoring::{Ranker, ScoreWeights};
use tracing::{debug, error, info, warn};

use crate::encoder::{cycle_reason, CandidateTable, ConstraintSystem, EncodeOptions};
use crate::enumeration::{enumerate_models, EnumerationEnd};
use crate::event::{MatchEventListener, MatchEventSupport, MatchStatus};
use crate::sat::{BackendError, DpllBackend, SatBackend, StopReason, StopSignal};
use crate::stats::MatchStats;

/// Executes matching runs under one configuration.
///
/// Every run owns its constraint system and backend; a driver can be reused
/// for any number of sequential runs.
///
/// # Example
///
/// ```
/// use recipeforge_config::MatchConfig;
/// use recipeforge_core::MatchMode;
/// use recipeforge_solver::MatchDriver;
/// use recipeforge_test::mix_heat::{mix_heat_capabilities, mix_heat_requirements};
///
/// let driver = MatchDriver::new(MatchConfig::new().with_mode(MatchMode::Fast));
/// let outcome = driver
///     .run(&mix_heat_requirements(), &mix_heat_capabilities())
///     .unwrap();
///
/// let best = outcome.solutions().and_then(|s| s.best()).unwrap();
/// assert_eq!(best.assignment().resource_for("A"), Some("R1"));
/// assert_eq!(best.assignment().resource_for("B"), Some("R2"));
/// ```
#[derive(Debug, Default)]
pub struct MatchDriver {
    config: MatchConfig,
    events: MatchEventSupport,
    cancel: Option<Arc<AtomicBool>>,
}

impl MatchDriver {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            events: MatchEventSupport::new(),
            cancel: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn MatchEventListener>) -> Self {
        self.events.add_listener(listener);
        self
    }

    /// Observes `flag` for cooperative cancellation.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Runs the match with the built-in DPLL backend.
    pub fn run(
        &self,
        requirements: &RequirementModel,
        capabilities: &CapabilityModel,
    ) -> Result<MatchOutcome> {
        let mut backend = DpllBackend::new();
        self.run_with_backend(requirements, capabilities, &mut backend)
    }

    /// Runs the match with a caller-supplied backend.
    ///
    /// The backend must be fresh: constraints of this run are added to
    /// whatever it already holds.
    ///
    /// # Errors
    ///
    /// - [`MatchError::MalformedConstraint`] for invalid input models
    /// - [`MatchError::Config`] for invalid weights or limits
    /// - [`MatchError::SolverFault`] if the backend fails or the time limit
    ///   elapses
    pub fn run_with_backend<B: SatBackend + ?Sized>(
        &self,
        requirements: &RequirementModel,
        capabilities: &CapabilityModel,
        backend: &mut B,
    ) -> Result<MatchOutcome> {
        let mut stats = MatchStats::default();
        stats.start();

        let mode = self.config.mode;
        info!(
            event = "match_start",
            steps = requirements.step_count(),
            resources = capabilities.resource_count(),
            mode = %mode,
            backend = backend.name(),
        );
        self.events.fire_match_started(
            requirements.step_count(),
            capabilities.resource_count(),
            mode,
        );

        let result = self.execute(requirements, capabilities, backend, &mut stats);
        let status = MatchStatus::of(&result);
        match &result {
            Ok(outcome) => info!(
                event = "match_end",
                status = status.as_str(),
                solutions = outcome.solutions().map_or(0, SolutionSet::len),
                truncated = outcome.solutions().is_some_and(|s| s.truncated),
                decisions = stats.decisions,
                conflicts = stats.conflicts,
                elapsed_ms = stats.elapsed_ms(),
            ),
            Err(err) => warn!(
                event = "match_end",
                status = status.as_str(),
                error = %err,
                elapsed_ms = stats.elapsed_ms(),
            ),
        }
        self.events.fire_match_ended(status, &stats);
        result
    }

    fn stop_signal(&self) -> StopSignal {
        let mut stop = StopSignal::never();
        if let Some(flag) = &self.cancel {
            stop = stop.with_cancel_flag(Arc::clone(flag));
        }
        if let Some(limit) = self.config.time_limit() {
            stop = stop.with_time_limit(limit);
        }
        stop
    }

    fn execute<B: SatBackend + ?Sized>(
        &self,
        requirements: &RequirementModel,
        capabilities: &CapabilityModel,
        backend: &mut B,
        stats: &mut MatchStats,
    ) -> Result<MatchOutcome> {
        let stop = self.stop_signal();
        if stop.is_cancelled() {
            return Ok(MatchOutcome::Cancelled);
        }

        self.config.validate()?;
        let weights = ScoreWeights::from_config(&self.config.weights)?;
        requirements.validate()?;
        capabilities.validate()?;

        if let Some(reason) = cycle_reason(requirements)? {
            info!(event = "infeasible", reason = %reason);
            return Ok(MatchOutcome::Infeasible(reason));
        }

        if requirements.is_empty() {
            let empty = Assignment::new(1, Vec::new());
            stats.record_solution();
            self.events.fire_solution_found(&empty);
            self.events.fire_progress(1, 100);
            return self
                .collect(vec![empty], false, weights, capabilities)
                .map(MatchOutcome::Solved);
        }

        let table = CandidateTable::build(requirements, capabilities);
        let empty_steps = table.empty_steps();
        if !empty_steps.is_empty() {
            let reason = InfeasibleReason::NoCandidates {
                steps: empty_steps
                    .into_iter()
                    .map(|i| requirements.steps[i].id.clone())
                    .collect(),
            };
            info!(event = "infeasible", reason = %reason);
            return Ok(MatchOutcome::Infeasible(reason));
        }

        let system = ConstraintSystem::encode(
            requirements,
            capabilities,
            &table,
            EncodeOptions::from(&self.config),
        )?;
        stats.record_system(system.size());
        system
            .load_into(&mut *backend)
            .map_err(|err| solver_fault(err.to_string(), &system))?;

        let mode = self.config.mode;
        let limit = match mode {
            MatchMode::Fast => Some(1),
            MatchMode::Pro | MatchMode::Ultra => self.config.attempt_limit(),
        };
        let interval = self.config.progress_interval.max(1);
        let search_space = table.search_space();

        let mut found: Vec<Assignment> = Vec::new();
        let enumeration = enumerate_models::<_, _, RunError>(
            &mut *backend,
            &system.vars(),
            &stop,
            limit,
            |model| {
                let assignment =
                    system.decode(model, found.len() + 1, requirements, capabilities)?;
                debug!(event = "solution_found", solution_id = assignment.solution_id);
                self.events.fire_solution_found(&assignment);
                found.push(assignment);

                let count = found.len() as u64;
                if count % interval == 0 {
                    self.events
                        .fire_progress(count, estimate_percent(count, search_space));
                }
                Ok(ControlFlow::Continue(()))
            },
        );
        stats.record_backend(backend.stats());
        stats.solutions_found = found.len() as u64;

        let enumeration = enumeration.map_err(|err| match err {
            RunError::Backend(err) => solver_fault(err.to_string(), &system),
            RunError::Match(err) => err,
        })?;

        let truncated = match enumeration.end {
            EnumerationEnd::Stopped(StopReason::Cancelled) => {
                info!(event = "cancelled", solutions = found.len());
                return Ok(MatchOutcome::Cancelled);
            }
            EnumerationEnd::Stopped(StopReason::TimedOut(limit)) => {
                return Err(solver_fault(
                    format!("timed out after {}s", limit.as_secs_f64()),
                    &system,
                ));
            }
            EnumerationEnd::LimitReached => mode.enumerates_all(),
            EnumerationEnd::Exhausted | EnumerationEnd::Halted => false,
        };

        if found.is_empty() {
            info!(event = "infeasible", reason = %InfeasibleReason::Unsatisfiable);
            return Ok(MatchOutcome::Infeasible(InfeasibleReason::Unsatisfiable));
        }
        if truncated {
            warn!(event = "attempt_limit_reached", solutions = found.len());
        }

        self.events.fire_progress(found.len() as u64, 100);
        self.collect(found, truncated, weights, capabilities)
            .map(MatchOutcome::Solved)
    }

    fn collect(
        &self,
        found: Vec<Assignment>,
        truncated: bool,
        weights: ScoreWeights,
        capabilities: &CapabilityModel,
    ) -> Result<SolutionSet> {
        let set = if self.config.mode.is_ranked() {
            Ranker::new(weights).rank_set(found, capabilities)?
        } else {
            SolutionSet::unscored(self.config.mode, found)
        };
        Ok(set.with_truncated(truncated))
    }
}

/// Errors that can end enumeration early.
enum RunError {
    Backend(BackendError),
    Match(MatchError),
}

impl From<BackendError> for RunError {
    fn from(err: BackendError) -> Self {
        RunError::Backend(err)
    }
}

impl From<MatchError> for RunError {
    fn from(err: MatchError) -> Self {
        RunError::Match(err)
    }
}

fn solver_fault(reason: String, system: &ConstraintSystem) -> MatchError {
    error!(
        event = "solver_fault",
        reason = %reason,
        variables = system.var_count(),
        clauses = system.constraint_count(),
    );
    MatchError::SolverFault {
        reason,
        variables: system.var_count(),
        clauses: system.constraint_count(),
    }
}

/// Share of the candidate product found so far, capped at 99.
pub(crate) fn estimate_percent(found: u64, search_space: f64) -> u8 {
    if search_space <= 0.0 {
        return 0;
    }
    let percent = (found as f64 / search_space * 100.0).floor();
    percent.clamp(0.0, 99.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_percent() {
        assert_eq!(estimate_percent(1, 4.0), 25);
        assert_eq!(estimate_percent(4, 4.0), 99);
        assert_eq!(estimate_percent(10, 4.0), 99);
        assert_eq!(estimate_percent(3, 0.0), 0);
    }
}
