//! Run statistics.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::encoder::SystemSize;
use crate::sat::BackendStats;

/// Counters of one matching run.
///
/// # Example
///
/// ```
/// use recipeforge_solver::stats::MatchStats;
///
/// let mut stats = MatchStats::default();
/// stats.start();
/// stats.record_solution();
/// stats.record_solution();
///
/// assert_eq!(stats.solutions_found, 2);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchStats {
    #[serde(skip)]
    start_time: Option<Instant>,
    /// Candidate links, one per solver variable.
    pub variables: usize,
    /// Clauses and cardinality constraints before enumeration.
    pub constraints: usize,
    /// Assignments produced.
    pub solutions_found: u64,
    /// Backend `solve` calls.
    pub solve_calls: u64,
    /// Backend branching decisions.
    pub decisions: u64,
    /// Backend conflicts.
    pub conflicts: u64,
    /// Backend unit propagations.
    pub propagations: u64,
}

impl MatchStats {
    /// Marks the start of the run.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Returns the elapsed time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Returns the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn record_solution(&mut self) {
        self.solutions_found += 1;
    }

    /// Records the size of the encoded system.
    pub fn record_system(&mut self, size: SystemSize) {
        self.variables = size.variables;
        self.constraints = size.constraints();
    }

    /// Copies the backend's search counters.
    pub fn record_backend(&mut self, backend: BackendStats) {
        self.solve_calls = backend.solve_calls;
        self.decisions = backend.decisions;
        self.conflicts = backend.conflicts;
        self.propagations = backend.propagations;
    }

    /// Returns the solutions per second rate.
    pub fn solutions_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.solutions_found as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_system_and_backend() {
        let mut stats = MatchStats::default();
        stats.record_system(SystemSize {
            variables: 6,
            coverage: 4,
            topology: 2,
            capacity: 1,
        });
        stats.record_backend(BackendStats {
            solve_calls: 3,
            decisions: 10,
            conflicts: 2,
            propagations: 40,
        });

        assert_eq!(stats.variables, 6);
        assert_eq!(stats.constraints, 7);
        assert_eq!(stats.solve_calls, 3);
        assert_eq!(stats.conflicts, 2);
    }

    #[test]
    fn test_not_started() {
        let stats = MatchStats::default();
        assert_eq!(stats.elapsed(), Duration::ZERO);
        assert_eq!(stats.solutions_per_second(), 0.0);
    }
}
