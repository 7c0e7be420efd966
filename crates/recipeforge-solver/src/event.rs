//! Event system for run monitoring.
//!
//! Listeners receive the lifecycle of a matching run: start, each
//! assignment as it is found, progress estimates, and the end status.
//! [`MatchEventSupport`] broadcasts to every registered listener in
//! registration order, synchronously on the solving thread.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use recipeforge_core::Assignment;
//! use recipeforge_solver::event::{MatchEventListener, MatchEventSupport};
//!
//! #[derive(Debug)]
//! struct PrintListener;
//!
//! impl MatchEventListener for PrintListener {
//!     fn on_solution_found(&self, assignment: &Assignment) {
//!         println!("solution {}", assignment.solution_id);
//!     }
//! }
//!
//! let mut support = MatchEventSupport::new();
//! support.add_listener(Arc::new(PrintListener));
//! assert_eq!(support.listener_count(), 1);
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use recipeforge_core::{Assignment, MatchMode, MatchOutcome, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::stats::MatchStats;

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Solved,
    Infeasible,
    Cancelled,
    Failed,
}

impl MatchStatus {
    /// Classifies a run result.
    pub fn of(result: &Result<MatchOutcome>) -> Self {
        match result {
            Ok(MatchOutcome::Solved(_)) => MatchStatus::Solved,
            Ok(MatchOutcome::Infeasible(_)) => MatchStatus::Infeasible,
            Ok(MatchOutcome::Cancelled) => MatchStatus::Cancelled,
            Err(_) => MatchStatus::Failed,
        }
    }

    /// Returns the status as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Solved => "SOLVED",
            MatchStatus::Infeasible => "INFEASIBLE",
            MatchStatus::Cancelled => "CANCELLED",
            MatchStatus::Failed => "FAILED",
        }
    }
}

/// Listener for run lifecycle events.
pub trait MatchEventListener: Send + Sync + Debug {
    /// Called once before validation.
    fn on_match_started(&self, _steps: usize, _resources: usize, _mode: MatchMode) {}

    /// Called for every assignment, in discovery order.
    ///
    /// Solutions already reported are not withdrawn if the run is later
    /// cancelled.
    fn on_solution_found(&self, _assignment: &Assignment) {}

    /// Called with the number of solutions found and an estimated
    /// completion percentage, capped at 99 until the run completes.
    fn on_progress(&self, _found: u64, _estimate_percent: u8) {}

    /// Called once when the run ends, whatever the outcome.
    fn on_match_ended(&self, _status: MatchStatus, _stats: &MatchStats) {}
}

/// Broadcaster for run events.
#[derive(Default)]
pub struct MatchEventSupport {
    listeners: Vec<Arc<dyn MatchEventListener>>,
}

impl MatchEventSupport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn MatchEventListener>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn fire_match_started(&self, steps: usize, resources: usize, mode: MatchMode) {
        for listener in &self.listeners {
            listener.on_match_started(steps, resources, mode);
        }
    }

    pub fn fire_solution_found(&self, assignment: &Assignment) {
        for listener in &self.listeners {
            listener.on_solution_found(assignment);
        }
    }

    pub fn fire_progress(&self, found: u64, estimate_percent: u8) {
        for listener in &self.listeners {
            listener.on_progress(found, estimate_percent);
        }
    }

    pub fn fire_match_ended(&self, status: MatchStatus, stats: &MatchStats) {
        for listener in &self.listeners {
            listener.on_match_ended(status, stats);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl Debug for MatchEventSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEventSupport")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A listener that forwards events to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventListener {
    /// Prefix for log messages.
    prefix: String,
}

impl LoggingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logging listener with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl MatchEventListener for LoggingEventListener {
    fn on_match_started(&self, steps: usize, resources: usize, mode: MatchMode) {
        info!(prefix = %self.prefix, steps, resources, mode = %mode, "Matching started");
    }

    fn on_solution_found(&self, assignment: &Assignment) {
        info!(
            prefix = %self.prefix,
            solution_id = assignment.solution_id,
            steps = assignment.len(),
            "Solution found"
        );
    }

    fn on_progress(&self, found: u64, estimate_percent: u8) {
        info!(prefix = %self.prefix, found, estimate_percent, "Progress");
    }

    fn on_match_ended(&self, status: MatchStatus, stats: &MatchStats) {
        info!(
            prefix = %self.prefix,
            status = status.as_str(),
            solutions = stats.solutions_found,
            elapsed_ms = stats.elapsed_ms(),
            "Matching ended"
        );
    }
}

/// A listener that counts events.
///
/// Useful for testing and statistics collection.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    started_count: AtomicUsize,
    solution_count: AtomicUsize,
    progress_count: AtomicUsize,
    last_percent: AtomicUsize,
    ended_count: AtomicUsize,
}

impl CountingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started_count(&self) -> usize {
        self.started_count.load(Ordering::SeqCst)
    }

    pub fn solution_count(&self) -> usize {
        self.solution_count.load(Ordering::SeqCst)
    }

    pub fn progress_count(&self) -> usize {
        self.progress_count.load(Ordering::SeqCst)
    }

    /// Percentage of the most recent progress event.
    pub fn last_percent(&self) -> usize {
        self.last_percent.load(Ordering::SeqCst)
    }

    pub fn ended_count(&self) -> usize {
        self.ended_count.load(Ordering::SeqCst)
    }
}

impl MatchEventListener for CountingEventListener {
    fn on_match_started(&self, _steps: usize, _resources: usize, _mode: MatchMode) {
        self.started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_solution_found(&self, _assignment: &Assignment) {
        self.solution_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_progress(&self, _found: u64, estimate_percent: u8) {
        self.progress_count.fetch_add(1, Ordering::SeqCst);
        self.last_percent
            .store(estimate_percent as usize, Ordering::SeqCst);
    }

    fn on_match_ended(&self, _status: MatchStatus, _stats: &MatchStats) {
        self.ended_count.fetch_add(1, Ordering::SeqCst);
    }
}
