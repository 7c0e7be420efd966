//! Boolean satisfiability primitive.
//!
//! The matching engine talks to its solving engine only through
//! [`SatBackend`]: variables, clauses, at-most-k constraints and a `solve`
//! call that returns one model at a time. [`DpllBackend`] is the shipped
//! implementation.

mod dpll;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use smallvec::SmallVec;
use thiserror::Error;

pub use dpll::DpllBackend;

/// A boolean variable, numbered from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(pub u32);

impl Var {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A variable or its negation.
///
/// Encoded as `2 * var + negated` so literals index flat tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    pub fn positive(var: Var) -> Self {
        Lit(var.0 << 1)
    }

    pub fn negative(var: Var) -> Self {
        Lit((var.0 << 1) | 1)
    }

    pub fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    pub fn is_negative(self) -> bool {
        self.0 & 1 == 1
    }

    /// Returns the complementary literal.
    pub fn negate(self) -> Self {
        Lit(self.0 ^ 1)
    }

    /// Returns the dense table index of this literal.
    pub fn code(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "¬{}", self.var())
        } else {
            write!(f, "{}", self.var())
        }
    }
}

/// A disjunction of literals.
pub type Clause = SmallVec<[Lit; 4]>;

/// A satisfying assignment, indexed by variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Returns the value of `var`; variables beyond the model are false.
    pub fn value(&self, var: Var) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    /// Returns the variables assigned true, in ascending order.
    pub fn true_vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| Var(i as u32))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Why a search stopped before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    TimedOut(Duration),
}

/// Result of one `solve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatOutcome {
    Sat(Model),
    Unsat,
    Stopped(StopReason),
}

/// Error raised by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("variable {var} outside of the {declared} declared variables")]
    UnknownVariable { var: Var, declared: usize },

    #[error("{0}")]
    Failure(String),
}

/// Cooperative stop condition polled during search.
///
/// Combines an external cancellation flag with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    cancel: Option<Arc<AtomicBool>>,
    deadline: Option<(Instant, Duration)>,
}

impl StopSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Fires once `limit` has elapsed from now.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.deadline = Some((Instant::now() + limit, limit));
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Returns the reason to stop, if any. Cancellation wins over timeout.
    pub fn poll(&self) -> Option<StopReason> {
        if self.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some((deadline, limit)) if Instant::now() >= deadline => {
                Some(StopReason::TimedOut(limit))
            }
            _ => None,
        }
    }
}

/// Search counters reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub solve_calls: u64,
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
}

/// An incremental SAT engine.
///
/// Constraints only ever grow: enumeration adds one blocking clause after
/// each model and calls [`solve`](SatBackend::solve) again.
pub trait SatBackend {
    /// Short engine name used in logs.
    fn name(&self) -> &'static str;

    /// Declares variables `0..count`.
    fn reserve_vars(&mut self, count: usize);

    /// Adds a clause. An empty clause makes the system unsatisfiable.
    fn add_clause(&mut self, lits: &[Lit]) -> Result<(), BackendError>;

    /// Adds the constraint that at most `k` of `vars` are true.
    fn add_at_most(&mut self, vars: &[Var], k: usize) -> Result<(), BackendError>;

    /// Searches for a model of the current constraints.
    fn solve(&mut self, stop: &StopSignal) -> Result<SatOutcome, BackendError>;

    fn var_count(&self) -> usize;

    fn clause_count(&self) -> usize;

    fn stats(&self) -> BackendStats {
        BackendStats::default()
    }
}

impl<B: SatBackend + ?Sized> SatBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn reserve_vars(&mut self, count: usize) {
        (**self).reserve_vars(count)
    }

    fn add_clause(&mut self, lits: &[Lit]) -> Result<(), BackendError> {
        (**self).add_clause(lits)
    }

    fn add_at_most(&mut self, vars: &[Var], k: usize) -> Result<(), BackendError> {
        (**self).add_at_most(vars, k)
    }

    fn solve(&mut self, stop: &StopSignal) -> Result<SatOutcome, BackendError> {
        (**self).solve(stop)
    }

    fn var_count(&self) -> usize {
        (**self).var_count()
    }

    fn clause_count(&self) -> usize {
        (**self).clause_count()
    }

    fn stats(&self) -> BackendStats {
        (**self).stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_encoding() {
        let v = Var(7);
        let pos = Lit::positive(v);
        let neg = Lit::negative(v);

        assert_eq!(pos.var(), v);
        assert_eq!(neg.var(), v);
        assert!(!pos.is_negative());
        assert!(neg.is_negative());
        assert_eq!(pos.negate(), neg);
        assert_eq!(neg.negate(), pos);
        assert_eq!(pos.code(), 14);
        assert_eq!(neg.code(), 15);
    }

    #[test]
    fn test_model_true_vars() {
        let model = Model::new(vec![false, true, true, false]);
        assert_eq!(model.true_vars().collect::<Vec<_>>(), vec![Var(1), Var(2)]);
        assert!(!model.value(Var(9)));
    }

    #[test]
    fn test_stop_signal() {
        let flag = Arc::new(AtomicBool::new(false));
        let stop = StopSignal::never().with_cancel_flag(flag.clone());
        assert_eq!(stop.poll(), None);

        flag.store(true, Ordering::SeqCst);
        assert_eq!(stop.poll(), Some(StopReason::Cancelled));

        let expired = StopSignal::never().with_time_limit(Duration::ZERO);
        assert_eq!(expired.poll(), Some(StopReason::TimedOut(Duration::ZERO)));
    }
}
