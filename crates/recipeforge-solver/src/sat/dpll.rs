//! Deterministic DPLL search with unit propagation.
//!
//! Depth-first search over variables in index order, trying `true` before
//! `false`, with chronological backtracking. Propagation handles clauses and
//! at-most-k constraints through occurrence lists. Every `solve` call starts
//! from an empty trail, so models come out in a stable order for a given
//! constraint set.

use smallvec::SmallVec;
use tracing::trace;

use super::{
    BackendError, BackendStats, Clause, Lit, Model, SatBackend, SatOutcome, StopSignal, Var,
};

/// How many decisions pass between two polls of the stop signal.
const POLL_INTERVAL: u64 = 256;

#[derive(Debug, Clone)]
struct AtMost {
    vars: SmallVec<[Var; 8]>,
    k: usize,
}

/// A decision on the search stack.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Trail length before the decision.
    trail_len: usize,
    lit: Lit,
    flipped: bool,
}

/// The shipped [`SatBackend`].
///
/// # Example
///
/// ```
/// use recipeforge_solver::sat::{DpllBackend, Lit, SatBackend, SatOutcome, StopSignal, Var};
///
/// let mut backend = DpllBackend::new();
/// backend.reserve_vars(2);
/// backend.add_clause(&[Lit::positive(Var(0)), Lit::positive(Var(1))]).unwrap();
/// backend.add_clause(&[Lit::negative(Var(0))]).unwrap();
///
/// match backend.solve(&StopSignal::never()).unwrap() {
///     SatOutcome::Sat(model) => {
///         assert!(!model.value(Var(0)));
///         assert!(model.value(Var(1)));
///     }
///     other => panic!("expected a model, got {other:?}"),
/// }
/// ```
#[derive(Debug, Default)]
pub struct DpllBackend {
    num_vars: usize,
    clauses: Vec<Clause>,
    at_most: Vec<AtMost>,
    /// Clause indices by literal code.
    clause_occ: Vec<Vec<usize>>,
    /// At-most constraint indices by variable.
    card_occ: Vec<Vec<usize>>,
    values: Vec<Option<bool>>,
    trail: Vec<Lit>,
    /// Next trail position to propagate.
    qhead: usize,
    /// An empty clause was added.
    trivially_unsat: bool,
    stats: BackendStats,
}

impl DpllBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_var(&self, var: Var) -> Result<(), BackendError> {
        if var.index() < self.num_vars {
            Ok(())
        } else {
            Err(BackendError::UnknownVariable {
                var,
                declared: self.num_vars,
            })
        }
    }

    fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.var().index()].map(|v| v != lit.is_negative())
    }

    /// Makes `lit` true. Returns false on conflict.
    fn assign(&mut self, lit: Lit) -> bool {
        match self.lit_value(lit) {
            Some(value) => value,
            None => {
                self.values[lit.var().index()] = Some(!lit.is_negative());
                self.trail.push(lit);
                true
            }
        }
    }

    fn undo_to(&mut self, trail_len: usize) {
        for lit in self.trail.drain(trail_len..) {
            self.values[lit.var().index()] = None;
        }
        self.qhead = trail_len;
    }

    /// Propagates the unprocessed part of the trail. Returns false on conflict.
    fn propagate(&mut self) -> bool {
        while self.qhead < self.trail.len() {
            let lit = self.trail[self.qhead];
            self.qhead += 1;
            self.stats.propagations += 1;

            // Clauses containing the now false literal may have become unit.
            let falsified = lit.negate().code();
            for i in 0..self.clause_occ[falsified].len() {
                let ci = self.clause_occ[falsified][i];
                let mut unassigned = None;
                let mut open = 0usize;
                let mut satisfied = false;
                for &l in &self.clauses[ci] {
                    match self.lit_value(l) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            open += 1;
                            unassigned = Some(l);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match (open, unassigned) {
                    (0, _) => return false,
                    (1, Some(unit)) => {
                        if !self.assign(unit) {
                            return false;
                        }
                    }
                    _ => {}
                }
            }

            if lit.is_negative() {
                continue;
            }
            let var = lit.var().index();
            for i in 0..self.card_occ[var].len() {
                let ki = self.card_occ[var][i];
                let k = self.at_most[ki].k;
                let count = self.at_most[ki]
                    .vars
                    .iter()
                    .filter(|v| self.values[v.index()] == Some(true))
                    .count();
                if count > k {
                    return false;
                }
                if count == k {
                    for j in 0..self.at_most[ki].vars.len() {
                        let other = self.at_most[ki].vars[j];
                        if self.values[other.index()].is_none() {
                            self.assign(Lit::negative(other));
                        }
                    }
                }
            }
        }
        true
    }

    fn next_unassigned(&self) -> Option<Var> {
        self.values
            .iter()
            .position(Option::is_none)
            .map(|i| Var(i as u32))
    }

    /// Resets the trail and applies constraints that hold at the root.
    fn start(&mut self) -> bool {
        self.values.clear();
        self.values.resize(self.num_vars, None);
        self.trail.clear();
        self.qhead = 0;

        if self.trivially_unsat {
            return false;
        }
        for ci in 0..self.clauses.len() {
            if self.clauses[ci].len() == 1 && !self.assign(self.clauses[ci][0]) {
                return false;
            }
        }
        for ki in 0..self.at_most.len() {
            if self.at_most[ki].k == 0 {
                for j in 0..self.at_most[ki].vars.len() {
                    let var = self.at_most[ki].vars[j];
                    if !self.assign(Lit::negative(var)) {
                        return false;
                    }
                }
            }
        }
        self.propagate()
    }

    fn model(&self) -> Model {
        Model::new(self.values.iter().map(|v| v.unwrap_or(false)).collect())
    }
}

impl SatBackend for DpllBackend {
    fn name(&self) -> &'static str {
        "dpll"
    }

    fn reserve_vars(&mut self, count: usize) {
        if count > self.num_vars {
            self.num_vars = count;
            self.clause_occ.resize(count * 2, Vec::new());
            self.card_occ.resize(count, Vec::new());
        }
    }

    fn add_clause(&mut self, lits: &[Lit]) -> Result<(), BackendError> {
        for lit in lits {
            self.check_var(lit.var())?;
        }
        let mut clause: Clause = lits.iter().copied().collect();
        clause.sort_unstable();
        clause.dedup();
        // A clause with both polarities of a variable is always true.
        if clause.windows(2).any(|w| w[0].var() == w[1].var()) {
            return Ok(());
        }
        if clause.is_empty() {
            self.trivially_unsat = true;
        }

        let ci = self.clauses.len();
        for lit in &clause {
            self.clause_occ[lit.code()].push(ci);
        }
        self.clauses.push(clause);
        Ok(())
    }

    fn add_at_most(&mut self, vars: &[Var], k: usize) -> Result<(), BackendError> {
        for &var in vars {
            self.check_var(var)?;
        }
        let mut vars: SmallVec<[Var; 8]> = vars.iter().copied().collect();
        vars.sort_unstable();
        vars.dedup();
        if vars.len() <= k {
            return Ok(());
        }

        let ki = self.at_most.len();
        for var in &vars {
            self.card_occ[var.index()].push(ki);
        }
        self.at_most.push(AtMost { vars, k });
        Ok(())
    }

    fn solve(&mut self, stop: &StopSignal) -> Result<SatOutcome, BackendError> {
        self.stats.solve_calls += 1;
        if !self.start() {
            return Ok(SatOutcome::Unsat);
        }

        let mut frames: Vec<Frame> = Vec::new();
        let mut since_poll = 0u64;
        loop {
            since_poll += 1;
            if since_poll >= POLL_INTERVAL {
                since_poll = 0;
                if let Some(reason) = stop.poll() {
                    trace!(event = "dpll_stopped", decisions = self.stats.decisions);
                    return Ok(SatOutcome::Stopped(reason));
                }
            }

            let Some(var) = self.next_unassigned() else {
                trace!(
                    event = "dpll_model",
                    depth = frames.len(),
                    decisions = self.stats.decisions,
                    conflicts = self.stats.conflicts,
                );
                return Ok(SatOutcome::Sat(self.model()));
            };

            self.stats.decisions += 1;
            let decision = Lit::positive(var);
            frames.push(Frame {
                trail_len: self.trail.len(),
                lit: decision,
                flipped: false,
            });

            let mut next = decision;
            while !(self.assign(next) && self.propagate()) {
                self.stats.conflicts += 1;
                next = loop {
                    let Some(frame) = frames.last_mut() else {
                        return Ok(SatOutcome::Unsat);
                    };
                    let (trail_len, lit, flipped) = (frame.trail_len, frame.lit, frame.flipped);
                    if flipped {
                        frames.pop();
                        continue;
                    }
                    frame.flipped = true;
                    self.undo_to(trail_len);
                    break lit.negate();
                };
            }
        }
    }

    fn var_count(&self) -> usize {
        self.num_vars
    }

    fn clause_count(&self) -> usize {
        self.clauses.len() + self.at_most.len()
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(backend: &mut DpllBackend) -> SatOutcome {
        backend.solve(&StopSignal::never()).unwrap()
    }

    fn pos(i: u32) -> Lit {
        Lit::positive(Var(i))
    }

    fn neg(i: u32) -> Lit {
        Lit::negative(Var(i))
    }

    #[test]
    fn test_empty_system_is_sat() {
        let mut backend = DpllBackend::new();
        assert_eq!(solve(&mut backend), SatOutcome::Sat(Model::new(vec![])));
    }

    #[test]
    fn test_empty_clause_is_unsat() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(1);
        backend.add_clause(&[]).unwrap();
        assert_eq!(solve(&mut backend), SatOutcome::Unsat);
    }

    #[test]
    fn test_contradicting_units() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(1);
        backend.add_clause(&[pos(0)]).unwrap();
        backend.add_clause(&[neg(0)]).unwrap();
        assert_eq!(solve(&mut backend), SatOutcome::Unsat);
    }

    #[test]
    fn test_backtracks_to_find_model() {
        // x0 forces x1 and x2, which exclude each other, so x0 must be false.
        let mut backend = DpllBackend::new();
        backend.reserve_vars(3);
        backend.add_clause(&[neg(0), pos(1)]).unwrap();
        backend.add_clause(&[neg(0), pos(2)]).unwrap();
        backend.add_clause(&[neg(1), neg(2)]).unwrap();

        match solve(&mut backend) {
            SatOutcome::Sat(model) => {
                assert!(!model.value(Var(0)));
                assert!(model.value(Var(1)));
                assert!(!model.value(Var(2)));
            }
            other => panic!("expected model, got {other:?}"),
        }
        assert!(backend.stats().conflicts >= 1);
    }

    #[test]
    fn test_at_most_one_with_at_least_one() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(3);
        backend.add_clause(&[pos(0), pos(1), pos(2)]).unwrap();
        backend.add_at_most(&[Var(0), Var(1), Var(2)], 1).unwrap();
        backend.add_clause(&[neg(0)]).unwrap();

        match solve(&mut backend) {
            SatOutcome::Sat(model) => {
                assert_eq!(model.true_vars().collect::<Vec<_>>(), vec![Var(1)]);
            }
            other => panic!("expected model, got {other:?}"),
        }
    }

    #[test]
    fn test_at_most_k_enforced() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(3);
        backend.add_at_most(&[Var(0), Var(1), Var(2)], 2).unwrap();
        for i in 0..3 {
            backend.add_clause(&[pos(i)]).unwrap();
        }
        assert_eq!(solve(&mut backend), SatOutcome::Unsat);
    }

    #[test]
    fn test_at_most_zero() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(2);
        backend.add_at_most(&[Var(0), Var(1)], 0).unwrap();
        backend.add_clause(&[pos(0), pos(1)]).unwrap();
        assert_eq!(solve(&mut backend), SatOutcome::Unsat);
    }

    #[test]
    fn test_blocking_clauses_exhaust_models() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(2);
        let mut seen = Vec::new();
        while let SatOutcome::Sat(model) = solve(&mut backend) {
            let block: Vec<Lit> = (0..2)
                .map(|i| if model.value(Var(i)) { neg(i) } else { pos(i) })
                .collect();
            seen.push(model);
            backend.add_clause(&block).unwrap();
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(backend.stats().solve_calls, 5);
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(1);
        assert_eq!(
            backend.add_clause(&[pos(3)]),
            Err(BackendError::UnknownVariable {
                var: Var(3),
                declared: 1
            })
        );
    }

    #[test]
    fn test_tautology_ignored() {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(1);
        backend.add_clause(&[pos(0), neg(0)]).unwrap();
        assert_eq!(backend.clause_count(), 0);
    }
}
