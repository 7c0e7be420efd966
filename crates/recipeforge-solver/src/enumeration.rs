//! Blocking-clause model enumeration over any [`SatBackend`].
//!
//! After each model, the conjunction of its true projection variables is
//! negated and added as a clause, and the backend is asked again. The loop
//! ends when the backend reports unsatisfiable, the model limit is reached,
//! the consumer asks to stop, or the stop signal fires.

use std::ops::ControlFlow;

use tracing::trace;

use crate::sat::{
    BackendError, Clause, Lit, Model, SatBackend, SatOutcome, StopReason, StopSignal, Var,
};

/// Why enumeration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationEnd {
    /// Every model was produced.
    Exhausted,
    /// The model limit was reached.
    LimitReached,
    /// The consumer returned `ControlFlow::Break`.
    Halted,
    /// The stop signal fired.
    Stopped(StopReason),
}

/// Summary of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumeration {
    pub models: u64,
    pub end: EnumerationEnd,
}

/// Enumerates the models of `backend`, projected onto `projection`.
///
/// The stop signal is checked before every `solve` call. Models that agree
/// on every projection variable are reported once.
///
/// # Example
///
/// ```
/// use std::ops::ControlFlow;
/// use recipeforge_solver::enumeration::{enumerate_models, EnumerationEnd};
/// use recipeforge_solver::sat::{BackendError, DpllBackend, Lit, SatBackend, StopSignal, Var};
///
/// let mut backend = DpllBackend::new();
/// backend.reserve_vars(2);
/// backend.add_clause(&[Lit::positive(Var(0)), Lit::positive(Var(1))]).unwrap();
///
/// let mut count = 0;
/// let summary = enumerate_models::<_, _, BackendError>(
///     &mut backend,
///     &[Var(0), Var(1)],
///     &StopSignal::never(),
///     None,
///     |_model| {
///         count += 1;
///         Ok(ControlFlow::Continue(()))
///     },
/// )
/// .unwrap();
///
/// assert_eq!(count, 3);
/// assert_eq!(summary.end, EnumerationEnd::Exhausted);
/// ```
pub fn enumerate_models<B, F, E>(
    backend: &mut B,
    projection: &[Var],
    stop: &StopSignal,
    max_models: Option<u64>,
    mut on_model: F,
) -> Result<Enumeration, E>
where
    B: SatBackend + ?Sized,
    F: FnMut(&Model) -> Result<ControlFlow<()>, E>,
    E: From<BackendError>,
{
    let mut models = 0u64;
    loop {
        if let Some(reason) = stop.poll() {
            return Ok(Enumeration {
                models,
                end: EnumerationEnd::Stopped(reason),
            });
        }

        let model = match backend.solve(stop)? {
            SatOutcome::Sat(model) => model,
            SatOutcome::Unsat => {
                return Ok(Enumeration {
                    models,
                    end: EnumerationEnd::Exhausted,
                })
            }
            SatOutcome::Stopped(reason) => {
                return Ok(Enumeration {
                    models,
                    end: EnumerationEnd::Stopped(reason),
                })
            }
        };

        models += 1;
        if on_model(&model)?.is_break() {
            return Ok(Enumeration {
                models,
                end: EnumerationEnd::Halted,
            });
        }
        if max_models.is_some_and(|max| models >= max) {
            return Ok(Enumeration {
                models,
                end: EnumerationEnd::LimitReached,
            });
        }

        let blocking = blocking_clause(&model, projection);
        trace!(event = "blocking_clause", model = models, width = blocking.len());
        if blocking.is_empty() {
            // Nothing left to distinguish: the projected model was unique.
            return Ok(Enumeration {
                models,
                end: EnumerationEnd::Exhausted,
            });
        }
        backend.add_clause(&blocking)?;
    }
}

/// Negates the conjunction of the projection variables true in `model`.
pub fn blocking_clause(model: &Model, projection: &[Var]) -> Clause {
    projection
        .iter()
        .filter(|&&v| model.value(v))
        .map(|&v| Lit::negative(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::DpllBackend;

    fn exactly_one_of(n: u32) -> DpllBackend {
        let mut backend = DpllBackend::new();
        backend.reserve_vars(n as usize);
        let all: Vec<Var> = (0..n).map(Var).collect();
        let clause: Vec<Lit> = all.iter().map(|&v| Lit::positive(v)).collect();
        backend.add_clause(&clause).unwrap();
        backend.add_at_most(&all, 1).unwrap();
        backend
    }

    fn collect(
        backend: &mut DpllBackend,
        projection: &[Var],
        stop: &StopSignal,
        max: Option<u64>,
    ) -> (Vec<Vec<Var>>, Enumeration) {
        let mut seen = Vec::new();
        let summary = enumerate_models::<_, _, BackendError>(backend, projection, stop, max, |m| {
            seen.push(m.true_vars().collect());
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();
        (seen, summary)
    }

    #[test]
    fn test_enumerates_in_discovery_order() {
        let mut backend = exactly_one_of(3);
        let all = [Var(0), Var(1), Var(2)];
        let (seen, summary) = collect(&mut backend, &all, &StopSignal::never(), None);

        assert_eq!(seen, vec![vec![Var(0)], vec![Var(1)], vec![Var(2)]]);
        assert_eq!(summary.models, 3);
        assert_eq!(summary.end, EnumerationEnd::Exhausted);
    }

    #[test]
    fn test_model_limit() {
        let mut backend = exactly_one_of(5);
        let all: Vec<Var> = (0..5).map(Var).collect();
        let (seen, summary) = collect(&mut backend, &all, &StopSignal::never(), Some(2));

        assert_eq!(seen.len(), 2);
        assert_eq!(summary.end, EnumerationEnd::LimitReached);
    }

    #[test]
    fn test_empty_projection_yields_one_model() {
        let mut backend = DpllBackend::new();
        let (seen, summary) = collect(&mut backend, &[], &StopSignal::never(), None);
        assert_eq!(seen, vec![Vec::<Var>::new()]);
        assert_eq!(summary.end, EnumerationEnd::Exhausted);
    }

    #[test]
    fn test_stopped_before_first_solve() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;

        let mut backend = exactly_one_of(2);
        let stop = StopSignal::never().with_cancel_flag(Arc::new(AtomicBool::new(true)));
        let (seen, summary) = collect(&mut backend, &[Var(0), Var(1)], &stop, None);

        assert!(seen.is_empty());
        assert_eq!(summary.end, EnumerationEnd::Stopped(StopReason::Cancelled));
        assert_eq!(backend.stats().solve_calls, 0);
    }

    #[test]
    fn test_consumer_halts() {
        let mut backend = exactly_one_of(4);
        let all: Vec<Var> = (0..4).map(Var).collect();
        let summary = enumerate_models::<_, _, BackendError>(
            &mut backend,
            &all,
            &StopSignal::never(),
            None,
            |_| Ok(ControlFlow::Break(())),
        )
        .unwrap();
        assert_eq!(summary.models, 1);
        assert_eq!(summary.end, EnumerationEnd::Halted);
    }
}
