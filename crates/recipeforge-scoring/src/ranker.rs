//! Min-max normalization and ranking of an assignment set.

use std::collections::HashMap;

use recipeforge_core::{
    Assignment, CapabilityModel, CostTotals, ResourceCosts, Result, ScoredAssignment, SolutionSet,
};

use crate::analysis::CostAnalysis;
use crate::weights::{CostCriterion, ScoreWeights};

/// Scores and sorts assignments by weighted normalized cost.
///
/// Each criterion total is normalized across the whole set as
/// `(v - min) / (max - min)`, or 0 when every assignment has the same
/// total. The score is the weighted sum of the normalized totals; lower is
/// better. Sorting is stable, so equal scores keep discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ranker {
    weights: ScoreWeights,
}

impl Ranker {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Scores `assignments` and returns them in ascending score order.
    ///
    /// # Errors
    ///
    /// Fails if an assignment names a resource missing from `model`.
    pub fn rank(
        &self,
        assignments: Vec<Assignment>,
        model: &CapabilityModel,
    ) -> Result<Vec<ScoredAssignment>> {
        let costs: HashMap<&str, ResourceCosts> = model
            .resources
            .iter()
            .map(|r| (r.id.as_str(), r.costs))
            .collect();

        let analyses = assignments
            .iter()
            .map(|a| CostAnalysis::with_costs(a, &costs))
            .collect::<Result<Vec<_>>>()?;

        let bounds = CostCriterion::ALL.map(|c| {
            analyses.iter().map(|a| c.of(&a.totals)).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| (lo.min(v), hi.max(v)),
            )
        });

        let mut scored: Vec<ScoredAssignment> = assignments
            .into_iter()
            .zip(analyses)
            .map(|(assignment, analysis)| {
                let [energy, usage, co2] = [0, 1, 2].map(|i| {
                    let criterion = CostCriterion::ALL[i];
                    let (lo, hi) = bounds[i];
                    normalize(criterion.of(&analysis.totals), lo, hi)
                        * self.weights.get(criterion)
                });
                let weighted = CostTotals::new(energy, usage, co2);
                ScoredAssignment {
                    assignment,
                    score: weighted.sum(),
                    totals: analysis.totals,
                    weighted,
                    resource_usage: analysis.resource_usage,
                }
            })
            .collect();

        scored.sort_by(|a, b| a.score.total_cmp(&b.score));
        Ok(scored)
    }

    /// Ranks `assignments` into an Ultra-mode solution set.
    pub fn rank_set(
        &self,
        assignments: Vec<Assignment>,
        model: &CapabilityModel,
    ) -> Result<SolutionSet> {
        Ok(SolutionSet::ranked(self.rank(assignments, model)?))
    }
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        0.0
    }
}
