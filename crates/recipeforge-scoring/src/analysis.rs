//! Cost analysis of a single assignment.
//!
//! Totals sum the cost attributes of the assigned resources. A resource
//! serving several steps is counted once per step.

use std::collections::{BTreeMap, HashMap};

use recipeforge_core::{Assignment, CapabilityModel, CostTotals, MatchError, Result, ResourceCosts};

/// Raw totals and resource usage of one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct CostAnalysis {
    /// Sum of the assigned resources' costs.
    pub totals: CostTotals,
    /// Number of steps served by each resource.
    pub resource_usage: BTreeMap<String, usize>,
}

impl CostAnalysis {
    /// Analyzes `assignment` against the resources of `model`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Internal`] if the assignment names a resource
    /// the model does not contain.
    pub fn of(assignment: &Assignment, model: &CapabilityModel) -> Result<Self> {
        let costs: HashMap<&str, ResourceCosts> = model
            .resources
            .iter()
            .map(|r| (r.id.as_str(), r.costs))
            .collect();
        Self::with_costs(assignment, &costs)
    }

    pub(crate) fn with_costs(
        assignment: &Assignment,
        costs: &HashMap<&str, ResourceCosts>,
    ) -> Result<Self> {
        let mut totals = CostTotals::default();
        let mut resource_usage = BTreeMap::new();

        for entry in assignment.iter() {
            let cost = costs.get(entry.resource_id.as_str()).ok_or_else(|| {
                MatchError::Internal(format!(
                    "solution {} assigns unknown resource {}",
                    assignment.solution_id, entry.resource_id
                ))
            })?;
            totals.energy += cost.energy;
            totals.usage += cost.usage;
            totals.co2 += cost.co2;
            *resource_usage.entry(entry.resource_id.clone()).or_insert(0) += 1;
        }

        Ok(Self {
            totals,
            resource_usage,
        })
    }

    /// Returns the number of distinct resources used.
    pub fn distinct_resources(&self) -> usize {
        self.resource_usage.len()
    }
}
