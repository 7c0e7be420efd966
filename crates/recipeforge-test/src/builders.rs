//! Small constructors shared by fixture modules and tests.

use recipeforge_core::{
    Assignment, AssignmentEntry, Capability, RequirementModel, Resource, ResourceCosts, Step,
};

/// Builds an assignment from `(step, resource)` pairs.
///
/// Entries carry no description and no capability details.
///
/// # Example
///
/// ```
/// use recipeforge_test::assignment;
///
/// let a = assignment(1, &[("A", "R1"), ("B", "R2")]);
/// assert_eq!(a.resource_for("B"), Some("R2"));
/// ```
pub fn assignment(solution_id: usize, pairs: &[(&str, &str)]) -> Assignment {
    let entries = pairs
        .iter()
        .map(|(step, resource)| AssignmentEntry {
            step_id: step.to_string(),
            step_description: String::new(),
            resource_id: resource.to_string(),
            capabilities: Vec::new(),
        })
        .collect();
    Assignment::new(solution_id, entries)
}

/// Creates a resource offering one capability with the given costs.
pub fn costed_resource(id: &str, capability: &str, energy: f64, usage: f64, co2: f64) -> Resource {
    Resource::new(id)
        .with_capability(Capability::new(capability))
        .with_costs(ResourceCosts::new(energy, usage, co2))
}

/// Creates a linear chain of steps `S1 → S2 → …`, one per capability.
pub fn chain(capabilities: &[&str]) -> RequirementModel {
    let n = capabilities.len();
    let steps = capabilities
        .iter()
        .enumerate()
        .map(|(i, cap)| {
            let step = Step::new(format!("S{}", i + 1), *cap);
            if i + 1 < n {
                step.with_successor(format!("S{}", i + 2))
            } else {
                step
            }
        })
        .collect();
    RequirementModel::new(steps)
}
