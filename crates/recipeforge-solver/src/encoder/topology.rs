//! Topology compatibility between consecutive steps.

use recipeforge_core::{InfeasibleReason, RequirementModel, Resource, Result};

/// Returns true if material can move from `from` to `to`.
///
/// Either side may declare the link. With `in_place_transfer`, a resource
/// is compatible with itself.
pub fn transfer_allowed(from: &Resource, to: &Resource, in_place_transfer: bool) -> bool {
    (in_place_transfer && from.id == to.id) || from.can_feed(to)
}

/// Returns the infeasibility reason if the step topology has a cycle.
///
/// # Errors
///
/// Fails with `MalformedConstraint` if an edge names an unknown step.
pub fn cycle_reason(requirements: &RequirementModel) -> Result<Option<InfeasibleReason>> {
    Ok(requirements
        .cyclic_steps()?
        .map(|steps| InfeasibleReason::TopologyCycle { steps }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipeforge_core::{Connection, Step};

    #[test]
    fn test_transfer_allowed() {
        let r1 = Resource::new("R1").with_connection(Connection::feeds("R2"));
        let r2 = Resource::new("R2");
        let r3 = Resource::new("R3").with_connection(Connection::receives("R1"));

        assert!(transfer_allowed(&r1, &r2, false));
        assert!(transfer_allowed(&r1, &r3, false));
        assert!(!transfer_allowed(&r2, &r1, true));
        assert!(transfer_allowed(&r2, &r2, true));
        assert!(!transfer_allowed(&r2, &r2, false));
    }

    #[test]
    fn test_cycle_reason() {
        let cyclic = RequirementModel::new(vec![
            Step::new("A", "Mix").with_successor("B"),
            Step::new("B", "Heat").with_successor("A"),
        ]);
        assert_eq!(
            cycle_reason(&cyclic).unwrap(),
            Some(InfeasibleReason::TopologyCycle {
                steps: vec!["A".into(), "B".into()]
            })
        );

        let self_loop = RequirementModel::new(vec![Step::new("A", "Mix").with_successor("A")]);
        assert!(cycle_reason(&self_loop).unwrap().is_some());

        let dangling = RequirementModel::new(vec![Step::new("A", "Mix").with_successor("Q")]);
        assert!(cycle_reason(&dangling).is_err());
    }
}
