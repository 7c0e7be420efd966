//! Candidate link prefilter.
//!
//! A (step, resource) pair becomes a candidate when one of the resource's
//! capabilities provides the step's capability tag, its preconditions hold
//! for the step's inputs, and every parameter requirement is met by an offer
//! with the same key and a compatible unit. Only candidates become solver
//! variables.

use recipeforge_core::{
    units_compatible, Capability, CapabilityMatch, CapabilityModel, MatchedParameter,
    RequirementModel, Resource, Step,
};

/// A (step, resource) pair that can be assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLink {
    /// Step index in the requirement model.
    pub step: usize,
    /// Resource index in the capability model.
    pub resource: usize,
    /// Capabilities of the resource that fulfil the step.
    pub capabilities: Vec<CapabilityMatch>,
}

/// Candidate links grouped by step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateTable {
    per_step: Vec<Vec<CandidateLink>>,
}

impl CandidateTable {
    /// Computes all candidate links, in step order then resource order.
    pub fn build(requirements: &RequirementModel, capabilities: &CapabilityModel) -> Self {
        let per_step = requirements
            .steps
            .iter()
            .enumerate()
            .map(|(si, step)| {
                capabilities
                    .resources
                    .iter()
                    .enumerate()
                    .filter_map(|(ri, resource)| match_resource(step, resource).map(|caps| {
                        CandidateLink {
                            step: si,
                            resource: ri,
                            capabilities: caps,
                        }
                    }))
                    .collect()
            })
            .collect();
        Self { per_step }
    }

    /// Returns the candidates of step `step`.
    pub fn for_step(&self, step: usize) -> &[CandidateLink] {
        self.per_step.get(step).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn step_count(&self) -> usize {
        self.per_step.len()
    }

    /// Total number of candidate links.
    pub fn link_count(&self) -> usize {
        self.per_step.iter().map(Vec::len).sum()
    }

    /// Indices of steps without any candidate.
    pub fn empty_steps(&self) -> Vec<usize> {
        self.per_step
            .iter()
            .enumerate()
            .filter(|(_, links)| links.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Product of the per-step candidate counts.
    ///
    /// Upper bound on the number of assignments, used for progress estimates.
    pub fn search_space(&self) -> f64 {
        self.per_step.iter().map(|l| l.len() as f64).product()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateLink> {
        self.per_step.iter().flatten()
    }
}

/// Returns the capabilities of `resource` that fulfil `step`, or `None`.
pub fn match_resource(step: &Step, resource: &Resource) -> Option<Vec<CapabilityMatch>> {
    let matches: Vec<CapabilityMatch> = resource
        .capabilities
        .iter()
        .filter_map(|cap| match_capability(step, cap))
        .collect();
    if matches.is_empty() {
        None
    } else {
        Some(matches)
    }
}

/// Matches one capability against a step.
pub fn match_capability(step: &Step, capability: &Capability) -> Option<CapabilityMatch> {
    if !capability.provides(&step.capability) {
        return None;
    }
    if !capability
        .preconditions
        .iter()
        .all(|pre| pre.is_met_by(&step.inputs))
    {
        return None;
    }

    let mut parameters = Vec::with_capacity(step.parameters.len());
    for req in &step.parameters {
        let offer = capability.offers.iter().find(|offer| {
            offer.key == req.key
                && units_compatible(req.unit.as_deref(), offer.unit.as_deref())
                && req.constraint.is_satisfied_by(&offer.value)
        })?;
        parameters.push(MatchedParameter {
            key: req.key.clone(),
            required: req.constraint.to_string(),
            offered: offer.value.to_string(),
            unit: req.unit.clone().or_else(|| offer.unit.clone()),
        });
    }

    Some(CapabilityMatch {
        capability: capability.name.clone(),
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipeforge_core::{
        Comparison, Material, OfferValue, ParameterOffer, ParameterRequirement, Precondition,
        ValueConstraint,
    };
    use recipeforge_test::mix_heat::{mix_heat_requirements, mix_heat_with_decoys};

    #[test]
    fn test_mix_heat_candidates() {
        let table = CandidateTable::build(&mix_heat_requirements(), &mix_heat_with_decoys());

        let a: Vec<usize> = table.for_step(0).iter().map(|l| l.resource).collect();
        let b: Vec<usize> = table.for_step(1).iter().map(|l| l.resource).collect();
        assert_eq!(a, vec![0]);
        // R4 only reaches 60 °C.
        assert_eq!(b, vec![1, 2]);
        assert_eq!(table.link_count(), 3);
        assert_eq!(table.search_space(), 2.0);
        assert!(table.empty_steps().is_empty());
    }

    #[test]
    fn test_matched_parameter_details() {
        let table = CandidateTable::build(&mix_heat_requirements(), &mix_heat_with_decoys());
        let link = &table.for_step(0)[0];

        assert_eq!(link.capabilities.len(), 1);
        let cap = &link.capabilities[0];
        assert_eq!(cap.capability, "Mixing");
        assert_eq!(cap.parameters[0].key, "rpm");
        assert_eq!(cap.parameters[0].required, "300");
        assert_eq!(cap.parameters[0].offered, "[0 - 500]");
        assert_eq!(cap.parameters[0].unit.as_deref(), Some("RPM"));
    }

    #[test]
    fn test_missing_offer_rejects() {
        let step = Step::new("S", "Heat").with_parameter(ParameterRequirement::new(
            "pressure",
            ValueConstraint::exact(2.0),
        ));
        let cap = Capability::new("Heat")
            .with_offer(ParameterOffer::new("temperature", OfferValue::range(0.0, 100.0)));
        assert!(match_capability(&step, &cap).is_none());
    }

    #[test]
    fn test_unit_mismatch_rejects() {
        let step = Step::new("S", "Heat").with_parameter(
            ParameterRequirement::new("temperature", ValueConstraint::exact(50.0))
                .with_unit("DEG_C"),
        );
        let kelvin = Capability::new("Heat").with_offer(
            ParameterOffer::new("temperature", OfferValue::range(0.0, 400.0)).with_unit("K"),
        );
        let celsius = Capability::new("Heat").with_offer(
            ParameterOffer::new("temperature", OfferValue::range(0.0, 400.0))
                .with_unit("http://qudt.org/vocab/unit/DEG_C"),
        );
        assert!(match_capability(&step, &kelvin).is_none());
        assert!(match_capability(&step, &celsius).is_some());
    }

    #[test]
    fn test_preconditions_checked_against_inputs() {
        let cap = Capability::new("Dose").with_precondition(Precondition::new(
            "Water",
            ValueConstraint::compare(Comparison::Le, 10.0),
        ));
        let small = Step::new("S", "Dose").with_input(Material::new("M", "Water", 4.0));
        let large = Step::new("S", "Dose").with_input(Material::new("M", "Water", 40.0));

        assert!(match_capability(&small, &cap).is_some());
        assert!(match_capability(&large, &cap).is_none());
    }

    #[test]
    fn test_any_matching_capability_suffices() {
        let step = Step::new("S", "Heat");
        let resource = Resource::new("R")
            .with_capability(Capability::new("Mix"))
            .with_capability(Capability::new("Heat"));
        let caps = match_resource(&step, &resource).unwrap();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].capability, "Heat");
    }
}
