//! The boolean constraint system of one run.

use std::collections::BTreeMap;
use std::ops::Range;

use recipeforge_config::{CapacityPolicy, MatchConfig};
use recipeforge_core::{
    Assignment, AssignmentEntry, CapabilityModel, MatchError, RequirementModel, Result,
};
use smallvec::smallvec;
use tracing::debug;

use super::candidate::{CandidateLink, CandidateTable};
use super::topology::transfer_allowed;
use crate::sat::{BackendError, Clause, Lit, Model, SatBackend, Var};

/// Encoding switches taken from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub in_place_transfer: bool,
    pub capacity_policy: CapacityPolicy,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            in_place_transfer: true,
            capacity_policy: CapacityPolicy::Declared,
        }
    }
}

impl From<&MatchConfig> for EncodeOptions {
    fn from(config: &MatchConfig) -> Self {
        Self {
            in_place_transfer: config.in_place_transfer,
            capacity_policy: config.capacity_policy,
        }
    }
}

/// Constraint counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemSize {
    pub variables: usize,
    pub coverage: usize,
    pub topology: usize,
    pub capacity: usize,
}

impl SystemSize {
    /// Total number of constraints.
    pub fn constraints(&self) -> usize {
        self.coverage + self.topology + self.capacity
    }
}

/// Variables and constraints of a matching run.
///
/// Variable `i` stands for candidate link `i`; the links of one step occupy
/// a contiguous range.
#[derive(Debug, Clone)]
pub struct ConstraintSystem {
    links: Vec<CandidateLink>,
    step_vars: Vec<Range<u32>>,
    clauses: Vec<Clause>,
    at_most: Vec<(Vec<Var>, usize)>,
    size: SystemSize,
}

impl ConstraintSystem {
    /// Encodes the run.
    ///
    /// # Errors
    ///
    /// Fails with `MalformedConstraint` if a topology edge names an unknown
    /// step.
    pub fn encode(
        requirements: &RequirementModel,
        capabilities: &CapabilityModel,
        table: &CandidateTable,
        options: EncodeOptions,
    ) -> Result<Self> {
        let mut links = Vec::with_capacity(table.link_count());
        let mut step_vars = Vec::with_capacity(requirements.step_count());
        for step in 0..requirements.step_count() {
            let start = links.len() as u32;
            links.extend(table.for_step(step).iter().cloned());
            step_vars.push(start..links.len() as u32);
        }

        let mut system = Self {
            links,
            step_vars,
            clauses: Vec::new(),
            at_most: Vec::new(),
            size: SystemSize::default(),
        };
        system.size.variables = system.links.len();

        // Coverage: at least one and at most one candidate per step.
        for range in system.step_vars.clone() {
            let vars: Vec<Var> = range.map(Var).collect();
            system
                .clauses
                .push(vars.iter().map(|&v| Lit::positive(v)).collect());
            system.size.coverage += 1;
            if vars.len() > 1 {
                system.at_most.push((vars, 1));
                system.size.coverage += 1;
            }
        }

        for (from, to) in requirements.edges()? {
            for va in system.step_vars[from].clone().map(Var) {
                for vb in system.step_vars[to].clone().map(Var) {
                    let ra = &capabilities.resources[system.links[va.index()].resource];
                    let rb = &capabilities.resources[system.links[vb.index()].resource];
                    if !transfer_allowed(ra, rb, options.in_place_transfer) {
                        system
                            .clauses
                            .push(smallvec![Lit::negative(va), Lit::negative(vb)]);
                        system.size.topology += 1;
                    }
                }
            }
        }

        let mut by_resource: BTreeMap<usize, Vec<Var>> = BTreeMap::new();
        for (i, link) in system.links.iter().enumerate() {
            by_resource
                .entry(link.resource)
                .or_default()
                .push(Var(i as u32));
        }
        for (resource, vars) in by_resource {
            let limit = match options.capacity_policy {
                CapacityPolicy::Exclusive => Some(1),
                CapacityPolicy::Declared => capabilities.resources[resource].capacity.limit(),
            };
            if let Some(k) = limit {
                if vars.len() > k as usize {
                    system.at_most.push((vars, k as usize));
                    system.size.capacity += 1;
                }
            }
        }

        debug!(
            event = "encoded",
            variables = system.size.variables,
            coverage = system.size.coverage,
            topology = system.size.topology,
            capacity = system.size.capacity,
        );
        Ok(system)
    }

    pub fn size(&self) -> SystemSize {
        self.size
    }

    pub fn var_count(&self) -> usize {
        self.links.len()
    }

    /// Number of clauses and cardinality constraints.
    pub fn constraint_count(&self) -> usize {
        self.clauses.len() + self.at_most.len()
    }

    /// Returns the candidate link behind `var`.
    pub fn link(&self, var: Var) -> Option<&CandidateLink> {
        self.links.get(var.index())
    }

    /// Returns the variables of step `step`.
    pub fn step_vars(&self, step: usize) -> impl Iterator<Item = Var> {
        self.step_vars
            .get(step)
            .cloned()
            .unwrap_or(0..0)
            .map(Var)
    }

    /// All variables, the projection used for blocking clauses.
    pub fn vars(&self) -> Vec<Var> {
        (0..self.links.len() as u32).map(Var).collect()
    }

    /// Loads every constraint into `backend`.
    pub fn load_into<B: SatBackend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> std::result::Result<(), BackendError> {
        backend.reserve_vars(self.var_count());
        for clause in &self.clauses {
            backend.add_clause(clause)?;
        }
        for (vars, k) in &self.at_most {
            backend.add_at_most(vars, *k)?;
        }
        Ok(())
    }

    /// Reads an assignment out of a model.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Internal`] if the model does not select exactly
    /// one resource per step.
    pub fn decode(
        &self,
        model: &Model,
        solution_id: usize,
        requirements: &RequirementModel,
        capabilities: &CapabilityModel,
    ) -> Result<Assignment> {
        let mut entries = Vec::with_capacity(requirements.step_count());
        for (si, step) in requirements.steps.iter().enumerate() {
            let mut chosen = self.step_vars(si).filter(|&v| model.value(v));
            let (Some(var), None) = (chosen.next(), chosen.next()) else {
                return Err(MatchError::Internal(format!(
                    "model does not select exactly one resource for step {}",
                    step.id
                )));
            };
            let link = &self.links[var.index()];
            entries.push(AssignmentEntry {
                step_id: step.id.clone(),
                step_description: step.description.clone(),
                resource_id: capabilities.resources[link.resource].id.clone(),
                capabilities: link.capabilities.clone(),
            });
        }
        Ok(Assignment::new(solution_id, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipeforge_core::{Capacity, Connection};
    use recipeforge_test::builders::chain;
    use recipeforge_test::costed_resource;
    use recipeforge_test::grid::Grid;
    use recipeforge_test::mix_heat::{mix_heat_requirements, mix_heat_with_decoys};

    fn encode(
        requirements: &RequirementModel,
        capabilities: &CapabilityModel,
        options: EncodeOptions,
    ) -> ConstraintSystem {
        let table = CandidateTable::build(requirements, capabilities);
        ConstraintSystem::encode(requirements, capabilities, &table, options).unwrap()
    }

    #[test]
    fn test_only_candidates_become_variables() {
        let system = encode(
            &mix_heat_requirements(),
            &mix_heat_with_decoys(),
            EncodeOptions::default(),
        );
        assert_eq!(system.var_count(), 3);
        assert_eq!(system.step_vars(0).collect::<Vec<_>>(), vec![Var(0)]);
        assert_eq!(system.step_vars(1).collect::<Vec<_>>(), vec![Var(1), Var(2)]);
        assert_eq!(system.link(Var(2)).map(|l| l.resource), Some(2));
    }

    #[test]
    fn test_topology_clause_for_unconnected_pair() {
        let system = encode(
            &mix_heat_requirements(),
            &mix_heat_with_decoys(),
            EncodeOptions::default(),
        );
        // R1 → R3 is the only unconnected pair.
        assert_eq!(system.size().topology, 1);
        assert!(system
            .clauses
            .iter()
            .any(|c| c.as_slice() == [Lit::negative(Var(0)), Lit::negative(Var(2))]));
    }

    #[test]
    fn test_coverage_constraints() {
        let grid = Grid::new(3, 2);
        let system = encode(
            &grid.requirements(),
            &grid.capabilities(),
            EncodeOptions::default(),
        );
        assert_eq!(system.var_count(), 6);
        // One at-least-one clause and one at-most-one per step.
        assert_eq!(system.size().coverage, 6);
        assert_eq!(system.size().topology, 0);
        assert_eq!(system.size().capacity, 0);
    }

    #[test]
    fn test_capacity_policies() {
        let requirements = chain(&["Op", "Op", "Op"]);
        let capabilities = CapabilityModel::new(vec![
            costed_resource("R1", "Op", 1.0, 1.0, 1.0).with_capacity(Capacity::Limited(2)),
            costed_resource("R2", "Op", 1.0, 1.0, 1.0),
        ]);

        let declared = encode(&requirements, &capabilities, EncodeOptions::default());
        assert_eq!(declared.size().capacity, 1);
        assert!(declared.at_most.iter().any(|(vars, k)| *k == 2 && vars.len() == 3));

        let exclusive = encode(
            &requirements,
            &capabilities,
            EncodeOptions {
                capacity_policy: CapacityPolicy::Exclusive,
                ..EncodeOptions::default()
            },
        );
        assert_eq!(exclusive.size().capacity, 2);
    }

    #[test]
    fn test_in_place_transfer_switch() {
        let requirements = chain(&["Op", "Op"]);
        let capabilities = CapabilityModel::new(vec![
            costed_resource("R1", "Op", 1.0, 1.0, 1.0).with_connection(Connection::feeds("R2")),
            costed_resource("R2", "Op", 1.0, 1.0, 1.0),
        ]);

        let allowed = encode(&requirements, &capabilities, EncodeOptions::default());
        // Only R2 → R1 is forbidden.
        assert_eq!(allowed.size().topology, 1);

        let forbidden = encode(
            &requirements,
            &capabilities,
            EncodeOptions {
                in_place_transfer: false,
                ..EncodeOptions::default()
            },
        );
        assert_eq!(forbidden.size().topology, 3);
    }

    #[test]
    fn test_decode() {
        let requirements = mix_heat_requirements();
        let capabilities = mix_heat_with_decoys();
        let system = encode(&requirements, &capabilities, EncodeOptions::default());

        let model = Model::new(vec![true, true, false]);
        let assignment = system.decode(&model, 1, &requirements, &capabilities).unwrap();
        assert_eq!(assignment.resource_for("A"), Some("R1"));
        assert_eq!(assignment.resource_for("B"), Some("R2"));
        assert_eq!(assignment.entries[1].step_description, "Heat the batch");
        assert_eq!(assignment.entries[1].capabilities[0].capability, "Heating");

        let ambiguous = Model::new(vec![true, true, true]);
        assert!(matches!(
            system.decode(&ambiguous, 2, &requirements, &capabilities),
            Err(MatchError::Internal(_))
        ));
    }
}
