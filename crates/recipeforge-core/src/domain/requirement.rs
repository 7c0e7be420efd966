//! Requirement model: recipe steps and their topology.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::value::ValueConstraint;
use crate::error::{MatchError, Result};

/// A parameter a step requires of the resource that executes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRequirement {
    /// Parameter key, matched against offer keys.
    pub key: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit of measure, if any.
    #[serde(default)]
    pub unit: Option<String>,
    /// Permitted value.
    pub constraint: ValueConstraint,
}

impl ParameterRequirement {
    /// Creates a requirement without unit or description.
    pub fn new(key: impl Into<String>, constraint: ValueConstraint) -> Self {
        Self {
            key: key.into(),
            description: None,
            unit: None,
            constraint,
        }
    }

    /// Sets the unit of measure.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A material consumed by a step.
///
/// Resource preconditions are evaluated against these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub unit: Option<String>,
    pub quantity: f64,
}

impl Material {
    pub fn new(id: impl Into<String>, key: impl Into<String>, quantity: f64) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            unit: None,
            quantity,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// One recipe operation.
///
/// # Example
///
/// ```
/// use recipeforge_core::{ParameterRequirement, Step, ValueConstraint};
///
/// let step = Step::new("S1", "http://example.org/caps#Mixing")
///     .with_description("Mix the batch")
///     .with_parameter(ParameterRequirement::new("rpm", ValueConstraint::exact(300.0)))
///     .with_successor("S2");
///
/// assert_eq!(step.successors, vec!["S2".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Required capability, usually a semantic id.
    pub capability: String,
    #[serde(default)]
    pub parameters: Vec<ParameterRequirement>,
    /// Steps fed by this one, in recipe order.
    #[serde(default)]
    pub successors: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<Material>,
}

impl Step {
    /// Creates a step requiring `capability`.
    pub fn new(id: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            capability: capability.into(),
            parameters: Vec::new(),
            successors: Vec::new(),
            inputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterRequirement) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_successor(mut self, step_id: impl Into<String>) -> Self {
        self.successors.push(step_id.into());
        self
    }

    pub fn with_input(mut self, material: Material) -> Self {
        self.inputs.push(material);
        self
    }
}

/// The recipe side of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementModel {
    pub steps: Vec<Step>,
}

impl RequirementModel {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the index of the step with `id`.
    pub fn step_index(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Returns the topology edges as `(from, to)` step indices.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedConstraint`] if an edge names an
    /// unknown step.
    pub fn edges(&self) -> Result<Vec<(usize, usize)>> {
        let index: HashMap<&str, usize> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();

        let mut edges = Vec::new();
        for (from, step) in self.steps.iter().enumerate() {
            for succ in &step.successors {
                let to = index.get(succ.as_str()).copied().ok_or_else(|| {
                    MatchError::malformed(format!(
                        "step {}: successor {} does not exist",
                        step.id, succ
                    ))
                })?;
                edges.push((from, to));
            }
        }
        Ok(edges)
    }

    /// Validates ids, topology references and parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedConstraint`] on the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(MatchError::malformed(format!(
                    "duplicate step id {}",
                    step.id
                )));
            }
            for param in &step.parameters {
                param
                    .constraint
                    .validate(&format!("step {} parameter {}", step.id, param.key))?;
            }
            for material in &step.inputs {
                if !material.quantity.is_finite() {
                    return Err(MatchError::malformed(format!(
                        "step {} input {}: quantity must be finite",
                        step.id, material.id
                    )));
                }
            }
        }
        self.edges()?;
        Ok(())
    }

    /// Returns the ids of steps that lie on a topology cycle, if any.
    ///
    /// Uses Kahn's algorithm; every step not removed by it is on a cycle or
    /// downstream of one.
    pub fn cyclic_steps(&self) -> Result<Option<Vec<String>>> {
        let edges = self.edges()?;
        let n = self.steps.len();
        let mut in_degree = vec![0usize; n];
        let mut adjacency = vec![Vec::new(); n];
        for &(from, to) in &edges {
            in_degree[to] += 1;
            adjacency[from].push(to);
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut removed = vec![false; n];
        while let Some(i) = queue.pop_front() {
            removed[i] = true;
            for &to in &adjacency[i] {
                in_degree[to] -= 1;
                if in_degree[to] == 0 {
                    queue.push_back(to);
                }
            }
        }

        let remaining: Vec<String> = (0..n)
            .filter(|&i| !removed[i])
            .map(|i| self.steps[i].id.clone())
            .collect();
        Ok(if remaining.is_empty() {
            None
        } else {
            Some(remaining)
        })
    }
}
