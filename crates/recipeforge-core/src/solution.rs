//! Result model handed to export and presentation collaborators.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Solving mode of a matching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// First satisfying assignment only.
    Fast,
    /// Every satisfying assignment, in discovery order.
    #[default]
    Pro,
    /// Every satisfying assignment, ranked by weighted cost.
    Ultra,
}

impl MatchMode {
    /// Returns true if the mode enumerates all assignments.
    pub fn enumerates_all(self) -> bool {
        !matches!(self, MatchMode::Fast)
    }

    /// Returns true if the mode scores and ranks assignments.
    pub fn is_ranked(self) -> bool {
        matches!(self, MatchMode::Ultra)
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Fast => write!(f, "Fast"),
            MatchMode::Pro => write!(f, "Pro"),
            MatchMode::Ultra => write!(f, "Ultra"),
        }
    }
}

/// A requirement paired with the offer that fulfilled it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedParameter {
    pub key: String,
    pub required: String,
    pub offered: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A capability of the assigned resource that fulfils the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityMatch {
    pub capability: String,
    pub parameters: Vec<MatchedParameter>,
}

/// One step bound to one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub step_id: String,
    pub step_description: String,
    pub resource_id: String,
    pub capabilities: Vec<CapabilityMatch>,
}

/// A total step→resource mapping satisfying every constraint.
///
/// Entries follow the step order of the requirement model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// 1-based discovery index within the run.
    pub solution_id: usize,
    pub entries: Vec<AssignmentEntry>,
}

impl Assignment {
    pub fn new(solution_id: usize, entries: Vec<AssignmentEntry>) -> Self {
        Self {
            solution_id,
            entries,
        }
    }

    /// Returns the resource assigned to `step_id`.
    pub fn resource_for(&self, step_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.step_id == step_id)
            .map(|e| e.resource_id.as_str())
    }

    /// Returns the mapping as step id → resource id.
    pub fn as_map(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|e| (e.step_id.as_str(), e.resource_id.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssignmentEntry> {
        self.entries.iter()
    }
}

/// Energy / usage / CO2 triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTotals {
    pub energy: f64,
    pub usage: f64,
    pub co2: f64,
}

impl CostTotals {
    pub fn new(energy: f64, usage: f64, co2: f64) -> Self {
        Self { energy, usage, co2 }
    }

    /// Sum of the three components.
    pub fn sum(&self) -> f64 {
        self.energy + self.usage + self.co2
    }
}

/// An assignment with its ranking score (Ultra mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAssignment {
    pub assignment: Assignment,
    /// Weighted sum of normalized totals; lower is better.
    pub score: f64,
    /// Raw totals over all assigned resources.
    pub totals: CostTotals,
    /// Normalized totals multiplied by their weights.
    pub weighted: CostTotals,
    /// Number of steps served by each resource.
    pub resource_usage: BTreeMap<String, usize>,
}

/// One member of a [`SolutionSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Solution {
    Scored(ScoredAssignment),
    Unscored(Assignment),
}

impl Solution {
    pub fn assignment(&self) -> &Assignment {
        match self {
            Solution::Scored(s) => &s.assignment,
            Solution::Unscored(a) => a,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Solution::Scored(s) => Some(s.score),
            Solution::Unscored(_) => None,
        }
    }

    pub fn as_scored(&self) -> Option<&ScoredAssignment> {
        match self {
            Solution::Scored(s) => Some(s),
            Solution::Unscored(_) => None,
        }
    }
}

/// Ordered result of a completed run.
///
/// Discovery order for Fast and Pro, ascending score for Ultra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSet {
    pub mode: MatchMode,
    pub solutions: Vec<Solution>,
    /// True if enumeration stopped at the configured attempt limit.
    #[serde(default)]
    pub truncated: bool,
}

impl SolutionSet {
    /// Creates a set of unscored assignments in discovery order.
    pub fn unscored(mode: MatchMode, assignments: Vec<Assignment>) -> Self {
        Self {
            mode,
            solutions: assignments.into_iter().map(Solution::Unscored).collect(),
            truncated: false,
        }
    }

    /// Creates a ranked set; `ranked` must already be sorted.
    pub fn ranked(ranked: Vec<ScoredAssignment>) -> Self {
        Self {
            mode: MatchMode::Ultra,
            solutions: ranked.into_iter().map(Solution::Scored).collect(),
            truncated: false,
        }
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Returns the first solution: the best one in Ultra mode.
    pub fn best(&self) -> Option<&Solution> {
        self.solutions.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.solutions.iter().map(Solution::assignment)
    }
}

/// Why a run has no assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// These steps have no candidate resource at all.
    NoCandidates { steps: Vec<String> },
    /// These steps lie on a topology cycle.
    TopologyCycle { steps: Vec<String> },
    /// The constraint system has no model.
    Unsatisfiable,
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibleReason::NoCandidates { steps } => {
                write!(f, "no candidate resource for step(s) {}", steps.join(", "))
            }
            InfeasibleReason::TopologyCycle { steps } => {
                write!(f, "topology cycle through step(s) {}", steps.join(", "))
            }
            InfeasibleReason::Unsatisfiable => write!(f, "no assignment satisfies all constraints"),
        }
    }
}

/// Terminal outcome of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum MatchOutcome {
    Solved(SolutionSet),
    Infeasible(InfeasibleReason),
    Cancelled,
}

impl MatchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, MatchOutcome::Solved(_))
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, MatchOutcome::Infeasible(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MatchOutcome::Cancelled)
    }

    /// Returns the solution set of a solved run.
    pub fn solutions(&self) -> Option<&SolutionSet> {
        match self {
            MatchOutcome::Solved(set) => Some(set),
            _ => None,
        }
    }

    /// Consumes the outcome, returning the solution set of a solved run.
    pub fn into_solutions(self) -> Option<SolutionSet> {
        match self {
            MatchOutcome::Solved(set) => Some(set),
            _ => None,
        }
    }
}
