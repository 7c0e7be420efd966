//! RecipeForge Core - Domain model for recipe-to-resource matching
//!
//! This crate provides the fundamental data types for RecipeForge:
//! - Requirement model: recipe steps, parameter requirements, topology
//! - Capability model: resources, parameter offers, connectivity, costs
//! - Value semantics shared by requirements and offers
//! - Result model: assignments, scored assignments, solution sets
//! - Error types

pub mod domain;
pub mod error;
pub mod solution;

pub use domain::{
    local_name, units_compatible, Capability, CapabilityModel, Capacity, Comparison, Connection,
    Direction, Material, OfferValue, ParameterOffer, ParameterRequirement, ParseValueError,
    Precondition, RequirementModel, Resource, ResourceCosts, Step, ValueConstraint,
};
pub use error::{MatchError, Result};
pub use solution::{
    Assignment, AssignmentEntry, CapabilityMatch, CostTotals, InfeasibleReason, MatchMode,
    MatchOutcome, MatchedParameter, ScoredAssignment, Solution, SolutionSet,
};
