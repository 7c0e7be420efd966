//! Domain model for recipe matching
//!
//! These types describe the two inputs of a matching run:
//! - `RequirementModel`: the recipe steps, their parameter requirements and topology
//! - `CapabilityModel`: the resources, their offers, connectivity and costs
//!
//! Both are plain data. They are produced by external document parsers and
//! are immutable for the duration of a run.

mod capability;
mod requirement;
mod value;

#[cfg(test)]
mod tests;

pub use capability::{
    Capability, CapabilityModel, Capacity, Connection, Direction, ParameterOffer, Precondition,
    Resource, ResourceCosts,
};
pub use requirement::{Material, ParameterRequirement, RequirementModel, Step};
pub use value::{
    local_name, units_compatible, Comparison, OfferValue, ParseValueError, ValueConstraint,
};
