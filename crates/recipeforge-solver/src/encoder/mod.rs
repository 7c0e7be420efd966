//! Constraint encoding.
//!
//! Turns a requirement model and a capability model into a boolean
//! constraint system over `assign(step, resource)` variables:
//! - exactly one candidate per step (coverage)
//! - parameter compatibility, enforced by only creating candidate variables
//! - a binary clause for every topology edge whose resource pair cannot
//!   transfer material
//! - at-most-k over the variables of each capacity-limited resource

mod candidate;
mod system;
mod topology;

pub use candidate::{match_capability, match_resource, CandidateLink, CandidateTable};
pub use system::{ConstraintSystem, EncodeOptions, SystemSize};
pub use topology::{cycle_reason, transfer_allowed};
