//! RecipeForge Solver Engine
//!
//! This crate turns a requirement model and a capability model into
//! assignments of recipe steps to plant resources:
//! - Candidate filtering and constraint encoding ([`encoder`])
//! - A deterministic incremental SAT backend ([`sat`])
//! - Blocking-clause model enumeration ([`enumeration`])
//! - The run driver with Fast, Pro and Ultra modes ([`MatchDriver`])
//! - Event system for monitoring, background runs and cancellation

pub mod driver;
pub mod encoder;
pub mod enumeration;
pub mod event;
pub mod manager;
pub mod realtime;
pub mod sat;
pub mod stats;

#[cfg(test)]
mod manager_tests;

pub use driver::MatchDriver;
pub use encoder::{
    cycle_reason, match_capability, match_resource, transfer_allowed, CandidateLink,
    CandidateTable, ConstraintSystem, EncodeOptions, SystemSize,
};
pub use enumeration::{blocking_clause, enumerate_models, Enumeration, EnumerationEnd};
pub use event::{
    CountingEventListener, LoggingEventListener, MatchEventListener, MatchEventSupport,
    MatchStatus,
};
pub use manager::{MatchJob, MatchManager};
pub use realtime::{ChannelEventListener, MatchEvent, MatchHandle};
pub use sat::{
    BackendError, BackendStats, DpllBackend, Lit, Model, SatBackend, SatOutcome, StopReason,
    StopSignal, Var,
};
pub use stats::MatchStats;
