//! Error types for RecipeForge

use thiserror::Error;

/// Main error type for matching runs.
///
/// Infeasibility and cancellation are normal terminal outcomes and are
/// reported through [`MatchOutcome`](crate::MatchOutcome), not as errors.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Input data violates a structural rule (inverted range, duplicate id,
    /// dangling topology edge). Detected before the solving engine runs.
    #[error("Malformed constraint: {0}")]
    MalformedConstraint(String),

    /// The solving engine itself failed or timed out.
    #[error("Solver fault: {reason} ({variables} variables, {clauses} clauses)")]
    SolverFault {
        reason: String,
        variables: usize,
        clauses: usize,
    },

    /// Invalid run configuration (e.g. negative weights)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MatchError {
    /// Shorthand for a [`MatchError::MalformedConstraint`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        MatchError::MalformedConstraint(msg.into())
    }

    /// Returns true for errors raised from input data rather than the engine.
    pub fn is_data_error(&self) -> bool {
        matches!(self, MatchError::MalformedConstraint(_) | MatchError::Config(_))
    }
}

/// Result type alias for RecipeForge operations
pub type Result<T> = std::result::Result<T, MatchError>;
