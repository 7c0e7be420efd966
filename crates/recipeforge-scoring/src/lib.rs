//! Scoring and ranking for RecipeForge.
//!
//! Ultra mode ranks every assignment it finds by a weighted sum of its
//! min-max normalized energy, usage cost and CO2 totals:
//! - [`ScoreWeights`]: non-negative weights re-normalized to sum 1
//! - [`CostAnalysis`]: raw totals and per-resource usage of one assignment
//! - [`Ranker`]: normalization, weighting and stable ascending sort
//!
//! # Example
//!
//! ```
//! use recipeforge_scoring::{Ranker, ScoreWeights};
//! use recipeforge_test::{assignment, costed_resource};
//! use recipeforge_core::CapabilityModel;
//!
//! let plant = CapabilityModel::new(vec![
//!     costed_resource("cheap", "Op", 1.0, 1.0, 1.0),
//!     costed_resource("dear", "Op", 9.0, 9.0, 9.0),
//! ]);
//! let found = vec![
//!     assignment(1, &[("S1", "dear")]),
//!     assignment(2, &[("S1", "cheap")]),
//! ];
//!
//! let ranked = Ranker::new(ScoreWeights::new(1.0, 1.0, 1.0).unwrap())
//!     .rank(found, &plant)
//!     .unwrap();
//! assert_eq!(ranked[0].assignment.resource_for("S1"), Some("cheap"));
//! assert_eq!(ranked[0].score, 0.0);
//! assert!((ranked[1].score - 1.0).abs() < 1e-12);
//! ```

pub mod analysis;
pub mod ranker;
pub mod weights;


pub use analysis::CostAnalysis;
pub use ranker::Ranker;
pub use weights::{CostCriterion, ScoreWeights};
