//! Shared test fixtures for RecipeForge crates.
//!
//! This crate provides plain requirement and capability models for testing.
//! It depends only on `recipeforge-core` so every other crate can use it as a
//! dev-dependency.
//!
//! - [`mix_heat`] - The two-step Mix → Heat recipe with a matching plant
//! - [`grid`] - Chains of steps with several interchangeable resources each
//! - [`builders`] - Small constructors for assignments and resources
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! recipeforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use recipeforge_test::mix_heat::{mix_heat_capabilities, mix_heat_requirements};
//! use recipeforge_test::grid::Grid;
//! ```

pub mod builders;
pub mod grid;
pub mod mix_heat;

pub use builders::{assignment, costed_resource};
pub use grid::Grid;
pub use mix_heat::{mix_heat_capabilities, mix_heat_requirements};
