//! Grid fixtures: a chain of steps with interchangeable resources.
//!
//! Step `S{i}` requires capability `Op{i}`. Column `i` holds `width`
//! resources `R{i}_{j}` providing `Op{i}`. When connected, every resource of
//! column `i` feeds every resource of column `i + 1`, so the problem has
//! exactly `width^steps` assignments.
//!
//! # Example
//!
//! ```
//! use recipeforge_test::grid::Grid;
//!
//! let grid = Grid::new(2, 2);
//! assert_eq!(grid.expected_count(), 4);
//! assert_eq!(grid.capabilities().resource_count(), 4);
//! ```

use recipeforge_core::{CapabilityModel, Connection, RequirementModel};

use crate::builders::{chain, costed_resource};

/// Builder for grid-shaped matching problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub steps: usize,
    pub width: usize,
    pub connected: bool,
}

impl Grid {
    /// Creates a fully connected grid.
    pub fn new(steps: usize, width: usize) -> Self {
        Self {
            steps,
            width,
            connected: true,
        }
    }

    /// Removes all connections between columns.
    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Returns the resource id at column `step`, row `row`.
    pub fn resource_id(step: usize, row: usize) -> String {
        format!("R{}_{}", step + 1, row + 1)
    }

    /// Returns the chain of steps.
    pub fn requirements(&self) -> RequirementModel {
        let caps: Vec<String> = (0..self.steps).map(|i| format!("Op{}", i + 1)).collect();
        let refs: Vec<&str> = caps.iter().map(String::as_str).collect();
        chain(&refs)
    }

    /// Returns the resources, column by column.
    ///
    /// Row `j` costs `j + 1` energy and `width - j` usage, so no resource
    /// dominates another on both.
    pub fn capabilities(&self) -> CapabilityModel {
        let mut resources = Vec::with_capacity(self.steps * self.width);
        for i in 0..self.steps {
            for j in 0..self.width {
                let mut resource = costed_resource(
                    &Self::resource_id(i, j),
                    &format!("Op{}", i + 1),
                    (j + 1) as f64,
                    (self.width - j) as f64,
                    0.5 * (i + 1) as f64,
                );
                if self.connected && i + 1 < self.steps {
                    for k in 0..self.width {
                        resource = resource
                            .with_connection(Connection::feeds(Self::resource_id(i + 1, k)));
                    }
                }
                resources.push(resource);
            }
        }
        CapabilityModel::new(resources)
    }

    /// Number of assignments of the connected grid.
    pub fn expected_count(&self) -> usize {
        if self.connected || self.steps <= 1 {
            self.width.pow(self.steps as u32)
        } else {
            0
        }
    }
}
