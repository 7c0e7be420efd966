//! Capability model: resources, offers, connectivity and costs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::requirement::Material;
use super::value::{local_name, units_compatible, OfferValue, ValueConstraint};
use crate::error::{MatchError, Result};

/// A parameter value a capability can provide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterOffer {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub value: OfferValue,
}

impl ParameterOffer {
    pub fn new(key: impl Into<String>, value: OfferValue) -> Self {
        Self {
            key: key.into(),
            name: None,
            unit: None,
            value,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A condition on the materials a step feeds into a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precondition {
    /// Material key the condition applies to.
    pub key: String,
    #[serde(default)]
    pub unit: Option<String>,
    /// Condition on the material quantity.
    pub constraint: ValueConstraint,
}

impl Precondition {
    pub fn new(key: impl Into<String>, constraint: ValueConstraint) -> Self {
        Self {
            key: key.into(),
            unit: None,
            constraint,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Returns true if some input material satisfies this condition.
    pub fn is_met_by(&self, inputs: &[Material]) -> bool {
        inputs.iter().any(|m| {
            m.key == self.key
                && units_compatible(self.unit.as_deref(), m.unit.as_deref())
                && self
                    .constraint
                    .is_satisfied_by(&OfferValue::fixed(m.quantity))
        })
    }
}

/// One capability a resource offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Short name, e.g. `Mixing`.
    pub name: String,
    /// Semantic id of the capability.
    #[serde(default)]
    pub semantic_id: String,
    /// Semantic ids of more general capabilities this one also satisfies.
    #[serde(default)]
    pub generalized_by: Vec<String>,
    #[serde(default)]
    pub offers: Vec<ParameterOffer>,
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
}

impl Capability {
    /// Creates a capability whose semantic id equals its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            semantic_id: name.clone(),
            name,
            generalized_by: Vec::new(),
            offers: Vec::new(),
            preconditions: Vec::new(),
        }
    }

    pub fn with_semantic_id(mut self, semantic_id: impl Into<String>) -> Self {
        self.semantic_id = semantic_id.into();
        self
    }

    pub fn with_generalization(mut self, semantic_id: impl Into<String>) -> Self {
        self.generalized_by.push(semantic_id.into());
        self
    }

    pub fn with_offer(mut self, offer: ParameterOffer) -> Self {
        self.offers.push(offer);
        self
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    /// Returns true if this capability provides the tag `required`.
    ///
    /// Tags are compared by local name against the semantic id, the name
    /// and every generalization.
    pub fn provides(&self, required: &str) -> bool {
        let wanted = local_name(required);
        if wanted.is_empty() {
            return false;
        }
        local_name(&self.semantic_id) == wanted
            || local_name(&self.name) == wanted
            || self.generalized_by.iter().any(|g| local_name(g) == wanted)
    }
}

/// Direction of a connectivity descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// This resource can feed material into the peer.
    Feeds,
    /// This resource can receive material from the peer.
    Receives,
}

/// A physical link between two resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub direction: Direction,
    pub peer: String,
    #[serde(default)]
    pub port: Option<String>,
}

impl Connection {
    pub fn feeds(peer: impl Into<String>) -> Self {
        Self {
            direction: Direction::Feeds,
            peer: peer.into(),
            port: None,
        }
    }

    pub fn receives(peer: impl Into<String>) -> Self {
        Self {
            direction: Direction::Receives,
            peer: peer.into(),
            port: None,
        }
    }

    pub fn via_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }
}

/// Cost attributes used for ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceCosts {
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub usage: f64,
    #[serde(default)]
    pub co2: f64,
}

impl ResourceCosts {
    pub fn new(energy: f64, usage: f64, co2: f64) -> Self {
        Self { energy, usage, co2 }
    }
}

/// How many steps a resource may serve in one assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    #[default]
    Unlimited,
    Limited(u32),
}

impl Capacity {
    /// Returns the step limit, or `None` when unlimited.
    pub fn limit(self) -> Option<u32> {
        match self {
            Capacity::Unlimited => None,
            Capacity::Limited(n) => Some(n),
        }
    }
}

/// One physical or virtual unit.
///
/// # Example
///
/// ```
/// use recipeforge_core::{Capability, Connection, Resource, ResourceCosts};
///
/// let mixer = Resource::new("R1")
///     .with_capability(Capability::new("Mix"))
///     .with_connection(Connection::feeds("R2"))
///     .with_costs(ResourceCosts::new(2.0, 1.5, 0.3));
///
/// assert!(mixer.provides("Mix"));
/// assert!(!mixer.provides("Heat"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub costs: ResourceCosts,
    #[serde(default)]
    pub capacity: Capacity,
}

impl Resource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: Vec::new(),
            connections: Vec::new(),
            costs: ResourceCosts::default(),
            capacity: Capacity::Unlimited,
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    pub fn with_costs(mut self, costs: ResourceCosts) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Returns true if any capability provides `tag`.
    pub fn provides(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c.provides(tag))
    }

    /// Returns true if this resource declares that it feeds `other`,
    /// or `other` declares that it receives from this resource.
    pub fn can_feed(&self, other: &Resource) -> bool {
        self.connections
            .iter()
            .any(|c| c.direction == Direction::Feeds && c.peer == other.id)
            || other
                .connections
                .iter()
                .any(|c| c.direction == Direction::Receives && c.peer == self.id)
    }
}

/// The plant side of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityModel {
    pub resources: Vec<Resource>,
}

impl CapabilityModel {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Validates ids, offer ranges, preconditions and costs.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedConstraint`] on the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.id.as_str()) {
                return Err(MatchError::malformed(format!(
                    "duplicate resource id {}",
                    resource.id
                )));
            }

            let costs = resource.costs;
            for (label, value) in [
                ("energy", costs.energy),
                ("usage", costs.usage),
                ("co2", costs.co2),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(MatchError::malformed(format!(
                        "resource {}: {label} cost {value} must be a non-negative number",
                        resource.id
                    )));
                }
            }

            if resource.capacity == Capacity::Limited(0) {
                return Err(MatchError::malformed(format!(
                    "resource {}: capacity must be at least 1",
                    resource.id
                )));
            }

            for capability in &resource.capabilities {
                for offer in &capability.offers {
                    offer.value.validate(&format!(
                        "resource {} capability {} offer {}",
                        resource.id, capability.name, offer.key
                    ))?;
                }
                for pre in &capability.preconditions {
                    pre.constraint.validate(&format!(
                        "resource {} capability {} precondition {}",
                        resource.id, capability.name, pre.key
                    ))?;
                }
            }
        }
        Ok(())
    }
}
