//! The Mix → Heat fixture.
//!
//! Step `A` mixes at 300 rpm and feeds step `B`, which heats to 90 °C.
//! Resource `R1` mixes and feeds `R2`, which heats. Exactly one assignment
//! exists: `{A: R1, B: R2}`.
//!
//! # Example
//!
//! ```
//! use recipeforge_test::mix_heat::{mix_heat_capabilities, mix_heat_requirements};
//!
//! let recipe = mix_heat_requirements();
//! let plant = mix_heat_capabilities();
//! assert_eq!(recipe.step_count(), 2);
//! assert_eq!(plant.resource_count(), 2);
//! ```

use recipeforge_core::{
    Capability, CapabilityModel, Connection, OfferValue, ParameterOffer, ParameterRequirement,
    RequirementModel, Resource, ResourceCosts, Step, ValueConstraint,
};

pub const MIX: &str = "http://example.org/capabilities#Mixing";
pub const HEAT: &str = "http://example.org/capabilities#Heating";

/// The two-step recipe.
pub fn mix_heat_requirements() -> RequirementModel {
    RequirementModel::new(vec![
        Step::new("A", MIX)
            .with_description("Mix the batch")
            .with_parameter(
                ParameterRequirement::new("rpm", ValueConstraint::exact(300.0)).with_unit("RPM"),
            )
            .with_successor("B"),
        Step::new("B", HEAT)
            .with_description("Heat the batch")
            .with_parameter(
                ParameterRequirement::new("temperature", ValueConstraint::exact(90.0))
                    .with_unit("DEG_C"),
            ),
    ])
}

fn mixer() -> Resource {
    Resource::new("R1")
        .with_capability(Capability::new("Mixing").with_offer(
            ParameterOffer::new("rpm", OfferValue::range(0.0, 500.0)).with_unit("RPM"),
        ))
        .with_connection(Connection::feeds("R2"))
        .with_costs(ResourceCosts::new(2.0, 1.5, 0.3))
}

fn heater(id: &str, max_temperature: f64) -> Resource {
    Resource::new(id)
        .with_capability(Capability::new("Heating").with_offer(
            ParameterOffer::new("temperature", OfferValue::range(20.0, max_temperature))
                .with_unit("DEG_C"),
        ))
        .with_costs(ResourceCosts::new(5.0, 1.0, 1.2))
}

/// The matching plant: `R1` (Mixing) feeds `R2` (Heating).
pub fn mix_heat_capabilities() -> CapabilityModel {
    CapabilityModel::new(vec![mixer(), heater("R2", 120.0)])
}

/// The plant extended with two heaters that must not be chosen.
///
/// `R3` heats but is not connected to `R1`. `R4` is connected but cannot
/// reach 90 °C.
pub fn mix_heat_with_decoys() -> CapabilityModel {
    let mixer = mixer().with_connection(Connection::feeds("R4"));
    CapabilityModel::new(vec![
        mixer,
        heater("R2", 120.0),
        heater("R3", 200.0),
        heater("R4", 60.0),
    ])
}
