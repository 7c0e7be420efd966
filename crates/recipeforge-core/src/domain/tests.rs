//! Tests for the domain model.

use super::*;
use crate::error::MatchError;

fn offer_range(min: Option<f64>, max: Option<f64>) -> OfferValue {
    OfferValue::Range { min, max }
}

#[test]
fn test_local_name() {
    assert_eq!(local_name("http://a.org/x#Dosing"), "Dosing");
    assert_eq!(local_name("urn/a/b/Heating"), "Heating");
    assert_eq!(local_name("Mixing"), "Mixing");
    assert_eq!(local_name("  "), "");
}

#[test]
fn test_units_compatible() {
    assert!(units_compatible(None, Some("degC")));
    assert!(units_compatible(Some("https://qudt.org/vocab/unit/SEC"), Some("SEC")));
    assert!(!units_compatible(Some("SEC"), Some("MIN")));
    assert!(units_compatible(Some(""), Some("MIN")));
}

#[test]
fn test_parse_value_constraint() {
    assert_eq!(
        "300".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::exact(300.0)
    );
    assert_eq!(
        "<= 1,5".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::compare(Comparison::Le, 1.5)
    );
    assert_eq!(
        ">10".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::compare(Comparison::Gt, 10.0)
    );
    assert_eq!(
        "5..7,5".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::range(5.0, 7.5)
    );
    assert_eq!(
        "stainless".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::categorical("stainless")
    );
    assert_eq!(
        "".parse::<ValueConstraint>(),
        Err(ParseValueError::Empty)
    );
    assert!(matches!(
        ">= abc".parse::<ValueConstraint>(),
        Err(ParseValueError::InvalidNumber(_))
    ));
}

#[test]
fn test_parse_bracket_range() {
    assert_eq!(
        "[20, 80]".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::range(20.0, 80.0)
    );
    assert_eq!(
        "[20,80]".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::range(20.0, 80.0)
    );
    assert_eq!(
        "[2,5; 7,5]".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::range(2.5, 7.5)
    );
    assert_eq!(
        "[2,5, 7,5]".parse::<ValueConstraint>().unwrap(),
        ValueConstraint::range(2.5, 7.5)
    );
    assert!(matches!(
        "[2,5,7,5]".parse::<ValueConstraint>(),
        Err(ParseValueError::InvalidRange(_))
    ));
    assert!(matches!(
        "[20, hot]".parse::<ValueConstraint>(),
        Err(ParseValueError::InvalidNumber(_))
    ));
}

#[test]
fn test_bracket_range_matches_range_offer() {
    let required: ValueConstraint = "[20, 80]".parse().unwrap();
    assert!(required.is_satisfied_by(&offer_range(Some(0.0), Some(100.0))));
    assert!(!required.is_satisfied_by(&offer_range(Some(30.0), Some(100.0))));
}

#[test]
fn test_inverted_bracket_range_rejected() {
    let inverted: ValueConstraint = "[80, 20]".parse().unwrap();
    assert_eq!(inverted, ValueConstraint::range(80.0, 20.0));
    assert!(matches!(
        inverted.validate("temperature"),
        Err(MatchError::MalformedConstraint(_))
    ));
}

#[test]
fn test_compare_against_range_offer() {
    let offer = offer_range(Some(10.0), Some(20.0));

    assert!(ValueConstraint::exact(15.0).is_satisfied_by(&offer));
    assert!(ValueConstraint::exact(10.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::exact(25.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::exact(5.0).is_satisfied_by(&offer));

    assert!(ValueConstraint::compare(Comparison::Ge, 12.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::compare(Comparison::Ge, 8.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::compare(Comparison::Gt, 10.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::compare(Comparison::Lt, 20.0).is_satisfied_by(&offer));
    assert!(ValueConstraint::compare(Comparison::Lt, 19.0).is_satisfied_by(&offer));
}

#[test]
fn test_compare_against_open_range_offer() {
    let offer = offer_range(None, Some(100.0));
    assert!(ValueConstraint::exact(-40.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::exact(101.0).is_satisfied_by(&offer));
}

#[test]
fn test_range_containment() {
    let offer = offer_range(Some(0.0), Some(100.0));
    assert!(ValueConstraint::range(20.0, 80.0).is_satisfied_by(&offer));
    assert!(ValueConstraint::range(0.0, 100.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::range(50.0, 120.0).is_satisfied_by(&offer));
}

#[test]
fn test_discrete_offer() {
    let offer = OfferValue::Discrete(vec![100.0, 200.0, 300.0]);
    assert!(ValueConstraint::exact(200.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::exact(250.0).is_satisfied_by(&offer));
    assert!(ValueConstraint::compare(Comparison::Ge, 250.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::compare(Comparison::Gt, 300.0).is_satisfied_by(&offer));
    assert!(ValueConstraint::range(150.0, 210.0).is_satisfied_by(&offer));
    assert!(!ValueConstraint::range(210.0, 290.0).is_satisfied_by(&offer));
}

#[test]
fn test_categorical_and_unspecified() {
    let labels = OfferValue::Categorical(vec!["glass".into(), "steel".into()]);
    assert!(ValueConstraint::categorical("steel").is_satisfied_by(&labels));
    assert!(!ValueConstraint::categorical("copper").is_satisfied_by(&labels));
    assert!(!ValueConstraint::exact(1.0).is_satisfied_by(&labels));
    assert!(ValueConstraint::exact(1.0).is_satisfied_by(&OfferValue::Unspecified));
}

#[test]
fn test_inverted_ranges_are_malformed() {
    let err = ValueConstraint::range(10.0, 5.0).validate("p").unwrap_err();
    assert!(matches!(err, MatchError::MalformedConstraint(_)));

    let err = OfferValue::range(3.0, 1.0).validate("o").unwrap_err();
    assert!(matches!(err, MatchError::MalformedConstraint(_)));

    assert!(OfferValue::range(1.0, 3.0).validate("o").is_ok());
}

#[test]
fn test_precondition_on_inputs() {
    let pre = Precondition::new("Water", ValueConstraint::compare(Comparison::Ge, 2.0))
        .with_unit("LTR");
    let enough = [Material::new("M1", "Water", 2.5).with_unit("LTR")];
    let too_little = [Material::new("M1", "Water", 1.0).with_unit("LTR")];
    let wrong_unit = [Material::new("M1", "Water", 5.0).with_unit("KG")];

    assert!(pre.is_met_by(&enough));
    assert!(!pre.is_met_by(&too_little));
    assert!(!pre.is_met_by(&wrong_unit));
    assert!(!pre.is_met_by(&[]));
}

#[test]
fn test_capability_provides_by_local_name() {
    let cap = Capability::new("Heating")
        .with_semantic_id("http://plant.org/caps#Tempering")
        .with_generalization("http://plant.org/caps/ThermalTreatment");

    assert!(cap.provides("Heating"));
    assert!(cap.provides("urn:x#Tempering"));
    assert!(cap.provides("ThermalTreatment"));
    assert!(!cap.provides("Mixing"));
    assert!(!cap.provides(""));
}

#[test]
fn test_can_feed_either_side_declares() {
    let r1 = Resource::new("R1").with_connection(Connection::feeds("R2"));
    let r2 = Resource::new("R2");
    let r3 = Resource::new("R3").with_connection(Connection::receives("R2"));

    assert!(r1.can_feed(&r2));
    assert!(!r2.can_feed(&r1));
    assert!(r2.can_feed(&r3));
    assert!(!r3.can_feed(&r2));
}

#[test]
fn test_requirement_edges_and_validation() {
    let model = RequirementModel::new(vec![
        Step::new("A", "Mix").with_successor("B"),
        Step::new("B", "Heat"),
    ]);
    assert_eq!(model.edges().unwrap(), vec![(0, 1)]);
    assert!(model.validate().is_ok());

    let dangling = RequirementModel::new(vec![Step::new("A", "Mix").with_successor("Z")]);
    assert!(matches!(
        dangling.validate(),
        Err(MatchError::MalformedConstraint(_))
    ));

    let duplicate = RequirementModel::new(vec![Step::new("A", "Mix"), Step::new("A", "Heat")]);
    assert!(duplicate.validate().is_err());
}

#[test]
fn test_cyclic_steps() {
    let acyclic = RequirementModel::new(vec![
        Step::new("A", "Mix").with_successor("B").with_successor("C"),
        Step::new("B", "Heat").with_successor("C"),
        Step::new("C", "Cool"),
    ]);
    assert_eq!(acyclic.cyclic_steps().unwrap(), None);

    let cyclic = RequirementModel::new(vec![
        Step::new("A", "Mix").with_successor("B"),
        Step::new("B", "Heat").with_successor("A"),
        Step::new("C", "Cool"),
    ]);
    assert_eq!(
        cyclic.cyclic_steps().unwrap(),
        Some(vec!["A".to_string(), "B".to_string()])
    );
}

#[test]
fn test_capability_model_validation() {
    let negative = CapabilityModel::new(vec![
        Resource::new("R1").with_costs(ResourceCosts::new(-1.0, 0.0, 0.0))
    ]);
    assert!(negative.validate().is_err());

    let zero_capacity =
        CapabilityModel::new(vec![Resource::new("R1").with_capacity(Capacity::Limited(0))]);
    assert!(zero_capacity.validate().is_err());

    let inverted = CapabilityModel::new(vec![Resource::new("R1").with_capability(
        Capability::new("Heat")
            .with_offer(ParameterOffer::new("temp", OfferValue::range(90.0, 20.0))),
    )]);
    assert!(matches!(
        inverted.validate(),
        Err(MatchError::MalformedConstraint(_))
    ));

    let ok = CapabilityModel::new(vec![Resource::new("R1"), Resource::new("R2")]);
    assert!(ok.validate().is_ok());
}

#[test]
fn test_model_deserializes_from_json() {
    let json = r#"{
        "resources": [{
            "id": "R1",
            "capabilities": [{
                "name": "Mix",
                "offers": [{ "key": "rpm", "value": { "kind": "range", "values": { "min": 0.0, "max": 500.0 } } }]
            }],
            "connections": [{ "direction": "feeds", "peer": "R2" }],
            "costs": { "energy": 1.0 },
            "capacity": { "limited": 1 }
        }]
    }"#;
    let model: CapabilityModel = serde_json::from_str(json).unwrap();
    let r1 = &model.resources[0];
    assert_eq!(r1.capacity, Capacity::Limited(1));
    assert_eq!(r1.costs.energy, 1.0);
    assert_eq!(r1.costs.co2, 0.0);
    assert_eq!(r1.capabilities[0].offers[0].value, OfferValue::range(0.0, 500.0));
}
