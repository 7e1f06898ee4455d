mod common;

use atelier_store::{EdgeDirection, Frame, NeighbourhoodSelector};
use atelier_test_utils::stock_flow_constraints;
use atelier_types::ObjectId;
use atelier_verification::{Constraint, ConstraintVerifier, ConstraintViolation, Predicate, Requirement, Verifier};

use common::{edge, frame, node};

#[test]
fn well_shaped_edges_pass() {
    let frame = frame(vec![
        node("Stock", 1, 10),
        node("Flow", 2, 11),
        edge("Drains", 3, 12, 10, 11),
    ]);
    let constraints = stock_flow_constraints();
    assert!(ConstraintVerifier::new(&frame, &constraints).verify().is_ok());
}

#[test]
fn reversed_edge_is_collected() {
    // Drains from a Flow into a Stock: endpoints swapped.
    let frame = frame(vec![
        node("Stock", 1, 10),
        node("Flow", 2, 11),
        edge("Drains", 3, 12, 11, 10),
    ]);
    let constraints = stock_flow_constraints();
    let error = ConstraintVerifier::new(&frame, &constraints)
        .verify()
        .unwrap_err();
    assert_eq!(
        error.downcast_ref::<ConstraintViolation>(),
        Some(&ConstraintViolation {
            violations: vec![("drains_endpoints".to_string(), vec![ObjectId::new(12)])],
        })
    );
}

#[test]
fn violations_are_collected_per_constraint() {
    let frame = frame(vec![
        node("Stock", 1, 10),
        node("Flow", 2, 11),
        edge("Drains", 3, 12, 11, 10),
        edge("Fills", 4, 13, 10, 11),
    ]);
    let constraints = stock_flow_constraints();
    let violations = ConstraintVerifier::new(&frame, &constraints).violations();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].0, "drains_endpoints");
    assert_eq!(violations[1].0, "fills_endpoints");
}

#[test]
fn predicates_compose() {
    let frame = frame(vec![node("Stock", 1, 10), node("Flow", 2, 11)]);
    let stock = frame.object(ObjectId::new(10)).unwrap();

    assert!(Predicate::is_type("Stock").evaluate(&frame, stock));
    assert!(Predicate::Not(Box::new(Predicate::is_type("Flow"))).evaluate(&frame, stock));
    assert!(Predicate::All(vec![
        Predicate::is_type("Stock"),
        Predicate::HasAttribute("formula".to_string()),
    ])
    .evaluate(&frame, stock));
    assert!(Predicate::Any(vec![
        Predicate::RejectAll,
        Predicate::is_type("Stock"),
    ])
    .evaluate(&frame, stock));
    // `formula` has a default; `position` does not.
    assert!(!Predicate::HasAttribute("position".to_string()).evaluate(&frame, stock));
}

#[test]
fn unique_neighbour_counts_selected_edges() {
    let population = vec![
        node("Stock", 1, 10),
        node("Flow", 2, 11),
        node("Flow", 3, 13),
        edge("Drains", 4, 12, 10, 11),
        edge("Drains", 5, 14, 10, 13),
    ];
    let frame = frame(population);

    let constraint = Constraint::new(
        "single_drain",
        Predicate::is_type("Stock"),
        Requirement::UniqueNeighbour {
            selector: NeighbourhoodSelector::new("Drains", EdgeDirection::Outgoing),
            required: false,
        },
    );
    // Two outgoing drains violate uniqueness.
    assert_eq!(constraint.check(&frame), vec![ObjectId::new(10)]);

    let required = Constraint::new(
        "flow_is_drained",
        Predicate::is_type("Flow"),
        Requirement::UniqueNeighbour {
            selector: NeighbourhoodSelector::new("Drains", EdgeDirection::Incoming),
            required: true,
        },
    );
    // Each flow has exactly one incoming drain.
    assert!(required.check(&frame).is_empty());
}

#[test]
fn reject_all_flags_every_match() {
    let frame = frame(vec![node("Stock", 1, 10), node("Stock", 2, 11)]);
    let constraint = Constraint::new(
        "no_stocks",
        Predicate::is_type("Stock"),
        Requirement::RejectAll,
    );
    assert_eq!(
        constraint.check(&frame),
        vec![ObjectId::new(10), ObjectId::new(11)]
    );
}
