//! Shared fixture metamodel for tests.
//!
//! A miniature stock-and-flow language: `Stock`, `Flow` and `Auxiliary`
//! nodes carrying a `name` and a `formula`, a `Note` without structure,
//! and `Drains`/`Fills` edges with endpoint-shape constraints. Enough of a
//! domain to exercise typing, structure and constraints without pulling a
//! real modeling language into the workspace.

use std::sync::Arc;

use atelier_types::{
    AtomType, AttributeDescriptor, ObjectType, StaticMetamodel, StructuralKind, ValueType, Variant,
};
use atelier_verification::{Constraint, Predicate, Requirement};
use semver::Version;

/// The fixture metamodel.
pub fn stock_flow_metamodel() -> Arc<StaticMetamodel> {
    let name = || AttributeDescriptor::new("name", ValueType::Atom(AtomType::String));
    let formula = || {
        AttributeDescriptor::with_default(
            "formula",
            ValueType::Atom(AtomType::String),
            Variant::from("0"),
        )
    };
    let position = || {
        AttributeDescriptor::new("position", ValueType::Atom(AtomType::Point))
    };

    let types = vec![
        ObjectType::new(
            "Stock",
            StructuralKind::Node,
            vec![name(), formula(), position()],
        ),
        ObjectType::new(
            "Flow",
            StructuralKind::Node,
            vec![name(), formula(), position()],
        ),
        ObjectType::new(
            "Auxiliary",
            StructuralKind::Node,
            vec![name(), formula(), position()],
        ),
        ObjectType::new(
            "Note",
            StructuralKind::Unstructured,
            vec![AttributeDescriptor::new(
                "text",
                ValueType::Atom(AtomType::String),
            )],
        ),
        ObjectType::new("Drains", StructuralKind::Edge, vec![]),
        ObjectType::new("Fills", StructuralKind::Edge, vec![]),
        ObjectType::new("Parameter", StructuralKind::Edge, vec![]),
    ];

    Arc::new(StaticMetamodel::new(
        "stock-flow",
        Version::new(0, 2, 0),
        types,
    ))
}

/// Constraints of the fixture metamodel: drains run from stocks into
/// flows, fills from flows into stocks.
pub fn stock_flow_constraints() -> Vec<Constraint> {
    vec![
        Constraint::new(
            "drains_endpoints",
            Predicate::is_type("Drains"),
            Requirement::AllSatisfy(Predicate::edge(
                Predicate::is_type("Stock"),
                Predicate::is_type("Flow"),
            )),
        ),
        Constraint::new(
            "fills_endpoints",
            Predicate::is_type("Fills"),
            Requirement::AllSatisfy(Predicate::edge(
                Predicate::is_type("Flow"),
                Predicate::is_type("Stock"),
            )),
        ),
    ]
}
