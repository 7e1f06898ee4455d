//! Composable object predicates.

use atelier_store::Frame;
use atelier_types::{ObjectSnapshot, StructuralKind};

/// A predicate over a snapshot within a frame.
///
/// Predicates compose freely; they are used both to select the objects a
/// constraint applies to and, through
/// [`Requirement::AllSatisfy`](crate::Requirement::AllSatisfy), to state
/// what must hold for them.
#[derive(Clone, Debug)]
pub enum Predicate {
    /// Always holds.
    AcceptAll,
    /// Never holds.
    RejectAll,
    /// Every sub-predicate holds.
    All(Vec<Predicate>),
    /// At least one sub-predicate holds.
    Any(Vec<Predicate>),
    /// The sub-predicate does not hold.
    Not(Box<Predicate>),
    /// The snapshot is of the named object type.
    IsType(String),
    /// The snapshot's structural component is of the given kind.
    IsKind(StructuralKind),
    /// The snapshot has a value for the named attribute, explicit or
    /// defaulted.
    HasAttribute(String),
    /// The snapshot is an edge and its endpoints satisfy the given
    /// predicates.
    Edge {
        origin: Box<Predicate>,
        target: Box<Predicate>,
    },
}

impl Predicate {
    /// Evaluates the predicate against a snapshot in a frame.
    pub fn evaluate(&self, frame: &dyn Frame, snapshot: &ObjectSnapshot) -> bool {
        match self {
            Predicate::AcceptAll => true,
            Predicate::RejectAll => false,
            Predicate::All(predicates) => predicates
                .iter()
                .all(|predicate| predicate.evaluate(frame, snapshot)),
            Predicate::Any(predicates) => predicates
                .iter()
                .any(|predicate| predicate.evaluate(frame, snapshot)),
            Predicate::Not(predicate) => !predicate.evaluate(frame, snapshot),
            Predicate::IsType(name) => snapshot.type_name() == name,
            Predicate::IsKind(kind) => snapshot.structure().kind() == *kind,
            Predicate::HasAttribute(name) => snapshot.attribute(name).is_some(),
            Predicate::Edge { origin, target } => match snapshot.structure().endpoints() {
                Some((origin_id, target_id)) => {
                    let origin_holds = frame
                        .object(origin_id)
                        .map(|endpoint| origin.evaluate(frame, endpoint))
                        .unwrap_or(false);
                    let target_holds = frame
                        .object(target_id)
                        .map(|endpoint| target.evaluate(frame, endpoint))
                        .unwrap_or(false);
                    origin_holds && target_holds
                }
                None => false,
            },
        }
    }

    /// Convenience constructor for [`Predicate::IsType`].
    pub fn is_type(name: impl Into<String>) -> Self {
        Predicate::IsType(name.into())
    }

    /// Convenience constructor for [`Predicate::Edge`].
    pub fn edge(origin: Predicate, target: Predicate) -> Self {
        Predicate::Edge {
            origin: Box::new(origin),
            target: Box::new(target),
        }
    }
}
