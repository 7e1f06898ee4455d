//! Predicate-based graph constraints.

use atelier_error::Error;
use atelier_store::{Frame, FrameGraph, NeighbourhoodSelector};
use atelier_types::{ObjectId, ObjectSnapshot};

use crate::error::ConstraintViolation;
use crate::predicate::Predicate;
use crate::Verifier;

/// What must hold for an object matched by a constraint.
#[derive(Clone, Debug)]
pub enum Requirement {
    /// Matched objects are always acceptable.
    AcceptAll,
    /// Matched objects are never acceptable.
    RejectAll,
    /// Every matched object satisfies the predicate.
    AllSatisfy(Predicate),
    /// The matched node has at most one neighbour under the selector;
    /// exactly one when `required`.
    UniqueNeighbour {
        selector: NeighbourhoodSelector,
        required: bool,
    },
}

impl Requirement {
    fn holds(&self, frame: &dyn Frame, snapshot: &ObjectSnapshot) -> bool {
        match self {
            Requirement::AcceptAll => true,
            Requirement::RejectAll => false,
            Requirement::AllSatisfy(predicate) => predicate.evaluate(frame, snapshot),
            Requirement::UniqueNeighbour { selector, required } => {
                let count = FrameGraph::new(frame)
                    .neighbours(snapshot.object_id(), selector)
                    .len();
                if *required {
                    count == 1
                } else {
                    count <= 1
                }
            }
        }
    }
}

/// A named constraint: a match predicate selecting objects and a
/// requirement every selected object must meet.
#[derive(Clone, Debug)]
pub struct Constraint {
    name: String,
    match_predicate: Predicate,
    requirement: Requirement,
}

impl Constraint {
    /// Creates a constraint.
    pub fn new(
        name: impl Into<String>,
        match_predicate: Predicate,
        requirement: Requirement,
    ) -> Self {
        Constraint {
            name: name.into(),
            match_predicate,
            requirement,
        }
    }

    /// Constraint name, used in violation reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks the constraint over a frame, returning the violators.
    pub fn check(&self, frame: &dyn Frame) -> Vec<ObjectId> {
        frame
            .snapshots()
            .filter(|snapshot| self.match_predicate.evaluate(frame, snapshot))
            .filter(|snapshot| !self.requirement.holds(frame, snapshot))
            .map(|snapshot| snapshot.object_id())
            .collect()
    }
}

/// Runs a constraint list over a frame and collects every violation.
pub struct ConstraintVerifier<'a> {
    frame: &'a dyn Frame,
    constraints: &'a [Constraint],
}

impl<'a> ConstraintVerifier<'a> {
    pub fn new(frame: &'a dyn Frame, constraints: &'a [Constraint]) -> Self {
        ConstraintVerifier { frame, constraints }
    }

    /// Violations per constraint, empty when the frame is acceptable.
    pub fn violations(&self) -> Vec<(String, Vec<ObjectId>)> {
        self.constraints
            .iter()
            .filter_map(|constraint| {
                let violators = constraint.check(self.frame);
                if violators.is_empty() {
                    None
                } else {
                    Some((constraint.name().to_string(), violators))
                }
            })
            .collect()
    }
}

impl Verifier for ConstraintVerifier<'_> {
    fn verify(&self) -> Result<(), Error> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConstraintViolation { violations }.into())
        }
    }
}
