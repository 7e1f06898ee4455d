//! Structural shape of object snapshots.

use std::fmt;

use crate::id::ObjectId;

/// Structural kind declared by an object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    /// The object takes no part in the graph structure.
    Unstructured,
    /// The object is a graph node.
    Node,
    /// The object is a graph edge and carries two endpoint references.
    Edge,
}

/// Structural component of a snapshot.
///
/// The component must agree with the [`StructuralKind`] of the snapshot's
/// object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Structure {
    Unstructured,
    Node,
    Edge { origin: ObjectId, target: ObjectId },
}

impl Structure {
    /// Kind of this structural component.
    pub fn kind(&self) -> StructuralKind {
        match self {
            Structure::Unstructured => StructuralKind::Unstructured,
            Structure::Node => StructuralKind::Node,
            Structure::Edge { .. } => StructuralKind::Edge,
        }
    }

    /// Edge endpoints, if this is an edge.
    pub fn endpoints(&self) -> Option<(ObjectId, ObjectId)> {
        match self {
            Structure::Edge { origin, target } => Some((*origin, *target)),
            _ => None,
        }
    }

    /// Object references carried by the structural component.
    pub fn references(&self) -> Vec<ObjectId> {
        match self {
            Structure::Edge { origin, target } => vec![*origin, *target],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            StructuralKind::Unstructured => "unstructured",
            StructuralKind::Node => "node",
            StructuralKind::Edge => "edge",
        };
        write!(f, "{name}")
    }
}
