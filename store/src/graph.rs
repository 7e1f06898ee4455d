//! On-demand graph projection of a frame.
//!
//! Nodes and edges are not stored; the view walks the frame's snapshot
//! population and projects the structural components into graph shape.

use atelier_types::{ObjectId, ObjectSnapshot, Structure};

use crate::Frame;

/// A lightweight reference to an edge object in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeRef {
    /// Object id of the edge itself.
    pub id: ObjectId,
    /// Origin endpoint.
    pub origin: ObjectId,
    /// Target endpoint.
    pub target: ObjectId,
}

/// Direction of edge traversal relative to a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Edges whose origin is the node.
    Outgoing,
    /// Edges whose target is the node.
    Incoming,
}

/// Selects the neighbourhood of a node: edges of one type, one direction.
#[derive(Clone, Debug)]
pub struct NeighbourhoodSelector {
    /// Name of the edge object type to follow.
    pub edge_type: String,
    /// Traversal direction.
    pub direction: EdgeDirection,
}

impl NeighbourhoodSelector {
    /// Creates a selector.
    pub fn new(edge_type: impl Into<String>, direction: EdgeDirection) -> Self {
        NeighbourhoodSelector {
            edge_type: edge_type.into(),
            direction,
        }
    }
}

/// Graph view over a frame.
pub struct FrameGraph<'a> {
    frame: &'a dyn Frame,
}

impl<'a> FrameGraph<'a> {
    /// Creates a view over any frame.
    pub fn new(frame: &'a dyn Frame) -> Self {
        FrameGraph { frame }
    }

    /// Snapshots with node structure.
    pub fn nodes(&self) -> Vec<&'a ObjectSnapshot> {
        self.frame
            .snapshots()
            .filter(|snapshot| matches!(snapshot.structure(), Structure::Node))
            .collect()
    }

    /// Edge references of every edge-structured snapshot.
    pub fn edges(&self) -> Vec<EdgeRef> {
        self.frame
            .snapshots()
            .filter_map(|snapshot| match snapshot.structure() {
                Structure::Edge { origin, target } => Some(EdgeRef {
                    id: snapshot.object_id(),
                    origin,
                    target,
                }),
                _ => None,
            })
            .collect()
    }

    /// Edges whose origin is the given node.
    pub fn outgoing(&self, id: ObjectId) -> Vec<EdgeRef> {
        self.edges()
            .into_iter()
            .filter(|edge| edge.origin == id)
            .collect()
    }

    /// Edges whose target is the given node.
    pub fn incoming(&self, id: ObjectId) -> Vec<EdgeRef> {
        self.edges()
            .into_iter()
            .filter(|edge| edge.target == id)
            .collect()
    }

    /// Edges adjacent to the node under the selector: of the selected
    /// edge type, in the selected direction.
    pub fn selected_edges(&self, id: ObjectId, selector: &NeighbourhoodSelector) -> Vec<EdgeRef> {
        let adjacent = match selector.direction {
            EdgeDirection::Outgoing => self.outgoing(id),
            EdgeDirection::Incoming => self.incoming(id),
        };
        adjacent
            .into_iter()
            .filter(|edge| {
                self.frame
                    .object(edge.id)
                    .map(|snapshot| snapshot.type_name() == selector.edge_type)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Object ids at the far end of the selected edges.
    pub fn neighbours(&self, id: ObjectId, selector: &NeighbourhoodSelector) -> Vec<ObjectId> {
        self.selected_edges(id, selector)
            .into_iter()
            .map(|edge| match selector.direction {
                EdgeDirection::Outgoing => edge.target,
                EdgeDirection::Incoming => edge.origin,
            })
            .collect()
    }
}
