//! Versioned object snapshots.
//!
//! A snapshot is one version of one object. It is mutable while it belongs
//! to an open transient frame and immutable forever once frozen; frozen
//! snapshots are shared freely between stable frames. Mutating a frozen
//! snapshot is a programmer error and panics.

use std::collections::BTreeMap;
use std::sync::Arc;

use atelier_error::impl_error_conversion_with_kind;
use thiserror::Error;

use crate::id::{ObjectId, SnapshotId};
use crate::metamodel::ObjectType;
use crate::structure::Structure;
use crate::value::{ValueError, Variant};

/// Lifecycle state of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotState {
    /// Under construction, not yet installed in a frame.
    Unstable,
    /// Installed in an open transient frame, mutable.
    Transient,
    /// Accepted; no field mutates any more.
    Frozen,
}

/// Ordered, duplicate-free list of child objects.
///
/// Insertion order is stable and significant for external presentation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Children(Vec<ObjectId>);

impl Children {
    /// Creates an empty list.
    pub fn new() -> Self {
        Children(Vec::new())
    }

    /// Whether the list contains the given object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.0.contains(&id)
    }

    /// Appends an object; a duplicate keeps its original position.
    pub fn add(&mut self, id: ObjectId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    /// Removes an object, preserving the order of the rest.
    pub fn remove(&mut self, id: ObjectId) {
        self.0.retain(|child| *child != id);
    }

    /// Children in insertion order.
    pub fn as_slice(&self) -> &[ObjectId] {
        &self.0
    }

    /// Iterates children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.0.iter().copied()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ObjectId> for Children {
    fn from_iter<T: IntoIterator<Item = ObjectId>>(iter: T) -> Self {
        let mut children = Children::new();
        for id in iter {
            children.add(id);
        }
        children
    }
}

/// Failures of attribute mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// The attribute is not part of the object type's schema.
    #[error("type {object_type} declares no attribute {attribute}")]
    UnknownAttribute {
        object_type: String,
        attribute: String,
    },

    /// The value is not convertible to the declared attribute type.
    #[error("attribute {attribute}: {source}")]
    Value {
        attribute: String,
        source: ValueError,
    },
}

impl_error_conversion_with_kind!(
    AttributeError,
    atelier_error::ErrorKind::Frame,
    atelier_error::Error
);

/// One version of one object.
#[derive(Clone, Debug)]
pub struct ObjectSnapshot {
    snapshot_id: SnapshotId,
    object_id: ObjectId,
    object_type: Arc<ObjectType>,
    structure: Structure,
    attributes: BTreeMap<String, Variant>,
    parent: Option<ObjectId>,
    children: Children,
    state: SnapshotState,
}

impl ObjectSnapshot {
    /// Creates an unstable snapshot.
    ///
    /// Panics when the structural component disagrees with the object
    /// type's structural kind; callers validate structure before
    /// constructing.
    pub fn new(
        snapshot_id: SnapshotId,
        object_id: ObjectId,
        object_type: Arc<ObjectType>,
        structure: Structure,
    ) -> Self {
        assert_eq!(
            structure.kind(),
            object_type.structural_kind(),
            "structure of object {} disagrees with type {}",
            object_id,
            object_type.name(),
        );
        ObjectSnapshot {
            snapshot_id,
            object_id,
            object_type,
            structure,
            attributes: BTreeMap::new(),
            parent: None,
            children: Children::new(),
            state: SnapshotState::Unstable,
        }
    }

    /// Snapshot identity.
    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }

    /// Object identity, shared by all versions of the object.
    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Object type.
    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.object_type
    }

    /// Name of the object type.
    pub fn type_name(&self) -> &str {
        self.object_type.name()
    }

    /// Structural component.
    pub fn structure(&self) -> Structure {
        self.structure
    }

    /// Lifecycle state.
    pub fn state(&self) -> SnapshotState {
        self.state
    }

    /// Whether the snapshot is frozen.
    pub fn is_frozen(&self) -> bool {
        self.state == SnapshotState::Frozen
    }

    /// Parent object, if any.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Child objects in insertion order.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Explicitly set attributes, without defaults.
    pub fn explicit_attributes(&self) -> &BTreeMap<String, Variant> {
        &self.attributes
    }

    /// Attribute value: the explicit value if set, otherwise the type
    /// default.
    pub fn attribute(&self, name: &str) -> Option<&Variant> {
        self.attributes
            .get(name)
            .or_else(|| self.object_type.default_value(name))
    }

    /// The `name` attribute rendered as a string, if present.
    pub fn name(&self) -> Option<&str> {
        self.attribute("name").and_then(Variant::as_string)
    }

    /// Object ids this snapshot structurally depends on: edge endpoints
    /// plus the parent, if any.
    pub fn structural_dependencies(&self) -> Vec<ObjectId> {
        let mut dependencies = self.structure.references();
        if let Some(parent) = self.parent {
            dependencies.push(parent);
        }
        dependencies
    }

    fn assert_mutable(&self) {
        assert!(
            self.state != SnapshotState::Frozen,
            "mutating frozen snapshot {} of object {}",
            self.snapshot_id,
            self.object_id,
        );
    }

    /// Sets an attribute, converting the value to the declared type.
    pub fn set_attribute(&mut self, name: &str, value: Variant) -> Result<(), AttributeError> {
        self.assert_mutable();
        let descriptor =
            self.object_type
                .attribute(name)
                .ok_or_else(|| AttributeError::UnknownAttribute {
                    object_type: self.object_type.name().to_string(),
                    attribute: name.to_string(),
                })?;
        let converted =
            value
                .convert(descriptor.value_type())
                .map_err(|source| AttributeError::Value {
                    attribute: name.to_string(),
                    source,
                })?;
        self.attributes.insert(name.to_string(), converted);
        Ok(())
    }

    /// Removes an explicit attribute value, reverting to the type default.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Variant> {
        self.assert_mutable();
        self.attributes.remove(name)
    }

    /// Replaces the structural component; the kind must not change.
    pub fn set_structure(&mut self, structure: Structure) {
        self.assert_mutable();
        assert_eq!(
            structure.kind(),
            self.object_type.structural_kind(),
            "structure of object {} disagrees with type {}",
            self.object_id,
            self.object_type.name(),
        );
        self.structure = structure;
    }

    /// Sets or clears the parent pointer.
    pub fn set_parent(&mut self, parent: Option<ObjectId>) {
        self.assert_mutable();
        self.parent = parent;
    }

    /// Appends a child.
    pub fn add_child(&mut self, child: ObjectId) {
        self.assert_mutable();
        self.children.add(child);
    }

    /// Removes a child.
    pub fn remove_child(&mut self, child: ObjectId) {
        self.assert_mutable();
        self.children.remove(child);
    }

    /// Replaces the whole children list.
    pub fn set_children(&mut self, children: Children) {
        self.assert_mutable();
        self.children = children;
    }

    /// Marks an unstable snapshot as belonging to a transient frame.
    pub fn make_transient(&mut self) {
        self.assert_mutable();
        self.state = SnapshotState::Transient;
    }

    /// Freezes the snapshot; idempotent, irreversible.
    pub fn freeze(&mut self) {
        self.state = SnapshotState::Frozen;
    }

    /// Clones this snapshot into a new mutable version under a fresh
    /// snapshot id, keeping the object identity.
    pub fn derive(&self, snapshot_id: SnapshotId) -> ObjectSnapshot {
        let mut derived = self.clone();
        derived.snapshot_id = snapshot_id;
        derived.state = SnapshotState::Transient;
        derived
    }

    /// Clones this snapshot under a fresh snapshot id and a new object
    /// identity, dropping the hierarchy links which refer to the old
    /// identity's surroundings.
    pub fn duplicate(&self, snapshot_id: SnapshotId, object_id: ObjectId) -> ObjectSnapshot {
        let mut duplicated = self.clone();
        duplicated.snapshot_id = snapshot_id;
        duplicated.object_id = object_id;
        duplicated.parent = None;
        duplicated.children = Children::new();
        duplicated.state = SnapshotState::Transient;
        duplicated
    }
}
