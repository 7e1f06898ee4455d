use std::collections::HashSet;
use std::sync::Arc;

use atelier_error::Error;
use atelier_identity::IdentityManager;
use atelier_store::{Frame, FrameError, TransientFrame};
use atelier_types::{
    Metamodel, ObjectId, ObjectSnapshot, SnapshotId, Structure, Variant,
};
use log::debug;

/// Mutation API over one open transient frame.
///
/// The editor borrows the frame together with the design's identity
/// manager, so object and snapshot ids are allocated from the design-wide
/// space. Ids are reserved, not used; they become permanent only when the
/// frame is accepted, so a discarded frame gives them back.
pub struct FrameEditor<'a> {
    metamodel: Arc<dyn Metamodel>,
    identity: &'a mut IdentityManager,
    frame: &'a mut TransientFrame,
}

impl<'a> FrameEditor<'a> {
    pub(crate) fn new(
        metamodel: Arc<dyn Metamodel>,
        identity: &'a mut IdentityManager,
        frame: &'a mut TransientFrame,
    ) -> Self {
        FrameEditor {
            metamodel,
            identity,
            frame,
        }
    }

    /// Read-only view of the frame under edit.
    pub fn frame(&self) -> &TransientFrame {
        self.frame
    }

    /// Creates an object of the named type with the given structural
    /// component, allocating a fresh object identity.
    ///
    /// Fails when the type is unknown or the structure disagrees with the
    /// type's structural kind. Edge endpoints are not resolved here; a
    /// dangling endpoint surfaces as a referential-integrity panic at
    /// acceptance.
    pub fn create(&mut self, type_name: &str, structure: Structure) -> Result<ObjectId, Error> {
        let object_type = self
            .metamodel
            .object_type(type_name)
            .ok_or_else(|| FrameError::UnknownType(type_name.to_string()))?;
        if structure.kind() != object_type.structural_kind() {
            return Err(FrameError::StructureMismatch {
                object_type: type_name.to_string(),
                expected: object_type.structural_kind(),
                found: structure.kind(),
            }
            .into());
        }
        let object_id = ObjectId::new(self.identity.next());
        let snapshot_id = SnapshotId::new(self.identity.next());
        let snapshot = ObjectSnapshot::new(snapshot_id, object_id, object_type, structure);
        self.frame.insert(snapshot)?;
        debug!(
            "frame {}: created {} object {}",
            self.frame.id(),
            type_name,
            object_id,
        );
        Ok(object_id)
    }

    /// Creates a node object of the named type.
    pub fn create_node(&mut self, type_name: &str) -> Result<ObjectId, Error> {
        self.create(type_name, Structure::Node)
    }

    /// Creates an edge object of the named type between two objects.
    pub fn create_edge(
        &mut self,
        type_name: &str,
        origin: ObjectId,
        target: ObjectId,
    ) -> Result<ObjectId, Error> {
        self.create(type_name, Structure::Edge { origin, target })
    }

    /// Clones a snapshot into this frame.
    ///
    /// With `id` of `None` the clone keeps the prototype's object
    /// identity and hierarchy links, continuing that object's version
    /// line. With an explicit id the clone becomes a fresh object with
    /// cleared hierarchy links. Either way it is owned here under a new
    /// snapshot id.
    pub fn insert_derived(
        &mut self,
        proto: &ObjectSnapshot,
        id: Option<ObjectId>,
    ) -> Result<ObjectId, Error> {
        let snapshot_id = SnapshotId::new(self.identity.next());
        let snapshot = match id {
            None => proto.derive(snapshot_id),
            Some(object_id) => proto.duplicate(snapshot_id, object_id),
        };
        let object_id = snapshot.object_id();
        self.frame.insert(snapshot)?;
        Ok(object_id)
    }

    /// Mutable snapshot of the object, deriving it from the shared
    /// original on first touch. All mutations of the object within this
    /// frame go through the derived snapshot.
    pub fn mutable_object(&mut self, id: ObjectId) -> Result<&mut ObjectSnapshot, Error> {
        if !self.frame.contains(id) {
            return Err(FrameError::UnknownObject(id).into());
        }
        if !self.frame.is_owned(id) {
            let snapshot_id = SnapshotId::new(self.identity.next());
            self.frame.derive(id, snapshot_id)?;
        }
        Ok(self
            .frame
            .owned_mut(id)
            .expect("object owned after derivation"))
    }

    /// Sets an attribute of the object, converting the value to the
    /// declared attribute type.
    pub fn set_attribute(
        &mut self,
        id: ObjectId,
        name: &str,
        value: Variant,
    ) -> Result<(), Error> {
        let snapshot = self.mutable_object(id)?;
        snapshot
            .set_attribute(name, value)
            .map_err(FrameError::from)?;
        Ok(())
    }

    /// Moves the object under a new parent (or to the top level),
    /// maintaining the children lists on both ends.
    pub fn set_parent(&mut self, id: ObjectId, parent: Option<ObjectId>) -> Result<(), Error> {
        if let Some(parent) = parent {
            if !self.frame.contains(parent) {
                return Err(FrameError::UnknownObject(parent).into());
            }
        }
        let previous = match self.frame.object(id) {
            Some(snapshot) => snapshot.parent(),
            None => return Err(FrameError::UnknownObject(id).into()),
        };
        if previous == parent {
            return Ok(());
        }
        self.mutable_object(id)?.set_parent(parent);
        if let Some(previous) = previous {
            self.mutable_object(previous)?.remove_child(id);
        }
        if let Some(parent) = parent {
            self.mutable_object(parent)?.add_child(id);
        }
        Ok(())
    }

    /// Removes the object and everything structurally depending on it,
    /// transitively. Returns the removed object ids.
    pub fn remove_cascading(&mut self, id: ObjectId) -> Result<HashSet<ObjectId>, Error> {
        let identity = &mut *self.identity;
        let removed = self
            .frame
            .remove_cascading(id, || SnapshotId::new(identity.next()))?;
        debug!(
            "frame {}: removed object {} and {} dependents",
            self.frame.id(),
            id,
            removed.len() - 1,
        );
        Ok(removed)
    }
}
