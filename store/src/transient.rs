use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use atelier_types::{FrameId, ObjectId, ObjectSnapshot, SnapshotId};
use log::trace;

use crate::error::FrameError;
use crate::stable::StableFrame;
use crate::Frame;

/// Lifecycle state of a transient frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Accepting mutations.
    Open,
    /// Frozen into a stable frame.
    Accepted,
    /// Abandoned without effect.
    Discarded,
}

/// Per-object ownership within a transient frame.
///
/// Inherited snapshots stay shared until a mutation derives them; only
/// owned snapshots may be mutated.
#[derive(Clone, Debug)]
enum FrameCell {
    Shared(Arc<ObjectSnapshot>),
    Owned(ObjectSnapshot),
}

impl FrameCell {
    fn snapshot(&self) -> &ObjectSnapshot {
        match self {
            FrameCell::Shared(snapshot) => snapshot,
            FrameCell::Owned(snapshot) => snapshot,
        }
    }
}

/// A frame open for mutation.
///
/// Derived from a stable frame (or empty), a transient frame tracks which
/// snapshots it owns, which inherited objects it removed, and which of its
/// own creations it removed again. It is accepted or discarded exactly
/// once.
#[derive(Debug)]
pub struct TransientFrame {
    id: FrameId,
    snapshots: BTreeMap<ObjectId, FrameCell>,
    snapshot_ids: HashSet<SnapshotId>,
    /// Objects present in the frame this one was derived from.
    inherited: HashSet<ObjectId>,
    removed: HashSet<ObjectId>,
    removed_created: HashSet<ObjectId>,
    /// Reserved identifier values no longer referenced by the frame:
    /// snapshot ids of removed owned snapshots, object ids of removed
    /// created objects.
    retired_ids: Vec<u64>,
    state: FrameState,
    changed: bool,
}

impl TransientFrame {
    /// Creates an empty open frame.
    pub fn new(id: FrameId) -> Self {
        TransientFrame {
            id,
            snapshots: BTreeMap::new(),
            snapshot_ids: HashSet::new(),
            inherited: HashSet::new(),
            removed: HashSet::new(),
            removed_created: HashSet::new(),
            retired_ids: Vec::new(),
            state: FrameState::Open,
            changed: false,
        }
    }

    /// Creates an open frame pre-populated with every snapshot of the
    /// given stable frame as a shared reference.
    pub fn derived(id: FrameId, base: &StableFrame) -> Self {
        let mut frame = TransientFrame::new(id);
        for snapshot in base.shared_snapshots() {
            frame.inherited.insert(snapshot.object_id());
            frame.snapshot_ids.insert(snapshot.snapshot_id());
            frame
                .snapshots
                .insert(snapshot.object_id(), FrameCell::Shared(Arc::clone(snapshot)));
        }
        frame
    }

    /// Lifecycle state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Whether the frame still accepts mutations.
    pub fn is_open(&self) -> bool {
        self.state == FrameState::Open
    }

    /// Whether any mutation happened since derivation.
    pub fn has_changes(&self) -> bool {
        self.changed
    }

    /// Inherited objects removed from this frame.
    pub fn removed(&self) -> &HashSet<ObjectId> {
        &self.removed
    }

    /// Objects created in this frame and removed again before acceptance.
    /// They were never part of any version and do not count as removals
    /// of the derived frame.
    pub fn removed_created(&self) -> &HashSet<ObjectId> {
        &self.removed_created
    }

    fn assert_open(&self) {
        assert!(
            self.is_open(),
            "mutating frame {} in state {:?}",
            self.id,
            self.state,
        );
    }

    fn check_new_ids(
        &self,
        object_id: ObjectId,
        snapshot_id: SnapshotId,
    ) -> Result<(), FrameError> {
        if self.snapshots.contains_key(&object_id) {
            return Err(FrameError::DuplicateObject(object_id));
        }
        if self.snapshot_ids.contains(&snapshot_id) {
            return Err(FrameError::DuplicateSnapshot(snapshot_id));
        }
        Ok(())
    }

    /// Installs an owned snapshot.
    ///
    /// The snapshot must not be frozen; it is marked transient on the way
    /// in. Rejects an object or snapshot id already present in the frame.
    pub fn insert(&mut self, mut snapshot: ObjectSnapshot) -> Result<(), FrameError> {
        self.assert_open();
        self.check_new_ids(snapshot.object_id(), snapshot.snapshot_id())?;
        snapshot.make_transient();
        self.snapshot_ids.insert(snapshot.snapshot_id());
        self.snapshots
            .insert(snapshot.object_id(), FrameCell::Owned(snapshot));
        self.changed = true;
        Ok(())
    }

    /// Installs an inherited frozen snapshot as a shared reference.
    pub fn insert_shared(&mut self, snapshot: Arc<ObjectSnapshot>) -> Result<(), FrameError> {
        self.assert_open();
        assert!(
            snapshot.is_frozen(),
            "sharing unfrozen snapshot of object {}",
            snapshot.object_id(),
        );
        self.check_new_ids(snapshot.object_id(), snapshot.snapshot_id())?;
        self.inherited.insert(snapshot.object_id());
        self.snapshot_ids.insert(snapshot.snapshot_id());
        self.snapshots
            .insert(snapshot.object_id(), FrameCell::Shared(snapshot));
        Ok(())
    }

    /// Whether the frame owns the snapshot of the given object.
    pub fn is_owned(&self, id: ObjectId) -> bool {
        matches!(self.snapshots.get(&id), Some(FrameCell::Owned(_)))
    }

    /// Mutable access to an owned snapshot.
    ///
    /// Answers `None` for shared snapshots; callers derive first.
    pub fn owned_mut(&mut self, id: ObjectId) -> Option<&mut ObjectSnapshot> {
        self.assert_open();
        match self.snapshots.get_mut(&id) {
            Some(FrameCell::Owned(snapshot)) => {
                self.changed = true;
                Some(snapshot)
            }
            _ => None,
        }
    }

    /// Clones a shared snapshot into an owned one under a fresh snapshot
    /// id. A no-op when the frame already owns the object's snapshot.
    pub fn derive(
        &mut self,
        id: ObjectId,
        snapshot_id: SnapshotId,
    ) -> Result<(), FrameError> {
        self.assert_open();
        let cell = self
            .snapshots
            .get_mut(&id)
            .ok_or(FrameError::UnknownObject(id))?;
        if let FrameCell::Shared(shared) = cell {
            let derived = shared.derive(snapshot_id);
            self.snapshot_ids.remove(&shared.snapshot_id());
            self.snapshot_ids.insert(snapshot_id);
            *cell = FrameCell::Owned(derived);
            self.changed = true;
        }
        Ok(())
    }

    fn remove_object(&mut self, id: ObjectId) {
        if let Some(cell) = self.snapshots.remove(&id) {
            self.snapshot_ids.remove(&cell.snapshot().snapshot_id());
            if let FrameCell::Owned(snapshot) = &cell {
                self.retired_ids.push(snapshot.snapshot_id().raw());
            }
            if self.inherited.contains(&id) {
                self.removed.insert(id);
            } else {
                self.removed_created.insert(id);
                self.retired_ids.push(id.raw());
            }
            self.changed = true;
        }
    }

    /// Removes the object and, transitively to fixpoint, every snapshot
    /// whose structural dependencies include a removed object: edges that
    /// lost an endpoint, children that lost their parent.
    ///
    /// Surviving parents whose child list mentions a removed object are
    /// derived on demand; `fresh_snapshot_id` supplies their new snapshot
    /// ids. Returns the removed object ids.
    pub fn remove_cascading(
        &mut self,
        id: ObjectId,
        mut fresh_snapshot_id: impl FnMut() -> SnapshotId,
    ) -> Result<HashSet<ObjectId>, FrameError> {
        self.assert_open();
        if !self.snapshots.contains_key(&id) {
            return Err(FrameError::UnknownObject(id));
        }

        let mut removed_now: HashSet<ObjectId> = HashSet::new();
        let mut worklist = vec![id];
        while let Some(current) = worklist.pop() {
            if !removed_now.insert(current) {
                continue;
            }
            self.remove_object(current);
            let dependents: Vec<ObjectId> = self
                .snapshots
                .values()
                .filter(|cell| {
                    cell.snapshot()
                        .structural_dependencies()
                        .contains(&current)
                })
                .map(|cell| cell.snapshot().object_id())
                .collect();
            worklist.extend(dependents);
        }

        // Surviving snapshots may still list a removed object as a child.
        let stale_parents: Vec<ObjectId> = self
            .snapshots
            .values()
            .filter(|cell| {
                removed_now
                    .iter()
                    .any(|gone| cell.snapshot().children().contains(*gone))
            })
            .map(|cell| cell.snapshot().object_id())
            .collect();
        for parent in stale_parents {
            if !self.is_owned(parent) {
                let snapshot_id = fresh_snapshot_id();
                self.derive(parent, snapshot_id)?;
            }
            if let Some(snapshot) = self.owned_mut(parent) {
                for gone in &removed_now {
                    snapshot.remove_child(*gone);
                }
            }
        }

        trace!(
            "frame {}: cascading removal of {} took {} objects",
            self.id,
            id,
            removed_now.len(),
        );
        Ok(removed_now)
    }

    /// Reserved identifier values the frame no longer references; the
    /// design releases them whether the frame is accepted or discarded.
    pub fn retired_ids(&self) -> &[u64] {
        &self.retired_ids
    }

    /// Identifier values this frame introduced: snapshot ids of owned
    /// snapshots and object ids of objects created here. The design
    /// releases them on discard and marks them used on acceptance.
    pub fn introduced_ids(&self) -> Vec<u64> {
        let mut ids = Vec::new();
        for cell in self.snapshots.values() {
            if let FrameCell::Owned(snapshot) = cell {
                ids.push(snapshot.snapshot_id().raw());
                if !self.inherited.contains(&snapshot.object_id()) {
                    ids.push(snapshot.object_id().raw());
                }
            }
        }
        ids
    }

    /// Marks the frame discarded.
    pub fn discard(&mut self) {
        self.assert_open();
        self.state = FrameState::Discarded;
    }

    /// Freezes every owned snapshot and re-keys the population into a
    /// stable frame with the same frame id.
    pub fn freeze(mut self) -> StableFrame {
        self.assert_open();
        self.state = FrameState::Accepted;
        let snapshots: Vec<Arc<ObjectSnapshot>> = self
            .snapshots
            .into_values()
            .map(|cell| match cell {
                FrameCell::Shared(snapshot) => snapshot,
                FrameCell::Owned(mut snapshot) => {
                    snapshot.freeze();
                    Arc::new(snapshot)
                }
            })
            .collect();
        StableFrame::new(self.id, snapshots)
    }
}

impl Frame for TransientFrame {
    fn id(&self) -> FrameId {
        self.id
    }

    fn contains(&self, id: ObjectId) -> bool {
        self.snapshots.contains_key(&id)
    }

    fn object(&self, id: ObjectId) -> Option<&ObjectSnapshot> {
        self.snapshots.get(&id).map(FrameCell::snapshot)
    }

    fn snapshots(&self) -> Box<dyn Iterator<Item = &ObjectSnapshot> + '_> {
        Box::new(self.snapshots.values().map(FrameCell::snapshot))
    }

    fn len(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use atelier_types::{
        AttributeDescriptor, AtomType, ObjectType, Structure, StructuralKind, ValueType, Variant,
    };

    use super::*;

    fn node_type() -> Arc<ObjectType> {
        Arc::new(ObjectType::new(
            "Stock",
            StructuralKind::Node,
            vec![AttributeDescriptor::new(
                "name",
                ValueType::Atom(AtomType::String),
            )],
        ))
    }

    fn edge_type() -> Arc<ObjectType> {
        Arc::new(ObjectType::new("Arrow", StructuralKind::Edge, vec![]))
    }

    fn node(snapshot_id: u64, object_id: u64) -> ObjectSnapshot {
        ObjectSnapshot::new(
            SnapshotId::new(snapshot_id),
            ObjectId::new(object_id),
            node_type(),
            Structure::Node,
        )
    }

    fn edge(snapshot_id: u64, object_id: u64, origin: u64, target: u64) -> ObjectSnapshot {
        ObjectSnapshot::new(
            SnapshotId::new(snapshot_id),
            ObjectId::new(object_id),
            edge_type(),
            Structure::Edge {
                origin: ObjectId::new(origin),
                target: ObjectId::new(target),
            },
        )
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut frame = TransientFrame::new(FrameId::new(1));
        frame.insert(node(1, 10)).unwrap();
        assert_eq!(
            frame.insert(node(2, 10)),
            Err(FrameError::DuplicateObject(ObjectId::new(10)))
        );
        assert_eq!(
            frame.insert(node(1, 11)),
            Err(FrameError::DuplicateSnapshot(SnapshotId::new(1)))
        );
    }

    #[test]
    fn shared_snapshots_are_not_mutable() {
        let mut base = TransientFrame::new(FrameId::new(1));
        base.insert(node(1, 10)).unwrap();
        let stable = base.freeze();

        let mut frame = TransientFrame::derived(FrameId::new(2), &stable);
        assert!(!frame.is_owned(ObjectId::new(10)));
        assert!(frame.owned_mut(ObjectId::new(10)).is_none());

        frame.derive(ObjectId::new(10), SnapshotId::new(2)).unwrap();
        assert!(frame.is_owned(ObjectId::new(10)));
        let snapshot = frame.owned_mut(ObjectId::new(10)).unwrap();
        snapshot.set_attribute("name", Variant::from("a")).unwrap();
        assert_eq!(snapshot.snapshot_id(), SnapshotId::new(2));
    }

    #[test]
    fn cascading_removal_takes_edges_and_children() {
        let mut frame = TransientFrame::new(FrameId::new(1));
        frame.insert(node(1, 10)).unwrap();
        frame.insert(node(2, 11)).unwrap();
        frame.insert(edge(3, 12, 10, 11)).unwrap();
        // A child of the removed node.
        let mut child = node(4, 13);
        child.set_parent(Some(ObjectId::new(10)));
        frame.insert(child).unwrap();
        if let Some(owner) = frame.owned_mut(ObjectId::new(10)) {
            owner.add_child(ObjectId::new(13));
        }

        let mut next = 100u64;
        let removed = frame
            .remove_cascading(ObjectId::new(10), || {
                next += 1;
                SnapshotId::new(next)
            })
            .unwrap();

        let expected: HashSet<ObjectId> =
            [10u64, 12, 13].iter().map(|id| ObjectId::new(*id)).collect();
        assert_eq!(removed, expected);
        assert!(frame.contains(ObjectId::new(11)));
        assert_eq!(frame.len(), 1);
        // Created in this frame, so tracked separately from inherited
        // removals.
        assert!(frame.removed().is_empty());
        assert_eq!(frame.removed_created().len(), 3);
    }

    #[test]
    fn cascading_removal_updates_surviving_parent() {
        let mut base = TransientFrame::new(FrameId::new(1));
        let mut parent = node(1, 10);
        parent.add_child(ObjectId::new(11));
        base.insert(parent).unwrap();
        let mut child = node(2, 11);
        child.set_parent(Some(ObjectId::new(10)));
        base.insert(child).unwrap();
        let stable = base.freeze();

        let mut frame = TransientFrame::derived(FrameId::new(2), &stable);
        let mut next = 100u64;
        let removed = frame
            .remove_cascading(ObjectId::new(11), || {
                next += 1;
                SnapshotId::new(next)
            })
            .unwrap();

        let expected: HashSet<ObjectId> = [ObjectId::new(11)].into_iter().collect();
        assert_eq!(removed, expected);
        let parent = frame.object(ObjectId::new(10)).unwrap();
        assert!(parent.children().is_empty());
        // The parent was derived to drop the child from its list.
        assert!(frame.is_owned(ObjectId::new(10)));
        assert_eq!(frame.removed(), &expected);
    }

    #[test]
    fn freeze_produces_frozen_population() {
        let mut frame = TransientFrame::new(FrameId::new(1));
        frame.insert(node(1, 10)).unwrap();
        let stable = frame.freeze();
        assert_eq!(Frame::id(&stable), FrameId::new(1));
        assert!(stable.object(ObjectId::new(10)).unwrap().is_frozen());
    }

    #[test]
    #[should_panic(expected = "mutating frame")]
    fn discarded_frame_rejects_mutation() {
        let mut frame = TransientFrame::new(FrameId::new(1));
        frame.discard();
        let _ = frame.insert(node(1, 10));
    }
}
