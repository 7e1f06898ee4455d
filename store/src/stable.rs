use std::collections::BTreeMap;
use std::sync::Arc;

use atelier_types::{FrameId, ObjectId, ObjectSnapshot};

use crate::Frame;

/// An immutable, accepted frame.
///
/// Every snapshot is frozen and shared; any number of stable frames may
/// hold the same snapshot.
#[derive(Clone, Debug)]
pub struct StableFrame {
    id: FrameId,
    snapshots: BTreeMap<ObjectId, Arc<ObjectSnapshot>>,
}

impl StableFrame {
    /// Assembles a stable frame from frozen snapshots.
    ///
    /// Panics on an unfrozen snapshot or a duplicate object; callers
    /// (frame acceptance, the loader) establish both before assembly.
    pub fn new(
        id: FrameId,
        snapshots: impl IntoIterator<Item = Arc<ObjectSnapshot>>,
    ) -> Self {
        let mut population = BTreeMap::new();
        for snapshot in snapshots {
            assert!(
                snapshot.is_frozen(),
                "stable frame {} given unfrozen snapshot of object {}",
                id,
                snapshot.object_id(),
            );
            let previous = population.insert(snapshot.object_id(), snapshot);
            if let Some(previous) = previous {
                panic!(
                    "stable frame {} given two snapshots of object {}",
                    id,
                    previous.object_id(),
                );
            }
        }
        StableFrame {
            id,
            snapshots: population,
        }
    }

    /// The shared snapshot of the given object, if present.
    pub fn shared_snapshot(&self, id: ObjectId) -> Option<&Arc<ObjectSnapshot>> {
        self.snapshots.get(&id)
    }

    /// Iterates the shared snapshots.
    pub fn shared_snapshots(&self) -> impl Iterator<Item = &Arc<ObjectSnapshot>> {
        self.snapshots.values()
    }
}

impl Frame for StableFrame {
    fn id(&self) -> FrameId {
        self.id
    }

    fn contains(&self, id: ObjectId) -> bool {
        self.snapshots.contains_key(&id)
    }

    fn object(&self, id: ObjectId) -> Option<&ObjectSnapshot> {
        self.snapshots.get(&id).map(Arc::as_ref)
    }

    fn snapshots(&self) -> Box<dyn Iterator<Item = &ObjectSnapshot> + '_> {
        Box::new(self.snapshots.values().map(Arc::as_ref))
    }

    fn len(&self) -> usize {
        self.snapshots.len()
    }
}
