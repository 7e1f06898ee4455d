//! Extraction of a design into its raw form.

use std::collections::HashSet;

use atelier_design::Design;
use atelier_store::Frame;
use atelier_types::{ObjectId, ObjectSnapshot, Structure};

use crate::raw::{RawDesign, RawFrame, RawId, RawReference, RawList, RawSnapshot, RawStructure};
use crate::value::CodedValue;
use crate::{CURRENT_FRAME_REFERENCE, REDO_LIST, UNDO_LIST};

/// Produces the raw form of a design; the inverse of the loader.
pub struct Extractor<'a> {
    design: &'a Design,
}

fn raw_structure(structure: Structure) -> RawStructure {
    match structure {
        Structure::Unstructured => RawStructure::unstructured(),
        Structure::Node => RawStructure::node(),
        Structure::Edge { origin, target } => {
            RawStructure::edge(origin.raw(), target.raw())
        }
    }
}

fn raw_snapshot(snapshot: &ObjectSnapshot) -> RawSnapshot {
    RawSnapshot {
        type_name: Some(snapshot.type_name().to_string()),
        snapshot_id: Some(RawId::Int(snapshot.snapshot_id().raw())),
        id: Some(RawId::Int(snapshot.object_id().raw())),
        structure: Some(raw_structure(snapshot.structure())),
        parent: snapshot.parent().map(|parent| RawId::Int(parent.raw())),
        attributes: snapshot
            .explicit_attributes()
            .iter()
            .map(|(name, value)| (name.clone(), CodedValue(value.clone())))
            .collect(),
    }
}

impl<'a> Extractor<'a> {
    /// Creates an extractor over a design.
    pub fn new(design: &'a Design) -> Self {
        Extractor { design }
    }

    /// Extracts the whole design: one raw snapshot per distinct snapshot
    /// reachable from any stable frame, one raw frame per stable frame,
    /// the current-frame reference, the undo and redo lists, and the
    /// named frame references.
    pub fn extract(&self) -> RawDesign {
        let mut seen: HashSet<u64> = HashSet::new();
        let mut snapshots: Vec<RawSnapshot> = Vec::new();
        let mut frames: Vec<RawFrame> = Vec::new();

        for frame in self.design.frames() {
            let mut members: Vec<RawId> = Vec::with_capacity(frame.len());
            for snapshot in frame.snapshots() {
                let snapshot_id = snapshot.snapshot_id().raw();
                if seen.insert(snapshot_id) {
                    snapshots.push(raw_snapshot(snapshot));
                }
                members.push(RawId::Int(snapshot_id));
            }
            frames.push(RawFrame {
                id: Some(RawId::Int(frame.id().raw())),
                snapshots: members,
            });
        }

        let system_references = self
            .design
            .current_frame_id()
            .map(|current| RawReference {
                name: CURRENT_FRAME_REFERENCE.to_string(),
                entity_type: "frame".to_string(),
                id: RawId::Int(current.raw()),
            })
            .into_iter()
            .collect();

        let mut system_lists: Vec<RawList> = Vec::new();
        for (name, list) in [
            (UNDO_LIST, self.design.undo_list()),
            (REDO_LIST, self.design.redo_list()),
        ] {
            if !list.is_empty() {
                system_lists.push(RawList {
                    name: name.to_string(),
                    item_type: "frame".to_string(),
                    ids: list.iter().map(|id| RawId::Int(id.raw())).collect(),
                });
            }
        }

        let user_references = self
            .design
            .named_frames()
            .iter()
            .map(|(name, id)| RawReference {
                name: name.clone(),
                entity_type: "frame".to_string(),
                id: RawId::Int(id.raw()),
            })
            .collect();

        let metamodel = self.design.metamodel();
        RawDesign {
            metamodel_name: Some(metamodel.name().to_string()),
            metamodel_version: Some(metamodel.version().to_string()),
            snapshots,
            frames,
            user_references,
            system_references,
            user_lists: Vec::new(),
            system_lists,
        }
    }

    /// Extracts a pruned, self-consistent fragment of one frame.
    ///
    /// An edge is kept only when both endpoints are in the subset; a
    /// parent pointer is kept only when the parent is in the subset.
    /// The result pastes cleanly into an open transient frame.
    pub fn pruned_snapshots(
        frame: &dyn Frame,
        subset: &HashSet<ObjectId>,
    ) -> Vec<RawSnapshot> {
        let mut fragment = Vec::new();
        for snapshot in frame.snapshots() {
            if !subset.contains(&snapshot.object_id()) {
                continue;
            }
            if let Structure::Edge { origin, target } = snapshot.structure() {
                if !subset.contains(&origin) || !subset.contains(&target) {
                    continue;
                }
            }
            let mut raw = raw_snapshot(snapshot);
            if let Some(parent) = snapshot.parent() {
                if !subset.contains(&parent) {
                    raw.parent = None;
                }
            }
            fragment.push(raw);
        }
        fragment
    }
}
