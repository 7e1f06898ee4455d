//! Validation and materialization of raw designs.
//!
//! Loading proceeds in ordered phases: collection validation, identity
//! resolution under the selected strategy, snapshot resolution, frame
//! resolution, and design-level reference resolution. All phases work
//! against a staged clone of the target's identity manager; the target is
//! only touched once nothing can fail any more.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use atelier_design::Design;
use atelier_error::Error;
use atelier_identity::IdentityManager;
use atelier_store::{Frame, StableFrame};
use atelier_types::{
    Children, FrameId, Metamodel, ObjectId, ObjectSnapshot, ObjectType, SnapshotId,
    StructuralKind, Structure,
};
use atelier_verification::Constraint;
use log::{debug, warn};

use crate::error::{Collection, ItemError, ItemErrorKind, LoaderError, RawIdKind};
use crate::raw::{RawDesign, RawFrame, RawId, RawSnapshot};
use crate::{CURRENT_FRAME_REFERENCE, REDO_LIST, UNDO_LIST};

/// How the loader reconciles raw identifiers with the target identity
/// space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// Ignore provided raw ids; allocate fresh ids for everything.
    CreateNew,
    /// Every provided integer id must be free; a conflict fails the load.
    RequireProvided,
    /// Keep provided integer ids when they are free, allocate fresh ones
    /// otherwise.
    #[default]
    PreserveOrCreate,
}

/// Loader configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoaderOptions {
    /// Identity reconciliation strategy.
    pub identity_strategy: IdentityStrategy,
    /// Legacy import aid: when a raw snapshot's id is a string, copy it
    /// into the `name` attribute unless one is present.
    pub use_id_as_name_attribute: bool,
}

/// Validates and materializes raw designs.
#[derive(Clone, Debug, Default)]
pub struct Loader {
    options: LoaderOptions,
}

/// Raw-to-actual identifier table of one namespace.
///
/// Integer and actual raw ids are normalized onto one key so that the
/// same requested value resolves consistently however it was spelled.
#[derive(Debug, Default)]
struct IdentityTable {
    map: HashMap<RawId, u64>,
}

impl IdentityTable {
    fn key(raw: &RawId) -> RawId {
        match raw {
            RawId::Actual(value) => RawId::Int(*value),
            other => other.clone(),
        }
    }

    fn get(&self, raw: &RawId) -> Option<u64> {
        self.map.get(&Self::key(raw)).copied()
    }

    fn insert(&mut self, raw: &RawId, actual: u64) {
        self.map.insert(Self::key(raw), actual);
    }

    /// Table-consistent resolution: the id already mapped to this raw
    /// id, or a freshly reserved one.
    fn resolve(&mut self, raw: &RawId, identity: &mut IdentityManager) -> u64 {
        if let Some(actual) = self.get(raw) {
            return actual;
        }
        let actual = identity.next();
        self.insert(raw, actual);
        actual
    }
}

/// Staged state of one load: the scratch identity manager and the
/// per-namespace resolution tables.
struct Resolution {
    identity: IdentityManager,
    unavailable: HashSet<u64>,
    objects: IdentityTable,
    snapshots: IdentityTable,
    frames: IdentityTable,
    /// Resolved (snapshot id, object id) per raw snapshot, in input order.
    snapshot_ids: Vec<(u64, u64)>,
    /// Resolved frame id per raw frame, in input order.
    frame_ids: Vec<u64>,
}

impl Resolution {
    fn new(identity: IdentityManager, unavailable: HashSet<u64>) -> Self {
        Resolution {
            identity,
            unavailable,
            objects: IdentityTable::default(),
            snapshots: IdentityTable::default(),
            frames: IdentityTable::default(),
            snapshot_ids: Vec::new(),
            frame_ids: Vec::new(),
        }
    }
}

impl Loader {
    /// Creates a loader with the given options.
    pub fn new(options: LoaderOptions) -> Self {
        Loader { options }
    }

    /// Loads a complete raw design into a new design bound to the given
    /// metamodel and constraints.
    pub fn load_design(
        &self,
        raw: &RawDesign,
        metamodel: Arc<dyn Metamodel>,
        constraints: Vec<Constraint>,
    ) -> Result<Design, Error> {
        if let Some(name) = &raw.metamodel_name {
            if name != metamodel.name() {
                warn!(
                    "loading design of metamodel {:?} with metamodel {:?}",
                    name,
                    metamodel.name(),
                );
            }
        }
        if let Some(version) = &raw.metamodel_version {
            match semver::Version::parse(version) {
                Ok(version) if version != *metamodel.version() => {
                    warn!(
                        "loading design of metamodel version {} with metamodel version {}",
                        version,
                        metamodel.version(),
                    );
                }
                Ok(_) => {}
                Err(error) => {
                    warn!("ignoring malformed metamodel version {version:?}: {error}");
                }
            }
        }

        validate_collections(raw)?;

        let mut resolution = Resolution::new(IdentityManager::new(), HashSet::new());
        self.resolve_identities(&raw.snapshots, &raw.frames, &mut resolution)?;
        let mut snapshots =
            self.resolve_snapshots(&raw.snapshots, metamodel.as_ref(), &resolution)?;
        let frames = resolve_frames(raw, &resolution, &mut snapshots)?;

        let current_frame = resolve_current_frame(raw, &resolution)?;
        let undo_list = resolve_frame_list(raw, UNDO_LIST, &resolution)?;
        let redo_list = resolve_frame_list(raw, REDO_LIST, &resolution)?;
        let named_frames = resolve_named_frames(raw, &resolution)?;

        // Nothing can fail from here on: move the consumed reservations
        // to used and let the rest go.
        let mut identity = resolution.identity;
        for frame in &frames {
            for snapshot in frame.shared_snapshots() {
                let _ = identity.use_id(snapshot.snapshot_id().raw());
                let _ = identity.use_id(snapshot.object_id().raw());
            }
        }
        for frame in &frames {
            let _ = identity.use_id(Frame::id(frame).raw());
        }
        identity.release_all_reservations();

        debug!(
            "loader: materialized design with {} frames, {} snapshots",
            frames.len(),
            raw.snapshots.len(),
        );
        Ok(Design::restore(
            metamodel,
            constraints,
            identity,
            frames,
            current_frame,
            undo_list,
            redo_list,
            named_frames,
        ))
    }

    /// Loads raw snapshots into an open transient frame of a design.
    ///
    /// The design's identity space is honoured: under
    /// [`IdentityStrategy::PreserveOrCreate`], raw ids clashing with
    /// objects already present in the target frame are re-mapped to fresh
    /// ids, so pasting the same fragment twice produces disjoint
    /// populations. The inserted snapshots are owned by the frame.
    /// On failure the design and the frame are left unchanged.
    ///
    /// Panics when the frame is not an open transient frame of this
    /// design.
    pub fn load_into_frame(
        &self,
        raw_snapshots: &[RawSnapshot],
        design: &mut Design,
        frame: FrameId,
    ) -> Result<Vec<ObjectId>, Error> {
        let target = match design.transient_frame(frame) {
            Some(target) => target,
            None => panic!("loading into unknown frame {frame}"),
        };
        assert!(target.is_open(), "loading into frame {frame} which is not open");

        validate_snapshot_ids(raw_snapshots)?;

        let unavailable: HashSet<u64> = target
            .snapshots()
            .flat_map(|snapshot| [snapshot.object_id().raw(), snapshot.snapshot_id().raw()])
            .collect();
        let mut resolution = Resolution::new(design.identity().clone(), unavailable);
        self.resolve_identities(raw_snapshots, &[], &mut resolution)?;
        let mut snapshots =
            self.resolve_snapshots(raw_snapshots, design.metamodel().as_ref(), &resolution)?;

        // One frame takes at most one snapshot per object.
        let mut seen_objects: HashMap<ObjectId, usize> = HashMap::new();
        for (index, snapshot) in snapshots.iter().enumerate() {
            if seen_objects.insert(snapshot.object_id(), index).is_some() {
                let raw = raw_snapshots[index]
                    .id
                    .clone()
                    .unwrap_or(RawId::Actual(snapshot.object_id().raw()));
                return Err(item_error(Collection::Snapshots, index, ItemErrorKind::DuplicateObject(raw)));
            }
        }

        resolve_pasted_hierarchy(raw_snapshots, &mut snapshots)?;

        // Commit: replay the staged reservations onto the design, then
        // install the snapshots.
        for (snapshot_id, object_id) in &resolution.snapshot_ids {
            for raw in [*snapshot_id, *object_id] {
                design
                    .identity_mut()
                    .reserve(raw)
                    .unwrap_or_else(|error| panic!("staged id {raw} no longer free: {error}"));
            }
        }
        let target = design
            .transient_frame_mut(frame)
            .expect("frame checked above");
        let mut inserted = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let object_id = snapshot.object_id();
            target
                .insert(snapshot)
                .unwrap_or_else(|error| panic!("staged snapshot rejected: {error}"));
            inserted.push(object_id);
        }
        debug!(
            "loader: pasted {} snapshots into frame {}",
            inserted.len(),
            frame,
        );
        Ok(inserted)
    }

    /// Identity resolution: explicit integer requests are applied first
    /// over every namespace, so implicit sequential allocation can never
    /// shadow an explicit id later in the input.
    fn resolve_identities(
        &self,
        snapshots: &[RawSnapshot],
        frames: &[RawFrame],
        resolution: &mut Resolution,
    ) -> Result<(), LoaderError> {
        let strategy = self.options.identity_strategy;

        for (index, snapshot) in snapshots.iter().enumerate() {
            if let Some(raw) = &snapshot.snapshot_id {
                reserve_explicit(
                    strategy,
                    raw,
                    RawIdKind::Snapshot,
                    Collection::Snapshots,
                    index,
                    &mut resolution.snapshots,
                    &mut resolution.identity,
                    &resolution.unavailable,
                )?;
            }
            if let Some(raw) = &snapshot.id {
                reserve_explicit(
                    strategy,
                    raw,
                    RawIdKind::Object,
                    Collection::Snapshots,
                    index,
                    &mut resolution.objects,
                    &mut resolution.identity,
                    &resolution.unavailable,
                )?;
            }
        }
        for (index, frame) in frames.iter().enumerate() {
            if let Some(raw) = &frame.id {
                reserve_explicit(
                    strategy,
                    raw,
                    RawIdKind::Frame,
                    Collection::Frames,
                    index,
                    &mut resolution.frames,
                    &mut resolution.identity,
                    &resolution.unavailable,
                )?;
            }
        }

        for snapshot in snapshots {
            let snapshot_id = match &snapshot.snapshot_id {
                Some(raw) => resolution
                    .snapshots
                    .resolve(raw, &mut resolution.identity),
                None => resolution.identity.next(),
            };
            let object_id = match &snapshot.id {
                Some(raw) => resolution.objects.resolve(raw, &mut resolution.identity),
                None => resolution.identity.next(),
            };
            resolution.snapshot_ids.push((snapshot_id, object_id));
        }
        for frame in frames {
            let frame_id = match &frame.id {
                Some(raw) => resolution.frames.resolve(raw, &mut resolution.identity),
                None => resolution.identity.next(),
            };
            resolution.frame_ids.push(frame_id);
        }
        Ok(())
    }

    /// Snapshot resolution: object type lookup, structure agreement,
    /// reference resolution and attribute pass-through.
    fn resolve_snapshots(
        &self,
        raw_snapshots: &[RawSnapshot],
        metamodel: &dyn Metamodel,
        resolution: &Resolution,
    ) -> Result<Vec<ObjectSnapshot>, LoaderError> {
        let mut resolved = Vec::with_capacity(raw_snapshots.len());
        for (index, raw) in raw_snapshots.iter().enumerate() {
            let fail = |kind| item_error_raw(Collection::Snapshots, index, kind);

            let type_name = raw
                .type_name
                .as_deref()
                .ok_or_else(|| fail(ItemErrorKind::MissingObjectType))?;
            let object_type = metamodel
                .object_type(type_name)
                .ok_or_else(|| fail(ItemErrorKind::UnknownObjectType(type_name.to_string())))?;

            let structure = resolve_structure(raw, &object_type, resolution)
                .map_err(|kind| fail(kind))?;
            let parent = match &raw.parent {
                Some(raw_parent) => Some(
                    resolution
                        .objects
                        .get(raw_parent)
                        .map(ObjectId::new)
                        .ok_or_else(|| fail(ItemErrorKind::UnknownId(raw_parent.clone())))?,
                ),
                None => None,
            };

            let (snapshot_id, object_id) = resolution.snapshot_ids[index];
            let mut snapshot = ObjectSnapshot::new(
                SnapshotId::new(snapshot_id),
                ObjectId::new(object_id),
                object_type.clone(),
                structure,
            );
            snapshot.set_parent(parent);

            for (name, value) in &raw.attributes {
                snapshot
                    .set_attribute(name, value.0.clone())
                    .map_err(|error| fail(ItemErrorKind::Attribute(error)))?;
            }
            if self.options.use_id_as_name_attribute {
                if let Some(RawId::Name(name)) = &raw.id {
                    if !raw.attributes.contains_key("name") && object_type.has_attribute("name") {
                        snapshot
                            .set_attribute("name", name.as_str().into())
                            .map_err(|error| fail(ItemErrorKind::Attribute(error)))?;
                    }
                }
            }
            resolved.push(snapshot);
        }
        Ok(resolved)
    }
}

fn item_error(collection: Collection, index: usize, kind: ItemErrorKind) -> Error {
    LoaderError::Item(ItemError::new(collection, index, kind)).into()
}

fn item_error_raw(collection: Collection, index: usize, kind: ItemErrorKind) -> LoaderError {
    LoaderError::Item(ItemError::new(collection, index, kind))
}

fn validate_snapshot_ids(snapshots: &[RawSnapshot]) -> Result<(), LoaderError> {
    let mut seen = HashSet::new();
    for (index, snapshot) in snapshots.iter().enumerate() {
        if let Some(raw) = &snapshot.snapshot_id {
            if !seen.insert(IdentityTable::key(raw)) {
                return Err(item_error_raw(
                    Collection::Snapshots,
                    index,
                    ItemErrorKind::DuplicateForeignId(raw.clone()),
                ));
            }
        }
    }
    Ok(())
}

const REFERENCE_ENTITY_TYPES: &[&str] = &["frame", "object"];

fn validate_collections(raw: &RawDesign) -> Result<(), LoaderError> {
    validate_snapshot_ids(&raw.snapshots)?;

    let mut seen = HashSet::new();
    for (index, frame) in raw.frames.iter().enumerate() {
        if let Some(raw_id) = &frame.id {
            if !seen.insert(IdentityTable::key(raw_id)) {
                return Err(item_error_raw(
                    Collection::Frames,
                    index,
                    ItemErrorKind::DuplicateForeignId(raw_id.clone()),
                ));
            }
        }
    }

    for (collection, references) in [
        (Collection::UserReferences, &raw.user_references),
        (Collection::SystemReferences, &raw.system_references),
    ] {
        let mut names = HashSet::new();
        for (index, reference) in references.iter().enumerate() {
            if !names.insert(reference.name.as_str()) {
                return Err(item_error_raw(
                    collection,
                    index,
                    ItemErrorKind::DuplicateName(reference.name.clone()),
                ));
            }
            if !REFERENCE_ENTITY_TYPES.contains(&reference.entity_type.as_str()) {
                return Err(item_error_raw(
                    collection,
                    index,
                    ItemErrorKind::UnknownEntityType(reference.entity_type.clone()),
                ));
            }
        }
    }
    for (collection, lists) in [
        (Collection::UserLists, &raw.user_lists),
        (Collection::SystemLists, &raw.system_lists),
    ] {
        let mut names = HashSet::new();
        for (index, list) in lists.iter().enumerate() {
            if !names.insert(list.name.as_str()) {
                return Err(item_error_raw(
                    collection,
                    index,
                    ItemErrorKind::DuplicateName(list.name.clone()),
                ));
            }
            if !REFERENCE_ENTITY_TYPES.contains(&list.item_type.as_str()) {
                return Err(item_error_raw(
                    collection,
                    index,
                    ItemErrorKind::UnknownEntityType(list.item_type.clone()),
                ));
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn reserve_explicit(
    strategy: IdentityStrategy,
    raw: &RawId,
    kind: RawIdKind,
    collection: Collection,
    index: usize,
    table: &mut IdentityTable,
    identity: &mut IdentityManager,
    unavailable: &HashSet<u64>,
) -> Result<(), LoaderError> {
    let Some(requested) = raw.as_int() else {
        // Names are implicit: resolved table-consistently later.
        return Ok(());
    };
    if table.get(raw).is_some() {
        return Ok(());
    }
    match strategy {
        IdentityStrategy::CreateNew => Ok(()),
        IdentityStrategy::RequireProvided => {
            if unavailable.contains(&requested) || !identity.is_free(requested) {
                return Err(item_error_raw(
                    collection,
                    index,
                    ItemErrorKind::ReservationConflict {
                        kind,
                        raw: raw.clone(),
                    },
                ));
            }
            identity
                .reserve(requested)
                .expect("free id is reservable");
            table.insert(raw, requested);
            Ok(())
        }
        IdentityStrategy::PreserveOrCreate => {
            if !unavailable.contains(&requested) && identity.reserve_if_free(requested) {
                table.insert(raw, requested);
            }
            // Otherwise the id is taken; a fresh one is allocated in the
            // implicit pass.
            Ok(())
        }
    }
}

fn resolve_structure(
    raw: &RawSnapshot,
    object_type: &ObjectType,
    resolution: &Resolution,
) -> Result<Structure, ItemErrorKind> {
    let expected = object_type.structural_kind();
    let Some(raw_structure) = &raw.structure else {
        return match expected {
            StructuralKind::Unstructured => Ok(Structure::Unstructured),
            StructuralKind::Node => Ok(Structure::Node),
            // Edges cannot be inferred: the endpoints are missing.
            StructuralKind::Edge => Err(ItemErrorKind::StructuralTypeMismatch { expected }),
        };
    };

    let declared = match raw_structure.kind.as_str() {
        "unstructured" => StructuralKind::Unstructured,
        "node" => StructuralKind::Node,
        "edge" => StructuralKind::Edge,
        other => return Err(ItemErrorKind::InvalidStructuralType(other.to_string())),
    };
    if declared != expected {
        return Err(ItemErrorKind::StructuralTypeMismatch { expected });
    }

    match declared {
        StructuralKind::Edge => {
            let [origin, target] = raw_structure.references.as_slice() else {
                return Err(ItemErrorKind::InvalidStructuralType(
                    raw_structure.kind.clone(),
                ));
            };
            let origin = resolution
                .objects
                .get(origin)
                .ok_or_else(|| ItemErrorKind::UnknownId(origin.clone()))?;
            let target = resolution
                .objects
                .get(target)
                .ok_or_else(|| ItemErrorKind::UnknownId(target.clone()))?;
            Ok(Structure::Edge {
                origin: ObjectId::new(origin),
                target: ObjectId::new(target),
            })
        }
        _ if raw_structure.references.is_empty() => match declared {
            StructuralKind::Unstructured => Ok(Structure::Unstructured),
            _ => Ok(Structure::Node),
        },
        _ => Err(ItemErrorKind::InvalidStructuralType(
            raw_structure.kind.clone(),
        )),
    }
}

/// Frame resolution: snapshot membership, one snapshot per object,
/// integrity within the frame, children derived from parent pointers
/// consistently across frames, and hierarchy acyclicity.
fn resolve_frames(
    raw: &RawDesign,
    resolution: &Resolution,
    snapshots: &mut [ObjectSnapshot],
) -> Result<Vec<StableFrame>, LoaderError> {
    // Snapshot index by resolved snapshot id.
    let by_snapshot_id: HashMap<u64, usize> = resolution
        .snapshot_ids
        .iter()
        .enumerate()
        .map(|(index, (snapshot_id, _))| (*snapshot_id, index))
        .collect();

    // Children lists per snapshot index, shared across frames.
    let mut children: HashMap<usize, Vec<ObjectId>> = HashMap::new();
    let mut memberships: Vec<Vec<usize>> = Vec::with_capacity(raw.frames.len());

    for (frame_index, raw_frame) in raw.frames.iter().enumerate() {
        let fail = |kind| item_error_raw(Collection::Frames, frame_index, kind);

        let mut members: Vec<usize> = Vec::with_capacity(raw_frame.snapshots.len());
        let mut population: HashMap<ObjectId, RawId> = HashMap::new();
        for raw_id in &raw_frame.snapshots {
            let index = resolution
                .snapshots
                .get(raw_id)
                .and_then(|snapshot_id| by_snapshot_id.get(&snapshot_id).copied())
                .ok_or_else(|| fail(ItemErrorKind::UnknownId(raw_id.clone())))?;
            let object_id = snapshots[index].object_id();
            if population.insert(object_id, raw_id.clone()).is_some() {
                return Err(fail(ItemErrorKind::DuplicateObject(raw_id.clone())));
            }
            members.push(index);
        }

        // Every structural dependency must live in the same frame.
        for (position, index) in members.iter().enumerate() {
            let snapshot = &snapshots[*index];
            for dependency in snapshot.structural_dependencies() {
                if !population.contains_key(&dependency) {
                    let raw_id = raw_frame.snapshots[position].clone();
                    return Err(fail(ItemErrorKind::BrokenStructuralIntegrity(raw_id)));
                }
            }
        }

        // Children in frame listing order, derived from parent pointers.
        let mut frame_children: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        for index in &members {
            let snapshot = &snapshots[*index];
            if let Some(parent) = snapshot.parent() {
                frame_children
                    .entry(parent)
                    .or_default()
                    .push(snapshot.object_id());
            }
        }
        for index in &members {
            let snapshot = &snapshots[*index];
            let own = frame_children
                .remove(&snapshot.object_id())
                .unwrap_or_default();
            match children.get(index) {
                Some(previous) if *previous != own => {
                    return Err(fail(ItemErrorKind::ChildrenMismatch));
                }
                Some(_) => {}
                None => {
                    children.insert(*index, own);
                }
            }
        }

        check_acyclic_hierarchy(&members, snapshots).map_err(|kind| fail(kind))?;
        memberships.push(members);
    }

    for (index, own) in children {
        snapshots[index].set_children(Children::from_iter(own));
    }
    let shared: Vec<Arc<ObjectSnapshot>> = snapshots
        .iter_mut()
        .map(|snapshot| {
            snapshot.freeze();
            Arc::new(snapshot.clone())
        })
        .collect();

    let frames = memberships
        .into_iter()
        .enumerate()
        .map(|(frame_index, members)| {
            let frame_id = FrameId::new(resolution.frame_ids[frame_index]);
            StableFrame::new(
                frame_id,
                members.into_iter().map(|index| Arc::clone(&shared[index])),
            )
        })
        .collect();
    Ok(frames)
}

/// Walks parent chains within one frame's membership, rejecting cycles.
fn check_acyclic_hierarchy(
    members: &[usize],
    snapshots: &[ObjectSnapshot],
) -> Result<(), ItemErrorKind> {
    let by_object: HashMap<ObjectId, usize> = members
        .iter()
        .map(|index| (snapshots[*index].object_id(), *index))
        .collect();
    let mut cleared: HashSet<ObjectId> = HashSet::new();
    for index in members {
        let mut trail: HashSet<ObjectId> = HashSet::new();
        let mut current = snapshots[*index].object_id();
        loop {
            if cleared.contains(&current) {
                break;
            }
            if !trail.insert(current) {
                return Err(ItemErrorKind::ParentChildCycle);
            }
            match by_object
                .get(&current)
                .and_then(|next| snapshots[*next].parent())
            {
                Some(parent) => current = parent,
                None => break,
            }
        }
        cleared.extend(trail);
    }
    Ok(())
}

/// Derives children for a pasted fragment and rejects parent cycles.
fn resolve_pasted_hierarchy(
    raw_snapshots: &[RawSnapshot],
    snapshots: &mut [ObjectSnapshot],
) -> Result<(), LoaderError> {
    let members: Vec<usize> = (0..snapshots.len()).collect();
    check_acyclic_hierarchy(&members, snapshots)
        .map_err(|kind| item_error_raw(Collection::Snapshots, raw_snapshots.len().saturating_sub(1), kind))?;

    let mut children: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    for snapshot in snapshots.iter() {
        if let Some(parent) = snapshot.parent() {
            children
                .entry(parent)
                .or_default()
                .push(snapshot.object_id());
        }
    }
    for snapshot in snapshots.iter_mut() {
        let own = children.remove(&snapshot.object_id()).unwrap_or_default();
        snapshot.set_children(Children::from_iter(own));
    }
    Ok(())
}

fn resolve_current_frame(
    raw: &RawDesign,
    resolution: &Resolution,
) -> Result<Option<FrameId>, LoaderError> {
    let reference = raw
        .system_references
        .iter()
        .find(|reference| reference.name == CURRENT_FRAME_REFERENCE);
    match reference {
        Some(reference) => {
            let actual = resolution
                .frames
                .get(&reference.id)
                .ok_or_else(|| LoaderError::UnknownFrameId(reference.id.clone()))?;
            Ok(Some(FrameId::new(actual)))
        }
        None if raw.frames.is_empty() => Ok(None),
        None => Err(LoaderError::MissingCurrentFrame),
    }
}

fn resolve_frame_list(
    raw: &RawDesign,
    name: &str,
    resolution: &Resolution,
) -> Result<Vec<FrameId>, LoaderError> {
    let Some(list) = raw.system_lists.iter().find(|list| list.name == name) else {
        return Ok(Vec::new());
    };
    list.ids
        .iter()
        .map(|raw_id| {
            resolution
                .frames
                .get(raw_id)
                .map(FrameId::new)
                .ok_or_else(|| LoaderError::UnknownFrameId(raw_id.clone()))
        })
        .collect()
}

fn resolve_named_frames(
    raw: &RawDesign,
    resolution: &Resolution,
) -> Result<BTreeMap<String, FrameId>, LoaderError> {
    let mut named = BTreeMap::new();
    for reference in &raw.user_references {
        if reference.entity_type != "frame" {
            continue;
        }
        let actual = resolution
            .frames
            .get(&reference.id)
            .ok_or_else(|| LoaderError::UnknownFrameId(reference.id.clone()))?;
        named.insert(reference.name.clone(), FrameId::new(actual));
    }
    Ok(named)
}
