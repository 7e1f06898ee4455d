//! Loader scenarios: validation, identity strategies, frame assembly.

use std::collections::BTreeMap;

use atelier_design::Design;
use atelier_instrument::{
    Collection, IdentityStrategy, ItemErrorKind, Loader, LoaderError, LoaderOptions, RawDesign,
    RawFrame, RawId, RawIdKind, RawList, RawReference, RawSnapshot, RawStructure,
};
use atelier_store::Frame;
use atelier_test_utils::{stock_flow_constraints, stock_flow_metamodel};
use atelier_types::{FrameId, SnapshotId, Variant};

fn design() -> Design {
    Design::new(stock_flow_metamodel(), stock_flow_constraints())
}

fn loader(identity_strategy: IdentityStrategy) -> Loader {
    Loader::new(LoaderOptions {
        identity_strategy,
        ..LoaderOptions::default()
    })
}

fn loader_error(error: atelier_error::Error) -> LoaderError {
    error
        .downcast_ref::<LoaderError>()
        .cloned()
        .expect("a loader error")
}

fn node(type_name: &str, snapshot_id: u64, id: u64) -> RawSnapshot {
    RawSnapshot {
        type_name: Some(type_name.to_string()),
        snapshot_id: Some(RawId::Int(snapshot_id)),
        id: Some(RawId::Int(id)),
        structure: Some(RawStructure::node()),
        ..RawSnapshot::default()
    }
}

fn edge(type_name: &str, snapshot_id: u64, id: u64, origin: u64, target: u64) -> RawSnapshot {
    RawSnapshot {
        type_name: Some(type_name.to_string()),
        snapshot_id: Some(RawId::Int(snapshot_id)),
        id: Some(RawId::Int(id)),
        structure: Some(RawStructure::edge(origin, target)),
        ..RawSnapshot::default()
    }
}

#[test]
fn duplicate_snapshot_id_is_reported_at_its_index() {
    let raw = vec![node("Stock", 10, 20), node("Stock", 10, 21)];

    let mut design = design();
    let frame = design.create_frame();
    let error = loader(IdentityStrategy::PreserveOrCreate)
        .load_into_frame(&raw, &mut design, frame)
        .unwrap_err();

    let error = loader_error(error);
    let item = error.item().expect("an item error");
    assert_eq!(item.collection, Collection::Snapshots);
    assert_eq!(item.index, 1);
    assert_eq!(item.kind, ItemErrorKind::DuplicateForeignId(RawId::Int(10)));
    // The target frame is untouched.
    assert!(design.transient_frame(frame).unwrap().is_empty());
}

#[test]
fn preserve_or_create_remaps_taken_ids() {
    let mut design = design();
    design.identity_mut().use_id(999).unwrap();
    let frame = design.create_frame();

    let raw = vec![node("Stock", 110, 210), node("Stock", 999, 211)];
    loader(IdentityStrategy::PreserveOrCreate)
        .load_into_frame(&raw, &mut design, frame)
        .unwrap();

    let frame = design.transient_frame(frame).unwrap();
    assert_eq!(frame.len(), 2);
    let snapshot_ids: Vec<u64> = frame
        .snapshots()
        .map(|snapshot| snapshot.snapshot_id().raw())
        .collect();
    assert!(snapshot_ids.contains(&110));
    assert!(!snapshot_ids.contains(&999));
}

#[test]
fn require_provided_rejects_taken_ids() {
    let mut design = design();
    design.identity_mut().use_id(999).unwrap();
    let frame = design.create_frame();

    let raw = vec![node("Stock", 999, 210)];
    let error = loader(IdentityStrategy::RequireProvided)
        .load_into_frame(&raw, &mut design, frame)
        .unwrap_err();

    let error = loader_error(error);
    let item = error.item().expect("an item error");
    assert_eq!(
        item.kind,
        ItemErrorKind::ReservationConflict {
            kind: RawIdKind::Snapshot,
            raw: RawId::Int(999),
        }
    );
    assert!(design.transient_frame(frame).unwrap().is_empty());
}

#[test]
fn pasting_twice_yields_disjoint_populations() {
    let mut design = design();
    let frame = design.create_frame();
    let raw = vec![
        node("Stock", 1, 10),
        node("Flow", 2, 11),
        edge("Drains", 3, 12, 10, 11),
    ];

    let loader = loader(IdentityStrategy::PreserveOrCreate);
    let first = loader.load_into_frame(&raw, &mut design, frame).unwrap();
    let second = loader.load_into_frame(&raw, &mut design, frame).unwrap();
    let third = loader.load_into_frame(&raw, &mut design, frame).unwrap();

    assert_eq!(design.transient_frame(frame).unwrap().len(), 9);
    for populations in [[&first, &second], [&first, &third], [&second, &third]] {
        let [left, right] = populations;
        assert!(left.iter().all(|id| !right.contains(id)));
    }
    design.accept(frame).unwrap();
}

#[test]
fn explicit_ids_are_honoured_before_implicit_allocation() {
    let mut design = design();
    let frame = design.create_frame();

    // The first snapshot carries no ids. Sequential allocation would
    // hand out 2 and 3 next (the frame itself took 1), which are exactly
    // the ids the second snapshot requests; the explicit requests must
    // win.
    let implicit = RawSnapshot {
        type_name: Some("Stock".to_string()),
        structure: Some(RawStructure::node()),
        ..RawSnapshot::default()
    };
    let explicit = node("Flow", 3, 2);
    let inserted = loader(IdentityStrategy::PreserveOrCreate)
        .load_into_frame(&[implicit, explicit], &mut design, frame)
        .unwrap();

    assert_eq!(inserted[1].raw(), 2);
    assert!(inserted[0].raw() > 3);
    let frame = design.transient_frame(frame).unwrap();
    let explicit_snapshot = frame.object(inserted[1]).unwrap();
    assert_eq!(explicit_snapshot.snapshot_id(), SnapshotId::new(3));
}

#[test]
fn string_ids_act_as_names() {
    let mut design = design();
    let frame = design.create_frame();

    let raw = vec![
        RawSnapshot {
            type_name: Some("Stock".to_string()),
            id: Some(RawId::from("water")),
            structure: Some(RawStructure::node()),
            ..RawSnapshot::default()
        },
        RawSnapshot {
            type_name: Some("Flow".to_string()),
            id: Some(RawId::from("evaporation")),
            structure: Some(RawStructure::node()),
            ..RawSnapshot::default()
        },
        RawSnapshot {
            type_name: Some("Drains".to_string()),
            structure: Some(RawStructure {
                kind: "edge".to_string(),
                references: vec![RawId::from("water"), RawId::from("evaporation")],
            }),
            ..RawSnapshot::default()
        },
    ];
    let options = LoaderOptions {
        use_id_as_name_attribute: true,
        ..LoaderOptions::default()
    };
    let inserted = Loader::new(options)
        .load_into_frame(&raw, &mut design, frame)
        .unwrap();

    assert_ne!(inserted[0], inserted[1]);
    let frame = design.transient_frame(frame).unwrap();
    let stock = frame.object(inserted[0]).unwrap();
    assert_eq!(stock.attribute("name"), Some(&Variant::from("water")));
    let edge = frame.object(inserted[2]).unwrap();
    assert_eq!(
        edge.structure().endpoints(),
        Some((inserted[0], inserted[1]))
    );
}

#[test]
fn pasted_fragment_rebuilds_the_hierarchy() {
    let mut design = design();
    let frame = design.create_frame();

    let parent = node("Stock", 1, 10);
    let mut child = node("Auxiliary", 2, 11);
    child.parent = Some(RawId::Int(10));
    loader(IdentityStrategy::PreserveOrCreate)
        .load_into_frame(&[parent, child], &mut design, frame)
        .unwrap();

    let frame_ref = design.transient_frame(frame).unwrap();
    let parent = frame_ref.object(10.into()).unwrap();
    assert_eq!(parent.children().as_slice(), &[11.into()]);
    assert_eq!(frame_ref.object(11.into()).unwrap().parent(), Some(10.into()));
    design.accept(frame).unwrap();
}

fn full_raw_design() -> RawDesign {
    let mut renamed = node("Stock", 2, 10);
    renamed
        .attributes
        .insert("name".to_string(), Variant::from("water").into());
    RawDesign {
        metamodel_name: Some("stock-flow".to_string()),
        metamodel_version: Some("0.2.0".to_string()),
        snapshots: vec![node("Stock", 1, 10), renamed],
        frames: vec![
            RawFrame {
                id: Some(RawId::Int(100)),
                snapshots: vec![RawId::Int(1)],
            },
            RawFrame {
                id: Some(RawId::Int(101)),
                snapshots: vec![RawId::Int(2)],
            },
        ],
        system_references: vec![RawReference {
            name: "current_frame".to_string(),
            entity_type: "frame".to_string(),
            id: RawId::Int(101),
        }],
        system_lists: vec![RawList {
            name: "undo".to_string(),
            item_type: "frame".to_string(),
            ids: vec![RawId::Int(100)],
        }],
        user_references: vec![RawReference {
            name: "main".to_string(),
            entity_type: "frame".to_string(),
            id: RawId::Int(101),
        }],
        ..RawDesign::default()
    }
}

#[test]
fn full_design_load_restores_history_and_references() {
    let raw = full_raw_design();
    let design = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap();

    assert_eq!(design.frames().count(), 2);
    assert_eq!(design.current_frame_id(), Some(FrameId::new(101)));
    assert_eq!(design.undo_list(), &[FrameId::new(100)]);
    assert!(design.redo_list().is_empty());
    assert_eq!(design.frame_named("main").map(Frame::id), Some(FrameId::new(101)));

    // Both frames hold a version of the same object.
    let old = design.frame(FrameId::new(100)).unwrap();
    let new = design.frame(FrameId::new(101)).unwrap();
    assert_eq!(old.object(10.into()).unwrap().attribute("name"), None);
    assert_eq!(
        new.object(10.into()).unwrap().attribute("name"),
        Some(&Variant::from("water"))
    );

    // Consumed reservations became used, the rest were released.
    assert_eq!(design.identity().reserved_count(), 0);
    for id in [1, 2, 10, 100, 101] {
        assert!(design.identity().is_used(id));
    }
}

#[test]
fn frames_without_current_reference_are_rejected() {
    let mut raw = full_raw_design();
    raw.system_references.clear();
    let error = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap_err();
    assert_eq!(loader_error(error), LoaderError::MissingCurrentFrame);
}

#[test]
fn unknown_frame_in_history_is_rejected() {
    let mut raw = full_raw_design();
    raw.system_lists[0].ids.push(RawId::Int(404));
    let error = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap_err();
    assert_eq!(loader_error(error), LoaderError::UnknownFrameId(RawId::Int(404)));
}

#[test]
fn children_must_agree_across_frames() {
    let parent = node("Stock", 1, 10);
    let mut child = node("Auxiliary", 2, 11);
    child.parent = Some(RawId::Int(10));
    let raw = RawDesign {
        snapshots: vec![parent, child],
        frames: vec![
            RawFrame {
                id: Some(RawId::Int(100)),
                snapshots: vec![RawId::Int(1), RawId::Int(2)],
            },
            // The same parent snapshot, this time childless.
            RawFrame {
                id: Some(RawId::Int(101)),
                snapshots: vec![RawId::Int(1)],
            },
        ],
        system_references: vec![RawReference {
            name: "current_frame".to_string(),
            entity_type: "frame".to_string(),
            id: RawId::Int(101),
        }],
        ..RawDesign::default()
    };

    let error = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap_err();
    let error = loader_error(error);
    let item = error.item().expect("an item error");
    assert_eq!(item.collection, Collection::Frames);
    assert_eq!(item.index, 1);
    assert_eq!(item.kind, ItemErrorKind::ChildrenMismatch);
}

#[test]
fn parent_cycles_are_rejected() {
    let mut first = node("Stock", 1, 10);
    first.parent = Some(RawId::Int(11));
    let mut second = node("Stock", 2, 11);
    second.parent = Some(RawId::Int(10));
    let raw = RawDesign {
        snapshots: vec![first, second],
        frames: vec![RawFrame {
            id: Some(RawId::Int(100)),
            snapshots: vec![RawId::Int(1), RawId::Int(2)],
        }],
        system_references: vec![RawReference {
            name: "current_frame".to_string(),
            entity_type: "frame".to_string(),
            id: RawId::Int(100),
        }],
        ..RawDesign::default()
    };

    let error = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap_err();
    let item = loader_error(error);
    assert_eq!(
        item.item().expect("an item error").kind,
        ItemErrorKind::ParentChildCycle
    );
}

#[test]
fn frames_must_contain_their_dependencies() {
    let raw = RawDesign {
        snapshots: vec![
            node("Stock", 1, 10),
            node("Flow", 2, 11),
            edge("Drains", 3, 12, 10, 11),
        ],
        // The edge is listed, its target is not.
        frames: vec![RawFrame {
            id: Some(RawId::Int(100)),
            snapshots: vec![RawId::Int(1), RawId::Int(3)],
        }],
        system_references: vec![RawReference {
            name: "current_frame".to_string(),
            entity_type: "frame".to_string(),
            id: RawId::Int(100),
        }],
        ..RawDesign::default()
    };

    let error = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap_err();
    assert_eq!(
        loader_error(error).item().expect("an item error").kind,
        ItemErrorKind::BrokenStructuralIntegrity(RawId::Int(3))
    );
}

#[test]
fn snapshot_resolution_failures() {
    let mut design = design();
    let frame = design.create_frame();
    let loader = loader(IdentityStrategy::PreserveOrCreate);

    let missing_type = RawSnapshot {
        structure: Some(RawStructure::node()),
        ..RawSnapshot::default()
    };
    let error = loader
        .load_into_frame(&[missing_type], &mut design, frame)
        .unwrap_err();
    assert_eq!(
        loader_error(error).item().unwrap().kind,
        ItemErrorKind::MissingObjectType
    );

    let unknown_type = node("Reactor", 1, 10);
    let error = loader
        .load_into_frame(&[unknown_type], &mut design, frame)
        .unwrap_err();
    assert_eq!(
        loader_error(error).item().unwrap().kind,
        ItemErrorKind::UnknownObjectType("Reactor".to_string())
    );

    let mut bad_kind = node("Stock", 1, 10);
    bad_kind.structure = Some(RawStructure {
        kind: "hyperedge".to_string(),
        references: Vec::new(),
    });
    let error = loader
        .load_into_frame(&[bad_kind], &mut design, frame)
        .unwrap_err();
    assert_eq!(
        loader_error(error).item().unwrap().kind,
        ItemErrorKind::InvalidStructuralType("hyperedge".to_string())
    );

    let mut mismatched = node("Stock", 1, 10);
    mismatched.structure = Some(RawStructure::unstructured());
    let error = loader
        .load_into_frame(&[mismatched], &mut design, frame)
        .unwrap_err();
    assert!(matches!(
        loader_error(error).item().unwrap().kind,
        ItemErrorKind::StructuralTypeMismatch { .. }
    ));

    let dangling = edge("Drains", 1, 12, 10, 11);
    let error = loader
        .load_into_frame(&[dangling], &mut design, frame)
        .unwrap_err();
    assert_eq!(
        loader_error(error).item().unwrap().kind,
        ItemErrorKind::UnknownId(RawId::Int(10))
    );

    let mut bad_attribute = node("Stock", 1, 10);
    bad_attribute
        .attributes
        .insert("volume".to_string(), Variant::from(1i64).into());
    let error = loader
        .load_into_frame(&[bad_attribute], &mut design, frame)
        .unwrap_err();
    assert!(matches!(
        loader_error(error).item().unwrap().kind,
        ItemErrorKind::Attribute(_)
    ));
}

#[test]
fn reference_validation_failures() {
    let mut raw = full_raw_design();
    raw.user_references.push(RawReference {
        name: "main".to_string(),
        entity_type: "frame".to_string(),
        id: RawId::Int(100),
    });
    let error = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap_err();
    let item = loader_error(error);
    let item = item.item().unwrap();
    assert_eq!(item.collection, Collection::UserReferences);
    assert_eq!(item.kind, ItemErrorKind::DuplicateName("main".to_string()));

    let mut raw = full_raw_design();
    raw.system_references.push(RawReference {
        name: "selection".to_string(),
        entity_type: "vertex".to_string(),
        id: RawId::Int(1),
    });
    let error = loader(IdentityStrategy::RequireProvided)
        .load_design(&raw, stock_flow_metamodel(), stock_flow_constraints())
        .unwrap_err();
    assert_eq!(
        loader_error(error).item().unwrap().kind,
        ItemErrorKind::UnknownEntityType("vertex".to_string())
    );
}

#[test]
fn empty_design_loads_empty() {
    let design = loader(IdentityStrategy::PreserveOrCreate)
        .load_design(
            &RawDesign::default(),
            stock_flow_metamodel(),
            stock_flow_constraints(),
        )
        .unwrap();
    assert_eq!(design.frames().count(), 0);
    assert_eq!(design.current_frame_id(), None);
}
