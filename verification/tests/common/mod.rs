use std::sync::Arc;

use atelier_store::TransientFrame;
use atelier_test_utils::stock_flow_metamodel;
use atelier_types::{
    FrameId, Metamodel, ObjectId, ObjectSnapshot, ObjectType, SnapshotId, Structure,
};

pub fn object_type(name: &str) -> Arc<ObjectType> {
    stock_flow_metamodel()
        .object_type(name)
        .expect("fixture type")
}

pub fn node(type_name: &str, snapshot_id: u64, object_id: u64) -> ObjectSnapshot {
    ObjectSnapshot::new(
        SnapshotId::new(snapshot_id),
        ObjectId::new(object_id),
        object_type(type_name),
        Structure::Node,
    )
}

pub fn edge(
    type_name: &str,
    snapshot_id: u64,
    object_id: u64,
    origin: u64,
    target: u64,
) -> ObjectSnapshot {
    ObjectSnapshot::new(
        SnapshotId::new(snapshot_id),
        ObjectId::new(object_id),
        object_type(type_name),
        Structure::Edge {
            origin: ObjectId::new(origin),
            target: ObjectId::new(target),
        },
    )
}

pub fn frame(snapshots: Vec<ObjectSnapshot>) -> TransientFrame {
    let mut frame = TransientFrame::new(FrameId::new(1));
    for snapshot in snapshots {
        frame.insert(snapshot).expect("insert fixture snapshot");
    }
    frame
}
