use atelier_error::impl_error_conversion_with_kind;
use atelier_types::{AttributeError, ObjectId, SnapshotId};
use thiserror::Error;

/// Failures of frame population and mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The frame already contains a snapshot of this object.
    #[error("frame already contains object {0}")]
    DuplicateObject(ObjectId),

    /// The snapshot id is already taken within this frame.
    #[error("frame already contains snapshot {0}")]
    DuplicateSnapshot(SnapshotId),

    /// The frame contains no snapshot of this object.
    #[error("frame contains no object {0}")]
    UnknownObject(ObjectId),

    /// The requested object type is not part of the metamodel.
    #[error("unknown object type {0}")]
    UnknownType(String),

    /// The structural component disagrees with the object type.
    #[error("structure {found} disagrees with type {object_type} ({expected})")]
    StructureMismatch {
        object_type: String,
        expected: atelier_types::StructuralKind,
        found: atelier_types::StructuralKind,
    },

    /// Attribute schema or conversion failure.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

impl_error_conversion_with_kind!(
    FrameError,
    atelier_error::ErrorKind::Frame,
    atelier_error::Error
);
